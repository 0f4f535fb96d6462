//! Small text helpers shared by prompt building, publishing and SEO metadata.

/// Year used in the guide titles and meta descriptions.
pub const EDITORIAL_YEAR: u32 = 2025;

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// SEO focus keyphrase: lowercased title with everything but `[a-z0-9\s]` dropped.
pub fn focus_keyphrase(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn meta_description(title: &str) -> String {
    format!(
        "Discover the best {} in {}. Learn about features, benefits, and top recommendations for {}. Expert guide with detailed reviews and comparisons.",
        title.to_lowercase(),
        EDITORIAL_YEAR,
        focus_keyphrase(title)
    )
}

/// WordPress term slug: lowercased, whitespace runs replaced with `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// First `n` words of a title joined by single spaces.
pub fn leading_words(title: &str, n: usize) -> String {
    title.split(' ').take(n).collect::<Vec<_>>().join(" ")
}

/// Last `n` words of a title joined by single spaces.
pub fn trailing_words(title: &str, n: usize) -> String {
    let words: Vec<&str> = title.split(' ').collect();
    let start = words.len().saturating_sub(n);
    words[start..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_keyphrase() {
        assert_eq!(focus_keyphrase("Smart Locks: 2025 Buyer's Guide!"), "smart locks 2025 buyers guide");
        assert_eq!(focus_keyphrase("  ¿Qué?  "), "qu");
    }

    #[test]
    fn test_meta_description_mentions_keyphrase() {
        let desc = meta_description("Smart Locks!");
        assert!(desc.starts_with("Discover the best smart locks! in 2025."));
        assert!(desc.contains("recommendations for smart locks."));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home  Security Tips"), "home-security-tips");
        assert_eq!(slugify("IoT"), "iot");
    }

    #[test]
    fn test_title_word_windows() {
        assert_eq!(leading_words("Best Smart Door Locks", 3), "Best Smart Door");
        assert_eq!(trailing_words("Best Smart Door Locks", 2), "Door Locks");
        assert_eq!(trailing_words("Locks", 2), "Locks");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\n\nthree\t"), 3);
        assert_eq!(word_count(""), 0);
    }
}
