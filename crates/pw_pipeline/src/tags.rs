//! Tag clean-up and augmentation for published posts.

use std::collections::{HashMap, HashSet};

pub const MAX_TAGS: usize = 5;
/// Below this many supplied tags, more are derived from the text.
pub const MIN_SUPPLIED_TAGS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// Trims, drops empties and keeps the first spelling of each tag, compared
/// case-insensitively. At most `limit` tags survive.
pub fn dedup_tags<I, S>(tags: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || !seen.insert(tag.to_lowercase()) {
            continue;
        }
        result.push(tag.to_string());
        if result.len() == limit {
            break;
        }
    }
    result
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The most frequent meaningful words of `content` and `title`, capitalized.
/// Ties keep the order of first appearance.
pub fn generate_tags_from_content(content: &str, title: &str) -> Vec<String> {
    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, word) in words_of(content).chain(words_of(title)).enumerate() {
        if word.chars().count() <= 3 || stop_words.contains(word.as_str()) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .take(MAX_TAGS)
        .map(|(word, _)| capitalize(&word))
        .collect()
}

/// Supplied tags first, topped up from the text when fewer than
/// `MIN_SUPPLIED_TAGS` were given.
pub fn augment_tags(supplied: &[String], content: &str, title: &str) -> Vec<String> {
    let supplied = dedup_tags(supplied, MAX_TAGS);
    if supplied.len() >= MIN_SUPPLIED_TAGS {
        return supplied;
    }
    let generated = generate_tags_from_content(content, title);
    dedup_tags(supplied.iter().chain(generated.iter()), MAX_TAGS)
}
