//! Removes boilerplate and meta-commentary from generated text.
//!
//! Both cleaners repeat their pass until the text stops changing. Every
//! substitution only ever shortens the text, so this terminates, and it makes
//! the cleaners idempotent even when one removal exposes another match.

use lazy_static::lazy_static;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("cleaner pattern must compile"))
        .collect()
}

lazy_static! {
    static ref SEGMENT_PATTERNS: Vec<Regex> = compile(&[
        // word-count statements
        r"(?i)this\s+html\s+has\s+\d+\s+words",
        r"(?i)this\s+article\s+contains\s+\d+\s+words",
        r"(?i)word\s+count:\s*\d+",
        r"(?i)total\s+words:\s*\d+",
        r"(?i)exactly\s+\d+\s+words",
        r"(?i)target\s+word\s+count:\s*\d+",
        // disclosures
        r"(?i)please\s+note\s+that\s+this\s+content",
        r"(?i)this\s+content\s+has\s+been\s+generated",
        r"(?i)ai\s+generated\s+content",
        r"(?i)artificial\s+intelligence\s+generated",
        r"(?i)as\s+an\s+ai\s+language\s+model,?",
    ]);

    static ref PUBLISH_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\*\*(?:meta description|tags|word count|custom message)\*\*[^\n]*(?:\n[^\n#\-*\d][^\n]*)*",
        r#"(?i)\**"?continue generating\?"?\**"#,
        r"(?i)<!--\s*nextpage\s*-->",
    ]);

    static ref LEADING_HEADINGS: Vec<Regex> = compile(&[
        r"^\s*#[ \t]+([^\n]*)",
        r"(?is)^\s*<h1[^>]*>(.*?)</h1>",
    ]);

    static ref BLANK_LINE_RUNS: Regex = Regex::new(r"\n\s*\n\s*\n").expect("blank line pattern");
    static ref SPACE_RUNS: Regex = Regex::new(r"[ \t]{2,}").expect("space pattern");
}

fn strip_all(text: &str, patterns: &[Regex]) -> String {
    patterns.iter().fold(text.to_string(), |acc, re| {
        re.replace_all(&acc, "").into_owned()
    })
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = BLANK_LINE_RUNS.replace_all(text, "\n\n");
    SPACE_RUNS.replace_all(&collapsed, " ").trim().to_string()
}

fn until_stable(text: &str, pass: impl Fn(&str) -> String) -> String {
    let mut current = pass(text);
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn heading_key(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops a leading H1 (Markdown or HTML) whose text is the post title. Any
/// other leading heading is a real section and stays.
fn strip_title_heading(text: &str, title: &str) -> String {
    let title = heading_key(title);
    if title.is_empty() {
        return text.to_string();
    }
    for re in LEADING_HEADINGS.iter() {
        if let Some(caps) = re.captures(text) {
            if heading_key(&caps[1]) == title {
                return text[caps[0].len()..].to_string();
            }
        }
    }
    text.to_string()
}

fn segment_pass(text: &str) -> String {
    normalize_whitespace(&strip_all(text, &SEGMENT_PATTERNS))
}

/// Cleans one freshly generated part or section.
pub fn clean_segment(text: &str) -> String {
    until_stable(text, segment_pass)
}

/// Final cleanup before publishing: everything `clean_segment` removes, plus
/// the continuation sentinel, page-break markers, a leading H1 repeating
/// `title` and the metadata blocks models like to echo back.
pub fn clean_for_publish(text: &str, title: &str) -> String {
    until_stable(text, |t| {
        segment_pass(&strip_all(&strip_title_heading(t, title), &PUBLISH_PATTERNS))
    })
}
