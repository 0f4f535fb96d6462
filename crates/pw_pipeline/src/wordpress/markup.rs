//! Body normalization before a post is submitted.

use lazy_static::lazy_static;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

pub const WORDS_PER_PAGE: usize = 1200;
pub const PAGE_BREAK: &str = "\n<!--nextpage-->\n";

lazy_static! {
    static ref BLOCK_BOUNDARY: Regex = Regex::new(
        r"(?i)(</(?:h[1-6]|p|ul|ol|blockquote|pre|table)>)\s*(<(?:h[1-6]|p|ul|ol|blockquote|pre|table)[\s>])"
    )
    .expect("block boundary pattern");
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t]*\n").expect("blank line pattern");
    static ref WORD: Regex = Regex::new(r"\S+").expect("word pattern");
}

/// Renders Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

fn separate_blocks(content: &str) -> String {
    // adjacent boundaries share a tag, so one pass can miss every other gap
    let mut current = content.to_string();
    loop {
        let next = BLOCK_BOUNDARY.replace_all(&current, "$1\n\n$2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn opens_pre(block: &str) -> bool {
    let lower = block.to_lowercase();
    match (lower.rfind("<pre"), lower.rfind("</pre>")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

fn closes_pre(block: &str) -> bool {
    block.to_lowercase().contains("</pre>")
}

/// Blank line between adjacent block elements; text blocks that do not start
/// with markup are wrapped in `<p>`. Preformatted blocks are left alone.
pub fn normalize_markup(content: &str) -> String {
    let spaced = separate_blocks(content.trim());
    let mut blocks = Vec::new();
    let mut in_pre = false;

    for block in BLANK_LINES.split(&spaced) {
        let block = block.trim_end();
        if in_pre {
            in_pre = !closes_pre(block) || opens_pre(block);
            blocks.push(block.to_string());
            continue;
        }
        let trimmed = block.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('<') {
            blocks.push(trimmed.to_string());
        } else {
            blocks.push(format!("<p>{}</p>", trimmed));
        }
        in_pre = opens_pre(trimmed);
    }

    blocks.join("\n\n")
}

/// Inserts `PAGE_BREAK` after every `words_per_page`-th word when the body is
/// longer than one page. Never after the final word.
pub fn insert_page_breaks(content: &str, words_per_page: usize) -> String {
    let words: Vec<_> = WORD.find_iter(content).collect();
    if words_per_page == 0 || words.len() <= words_per_page {
        return content.to_string();
    }

    let mut result = String::with_capacity(content.len() + words.len() / words_per_page * PAGE_BREAK.len());
    let mut copied = 0;
    for (index, word) in words.iter().enumerate() {
        let position = index + 1;
        if position % words_per_page == 0 && position < words.len() {
            result.push_str(&content[copied..word.end()]);
            result.push_str(PAGE_BREAK);
            copied = word.end();
        }
    }
    result.push_str(&content[copied..]);
    result
}

/// Everything the publisher does to a body before submitting it.
pub fn prepare_content(content: &str) -> String {
    insert_page_breaks(&normalize_markup(content), WORDS_PER_PAGE)
}
