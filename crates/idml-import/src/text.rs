//! Text normalization and URL recovery for story content

use regex::Regex;
use std::sync::LazyLock;

// A single URL-like token: scheme-qualified, protocol-relative, `www.` or a bare domain
static RE_URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[a-z][a-z0-9+.-]*://\S+|//[^/\s]\S*|www\.\S+|[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?(?:\.[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?)*\.[a-z]{2,}(?::\d+)?(?:[/?#]\S*)?)$",
    )
    .expect("valid url token regex")
});

/// Punctuation allowed to trail a URL without belonging to it
const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '"', '\'', '»', '«', '\u{201c}', '\u{201d}',
];

/// `InDesign` placeholder for anchored objects, never visible text
const ANCHOR_PLACEHOLDER: char = '\u{feff}';

/// Normalize whitespace in story text
///
/// Forced line breaks become spaces, carriage returns become newlines, every
/// whitespace run collapses to a single space and the result is trimmed.
/// Applying it twice yields the same string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let text = text
        .replace(['\u{2028}', '\u{2029}'], " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(ANCHOR_PLACEHOLDER, "");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text on hard line breaks, normalizing each line and dropping empty ones
#[must_use]
pub fn normalized_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(normalize)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Bring a URL into canonical form, defaulting the scheme to `https://`
///
/// Embedded whitespace (line breaks inside a URL run) is removed and trailing
/// punctuation is dropped. Empty input stays empty.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let compact: String = url.split_whitespace().collect();
    let url = compact
        .trim_start_matches(['(', '<', '[', '"', '\''])
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim_end_matches('>');

    if url.is_empty() {
        return String::new();
    }

    let lower = url.to_ascii_lowercase();
    if lower.contains("://") || lower.starts_with("mailto:") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{url}")
    }
}

/// Detect and remove a URL-like token at the end of `text`
///
/// Returns the remaining text (trimmed) and the normalized URL. When the last
/// token is not URL-like the input comes back unchanged with an empty URL.
#[must_use]
pub fn extract_trailing_url(text: &str) -> (String, String) {
    let trimmed = text.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());

    let token = trimmed[start..].trim_end_matches(TRAILING_PUNCTUATION);
    if token.is_empty() || !RE_URL_TOKEN.is_match(token) {
        return (text.to_string(), String::new());
    }

    (trimmed[..start].trim().to_string(), normalize_url(token))
}
