//! Style and link-reference name handling shared by both parser strategies

use percent_encoding::percent_decode_str;

/// Decode a percent-encoded attribute value, replacing invalid UTF-8
#[must_use]
pub fn percent_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Decode an `AppliedParagraphStyle` reference into the stored style name
///
/// `ParagraphStyle/Teaser%3aLocation` becomes `Teaser:Location`; the
/// `$ID/` marker of built-in styles is dropped as well.
#[must_use]
pub fn paragraph_style_name(reference: &str) -> String {
    let decoded = percent_decode(reference);
    let name = decoded.strip_prefix("ParagraphStyle/").unwrap_or(&decoded);
    let name = name.strip_prefix("$ID/").unwrap_or(name);
    name.trim().to_string()
}

/// Whether an `AppliedCharacterStyle` reference marks link text
#[must_use]
pub fn is_url_character_style(reference: &str) -> bool {
    let decoded = percent_decode(reference);
    if decoded.ends_with("/URL") {
        return true;
    }
    let lower = decoded.to_lowercase();
    lower.contains("www") || lower.contains("url")
}

/// Decoded, path-stripped filename of a `LinkResourceURI`
///
/// Handles `file:` URIs with either separator, e.g.
/// `file:///Volumes/Job/Links/Foto%201.psd` gives `Foto 1.psd`.
#[must_use]
pub fn link_basename(uri: &str) -> String {
    let decoded = percent_decode(uri.trim());
    decoded
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
