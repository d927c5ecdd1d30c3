//! IDML (`InDesign` Markup Language) spread and story parsing
//!
//! Every document is parsed with the [`StrictParser`] first. Exported
//! packages are not always well-formed, so when DOM parsing fails the
//! [`TolerantParser`] recovers the same primitives by scanning the raw text.
//! Both implement [`DocumentParser`] and produce identical shapes.
//!
//! # Examples
//!
//! ```
//! use idml_import::idml::parse_story;
//!
//! let xml = r#"<Story Self="u1"><ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Headline">
//!   <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/$ID/[No character style]">
//!     <Content>Welcome Issue</Content>
//!   </CharacterStyleRange></ParagraphStyleRange></Story>"#;
//!
//! let story = parse_story(xml);
//! assert_eq!(story.id, "u1");
//! assert_eq!(story.paragraphs[0].text, "Welcome Issue");
//! ```

/// Style name decoding and the URL run rule
pub mod style;
/// DOM-based parser
pub mod strict;
/// Pattern-based recovery parser
pub mod tolerant;
/// Parsed spread and story primitives
pub mod types;

pub use strict::StrictParser;
pub use tolerant::TolerantParser;
pub use types::{ImageCandidate, Paragraph, ParsedStory, SpreadLayout};

use crate::error::Result;

/// Element names of placed graphics that carry a `Link`
pub(crate) const GRAPHIC_ELEMENTS: &[&str] = &["Image", "EPS", "PDF"];

/// A parsing strategy for spread and story documents
pub trait DocumentParser {
    /// Short strategy name used in log messages
    fn name(&self) -> &'static str;

    /// Parse one spread document
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` if the strategy cannot read the document.
    fn parse_spread(&self, xml: &str) -> Result<SpreadLayout>;

    /// Parse one story document
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` if the strategy cannot read the document.
    fn parse_story(&self, xml: &str) -> Result<ParsedStory>;
}

/// Parse a spread, falling back to the tolerant scanner on failure
///
/// Returns `None` when both strategies fail.
#[must_use]
pub fn parse_spread(xml: &str) -> Option<SpreadLayout> {
    match StrictParser.parse_spread(xml) {
        Ok(layout) => Some(layout),
        Err(e) => {
            log::warn!(
                "{} spread parsing failed, retrying with {} parser: {e}",
                StrictParser.name(),
                TolerantParser.name()
            );
            TolerantParser
                .parse_spread(xml)
                .map_err(|e| log::warn!("{} spread parsing failed: {e}", TolerantParser.name()))
                .ok()
        }
    }
}

/// Parse a story, falling back to the tolerant scanner on failure
///
/// Never fails: an unreadable document yields an empty story (empty id).
#[must_use]
pub fn parse_story(xml: &str) -> ParsedStory {
    match StrictParser.parse_story(xml) {
        Ok(story) => story,
        Err(e) => {
            log::warn!(
                "{} story parsing failed, retrying with {} parser: {e}",
                StrictParser.name(),
                TolerantParser.name()
            );
            TolerantParser.parse_story(xml).unwrap_or_else(|e| {
                log::warn!("{} story parsing failed: {e}", TolerantParser.name());
                ParsedStory::default()
            })
        }
    }
}

/// Accumulates the body and URL buffers of one paragraph style range
#[derive(Debug, Default)]
pub(crate) struct ParagraphBuilder {
    style: String,
    text: String,
    url: String,
}

impl ParagraphBuilder {
    pub(crate) fn new(style: String) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub(crate) fn push_text(&mut self, in_url_run: bool, content: &str) {
        self.buffer(in_url_run).push_str(content);
    }

    pub(crate) fn push_break(&mut self, in_url_run: bool) {
        self.buffer(in_url_run).push('\n');
    }

    fn buffer(&mut self, in_url_run: bool) -> &mut String {
        if in_url_run {
            &mut self.url
        } else {
            &mut self.text
        }
    }

    pub(crate) fn finish(self) -> Paragraph {
        Paragraph::with_url(self.style, self.text, self.url)
    }
}
