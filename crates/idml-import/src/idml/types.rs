//! Parsed primitives of IDML spread and story documents

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// A placed graphic on a spread
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Translation of the graphic on the page
    pub position: Position,
    /// Decoded, path-stripped filename of the link resource (e.g. "cover.psd")
    pub basename: String,
}

impl ImageCandidate {
    /// Create a new image candidate
    #[inline]
    #[must_use]
    pub fn new(position: Position, basename: impl Into<String>) -> Self {
        Self {
            position,
            basename: basename.into(),
        }
    }

    /// Lowercased file extension of the basename, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.basename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Text frame and graphic placements of one spread document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadLayout {
    /// Position of the first text frame of each story, keyed by story id
    pub text_frames: HashMap<String, Position>,
    /// Placed graphics in document order
    pub images: Vec<ImageCandidate>,
}

impl SpreadLayout {
    /// Record a text frame; the first frame seen for a story wins
    pub fn add_text_frame(&mut self, story_id: &str, position: Position) {
        if story_id.is_empty() || story_id == "n" {
            return;
        }
        self.text_frames
            .entry(story_id.to_string())
            .or_insert(position);
    }

    /// Whether the spread contributes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_frames.is_empty() && self.images.is_empty()
    }
}

/// A paragraph style range with its body and URL buffers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Paragraph {
    /// Decoded paragraph style name (e.g. "Teaser-Link")
    pub style: String,
    /// Text from runs that are not URL-styled; hard breaks kept as `\n`
    pub text: String,
    /// Text captured under URL-styled character runs
    pub url: String,
}

impl Paragraph {
    /// Create a paragraph without URL text
    #[inline]
    #[must_use]
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
            url: String::new(),
        }
    }

    /// Create a paragraph carrying URL-styled text
    #[inline]
    #[must_use]
    pub fn with_url(style: impl Into<String>, text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
            url: url.into(),
        }
    }
}

/// One story document after parsing
///
/// An empty `id` marks a document that could not be parsed at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStory {
    /// Story id from the `Self` attribute (e.g. "u1a4")
    pub id: String,
    /// All paragraph text joined by newlines, URL text included
    pub text_all: String,
    /// Distinct paragraph style names present in the story
    pub paragraph_styles: BTreeSet<String>,
    /// Whether any character run was URL-styled
    pub has_url_style: bool,
    /// Paragraphs in reading order
    pub paragraphs: Vec<Paragraph>,
}

impl ParsedStory {
    /// Create an empty story with the given id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Build a story from its paragraphs, deriving the aggregate fields
    #[must_use]
    pub fn from_paragraphs(id: impl Into<String>, paragraphs: Vec<Paragraph>) -> Self {
        let mut story = Self::new(id);
        for paragraph in paragraphs {
            story.add_paragraph(paragraph);
        }
        story
    }

    /// Append a paragraph; empty paragraphs are dropped with their style
    pub fn add_paragraph(&mut self, mut paragraph: Paragraph) {
        paragraph.text = paragraph.text.trim().to_string();
        paragraph.url = paragraph.url.trim().to_string();
        if paragraph.text.is_empty() && paragraph.url.is_empty() {
            return;
        }

        if !paragraph.url.is_empty() {
            self.has_url_style = true;
        }

        let line = match (paragraph.text.is_empty(), paragraph.url.is_empty()) {
            (_, true) => paragraph.text.clone(),
            (true, false) => paragraph.url.clone(),
            (false, false) => format!("{} {}", paragraph.text, paragraph.url),
        };
        if !self.text_all.is_empty() {
            self.text_all.push('\n');
        }
        self.text_all.push_str(&line);

        self.paragraph_styles.insert(paragraph.style.clone());
        self.paragraphs.push(paragraph);
    }

    /// Whether the story could be parsed
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_aggregates() {
        let story = ParsedStory::from_paragraphs(
            "u10",
            vec![
                Paragraph::new("Location", "Berlin"),
                Paragraph::with_url("Teaser-Link", "Read more", "example.com"),
                Paragraph::new("Body", "   "),
            ],
        );
        assert_eq!(story.paragraphs.len(), 2);
        assert!(story.has_url_style);
        assert_eq!(story.text_all, "Berlin\nRead more example.com");
        assert!(story.paragraph_styles.contains("Location"));
        assert!(!story.paragraph_styles.contains("Body"));
    }

    #[test]
    fn test_empty_story_is_invalid() {
        assert!(!ParsedStory::default().is_valid());
        assert!(ParsedStory::new("u1").is_valid());
    }

    #[test]
    fn test_first_text_frame_wins() {
        let mut layout = SpreadLayout::default();
        layout.add_text_frame("u1", Position::new(1.0, 1.0));
        layout.add_text_frame("u1", Position::new(9.0, 9.0));
        layout.add_text_frame("n", Position::new(2.0, 2.0));
        assert_eq!(layout.text_frames.len(), 1);
        assert_eq!(layout.text_frames["u1"], Position::new(1.0, 1.0));
    }

    #[test]
    fn test_image_extension() {
        let image = ImageCandidate::new(Position::default(), "Cover.Final.PSD");
        assert_eq!(image.extension().as_deref(), Some("psd"));
        assert_eq!(ImageCandidate::new(Position::default(), "README").extension(), None);
    }
}
