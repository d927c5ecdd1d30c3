//! Classified records and the final import result

use serde::{Deserialize, Serialize};

/// Attachment id meaning "no asset resolved"
pub const NO_ATTACHMENT: u64 = 0;

/// A record that can receive an image through spatial assignment
pub trait ImageSlot {
    /// Id of the story the record was classified from
    fn story_id(&self) -> &str;

    /// Store the expected rendition filename
    fn set_image_basename(&mut self, basename: String);

    /// Store the resolved asset id ([`NO_ATTACHMENT`] when absent)
    fn set_attachment_id(&mut self, id: u64);
}

/// A teaser with location line, headline, intro and link
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teaser {
    /// Source story id
    pub story_id: String,
    /// Location line (e.g. "Berlin")
    pub location: String,
    /// Teaser headline
    pub headline: String,
    /// Intro text with any trailing URL removed
    pub intro: String,
    /// Normalized link target
    pub url: String,
    /// Expected rendition filename of the assigned image
    pub image_basename: String,
    /// Resolved asset id, [`NO_ATTACHMENT`] when absent
    pub attachment_id: u64,
}

/// A teaser built from an info-page story
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfoTeaser {
    /// Source story id
    pub story_id: String,
    /// Location line
    pub location: String,
    /// Info headline
    pub headline: String,
    /// Info body text with any trailing URL removed
    pub intro: String,
    /// Normalized link target
    pub url: String,
    /// Expected rendition filename of the assigned image
    pub image_basename: String,
    /// Resolved asset id, [`NO_ATTACHMENT`] when absent
    pub attachment_id: u64,
}

/// One item of a parallax scrolling list
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParallaxItem {
    /// Source story id
    pub story_id: String,
    /// Location line
    pub location: String,
    /// Item title
    pub title: String,
    /// Body paragraphs separated by blank lines
    pub body: String,
    /// Expected rendition filename of the assigned image
    pub image_basename: String,
    /// Resolved asset id, [`NO_ATTACHMENT`] when absent
    pub attachment_id: u64,
}

macro_rules! impl_image_slot {
    ($($record:ty),+) => {
        $(
            impl ImageSlot for $record {
                fn story_id(&self) -> &str {
                    &self.story_id
                }

                fn set_image_basename(&mut self, basename: String) {
                    self.image_basename = basename;
                }

                fn set_attachment_id(&mut self, id: u64) {
                    self.attachment_id = id;
                }
            }
        )+
    };
}

impl_image_slot!(Teaser, InfoTeaser, ParallaxItem);

/// Terminal artifact of one import run
///
/// Warnings are advisory; their presence does not mean the run failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Page headline
    pub headline: String,
    /// Lead paragraph
    pub lead: String,
    /// Teasers (teaser-list layout)
    pub teasers: Vec<Teaser>,
    /// Info teasers (teaser-list layout)
    pub info_teasers: Vec<InfoTeaser>,
    /// Parallax items (parallax-list layout)
    pub parallax_items: Vec<ParallaxItem>,
    /// Diagnostics collected during the run, in order
    pub warnings: Vec<String>,
}
