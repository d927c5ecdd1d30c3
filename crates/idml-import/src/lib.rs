//! # idml-import
//!
//! Magazine page import from `InDesign` IDML packages.
//!
//! An IDML package is a ZIP archive of XML documents. This crate reads the
//! spread documents (frame and graphic placement) and the story documents
//! (styled text), recognizes which stories hold the page headline, the lead
//! and the repeating teaser or parallax blocks, and then works out which
//! placed image belongs to which block. IDML has no explicit link between a
//! story and the images next to it, so that last step is done purely from
//! page geometry.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Read entries | [`container`] | spread and story XML |
//! | Parse | [`idml`] | text frame positions, image candidates, parsed stories |
//! | Classify | [`classify`] | headline, lead, teasers, info teasers, parallax items |
//! | Assign | [`assign`] | one image per record, nearest by position |
//! | Resolve | [`resolver`] | asset ids for expected rendition names |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idml_import::{ImportOptions, Importer, LayoutMode};
//!
//! let importer = Importer::new(ImportOptions::for_layout(LayoutMode::TeaserList));
//! let result = importer.import_file("issue-12.idml")?;
//!
//! println!("{}", result.headline);
//! for teaser in &result.teasers {
//!     println!("{} | {} -> {} [{}]", teaser.location, teaser.headline, teaser.url, teaser.image_basename);
//! }
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), idml_import::ImportError>(())
//! ```
//!
//! ## Error Handling
//!
//! Only a package that cannot be opened, or one without spreads, is an
//! error. Unparseable documents, unrecognized styles and missing assets end
//! up in [`ImportResult::warnings`].
//!
//! ```rust,no_run
//! use idml_import::{ImportError, ImportOptions, Importer};
//!
//! match Importer::new(ImportOptions::default()).import_file("page.idml") {
//!     Ok(result) => println!("{} warning(s)", result.warnings.len()),
//!     Err(ImportError::NoSpreads) => eprintln!("not a page layout"),
//!     Err(e) => eprintln!("import failed: {e}"),
//! }
//! ```

/// Image-to-record assignment by page position
pub mod assign;
/// Story role classification
pub mod classify;
/// Import options and style vocabulary
pub mod config;
/// Package entry access
pub mod container;
/// Error types
pub mod error;
/// Transform decoding and positions
pub mod geometry;
/// IDML spread and story parsing
pub mod idml;
/// Import pipeline
pub mod pipeline;
/// Output records
pub mod record;
/// Asset lookup
pub mod resolver;
/// Text normalization
pub mod text;

pub use classify::{Classification, StoryClassifier};
pub use config::{ImportOptions, LayoutMode, RenditionConfig, StyleVocabulary};
pub use container::{Container, MemoryContainer, ZipContainer};
pub use error::{ImportError, Result};
pub use geometry::Position;
pub use idml::{ImageCandidate, Paragraph, ParsedStory, SpreadLayout};
pub use pipeline::Importer;
pub use record::{ImageSlot, ImportResult, InfoTeaser, ParallaxItem, Teaser, NO_ATTACHMENT};
pub use resolver::{AssetResolver, ManifestResolver};
