//! Import pipeline: container entries to an [`ImportResult`]

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::assign::{assign, raster_reading_order, rendition_name};
use crate::classify::{diagnostic_snapshot, StoryClassifier};
use crate::config::{ImportOptions, LayoutMode, RenditionConfig};
use crate::container::{Container, EntryKind, ZipContainer};
use crate::error::{ImportError, Result};
use crate::geometry::Position;
use crate::idml::{self, ImageCandidate, ParsedStory, SpreadLayout};
use crate::record::{ImageSlot, ImportResult, InfoTeaser, NO_ATTACHMENT};

/// Runs imports with fixed options and an optional asset resolver
///
/// # Examples
///
/// ```no_run
/// use idml_import::{ImportOptions, Importer, LayoutMode, ManifestResolver};
///
/// let assets = ManifestResolver::load("assets.json")?;
/// let importer = Importer::new(ImportOptions::for_layout(LayoutMode::TeaserList))
///     .with_resolver(&assets);
///
/// let result = importer.import_file("issue-12.idml")?;
/// println!("{} teasers, {} warnings", result.teasers.len(), result.warnings.len());
/// # Ok::<(), idml_import::ImportError>(())
/// ```
pub struct Importer<'r> {
    options: ImportOptions,
    resolver: Option<&'r dyn crate::resolver::AssetResolver>,
}

impl std::fmt::Debug for Importer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("options", &self.options)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Per-file parse output merged across the package
#[derive(Debug, Default)]
struct PackageContents {
    spread_files: usize,
    story_files: usize,
    text_frames: HashMap<String, Position>,
    images: Vec<ImageCandidate>,
    stories: Vec<ParsedStory>,
}

impl<'r> Importer<'r> {
    /// Create an importer without asset resolution
    #[must_use]
    pub const fn new(options: ImportOptions) -> Self {
        Self {
            options,
            resolver: None,
        }
    }

    /// Resolve expected image filenames against `resolver`
    #[must_use]
    pub fn with_resolver(mut self, resolver: &'r dyn crate::resolver::AssetResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Options this importer runs with
    #[must_use]
    pub const fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import an `.idml` file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened as a ZIP archive or
    /// contains no spread documents.
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportResult> {
        let mut container = ZipContainer::open(path)?;
        self.import(&mut container)
    }

    /// Import from any container
    ///
    /// # Errors
    ///
    /// Returns `ImportError::NoSpreads` if the container holds no spread
    /// documents. Every other problem is reported as a warning.
    pub fn import<C: Container + ?Sized>(&self, container: &mut C) -> Result<ImportResult> {
        let contents = read_package(container)?;
        let mut warnings = Vec::new();

        let classification = StoryClassifier::new(&self.options.vocabulary).classify(&contents.stories);

        let mut result = ImportResult {
            headline: classification.headline.clone(),
            lead: classification.lead.clone(),
            ..ImportResult::default()
        };

        if result.headline.is_empty() {
            push_warning(&mut warnings, "No headline found".to_string());
        }
        if result.lead.is_empty() {
            push_warning(&mut warnings, "No lead found".to_string());
        }
        if classification.has_no_content_stories() {
            push_warning(&mut warnings, "No teaser or info stories found".to_string());
        }

        let rendition = &self.options.rendition;
        match self.options.layout {
            LayoutMode::TeaserList => {
                result.teasers = classification.teasers;
                result.info_teasers = classification.info_teasers;
                apply_order_override(&mut result.info_teasers, &self.options.order_override);

                if result.teasers.is_empty() && result.info_teasers.is_empty() {
                    self.warn_missing_roles(&mut warnings, &contents);
                }

                let mut slots: Vec<&mut dyn ImageSlot> = result
                    .teasers
                    .iter_mut()
                    .map(|t| t as &mut dyn ImageSlot)
                    .chain(result.info_teasers.iter_mut().map(|t| t as &mut dyn ImageSlot))
                    .collect();
                self.place_images(&mut slots, &contents.images, &contents.text_frames, rendition, &mut warnings);
            }
            LayoutMode::ParallaxList => {
                result.parallax_items = classification.parallax_items;

                if result.parallax_items.is_empty() {
                    self.warn_missing_roles(&mut warnings, &contents);
                }

                let candidates = raster_reading_order(&contents.images);
                let mut slots: Vec<&mut dyn ImageSlot> = result
                    .parallax_items
                    .iter_mut()
                    .map(|p| p as &mut dyn ImageSlot)
                    .collect();
                self.place_images(&mut slots, &candidates, &contents.text_frames, rendition, &mut warnings);
            }
        }

        result.warnings = warnings;
        info!(
            "Imported {} layout: {} teaser(s), {} info teaser(s), {} parallax item(s), {} warning(s)",
            self.options.layout,
            result.teasers.len(),
            result.info_teasers.len(),
            result.parallax_items.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    fn warn_missing_roles(&self, warnings: &mut Vec<String>, contents: &PackageContents) {
        push_warning(
            warnings,
            format!("No stories match the {} layout", self.options.layout),
        );
        push_warning(
            warnings,
            diagnostic_snapshot(contents.spread_files, contents.story_files, &contents.stories),
        );
    }

    /// Assign images to records by anchor distance and resolve their assets
    fn place_images(
        &self,
        slots: &mut [&mut dyn ImageSlot],
        candidates: &[ImageCandidate],
        text_frames: &HashMap<String, Position>,
        rendition: &RenditionConfig,
        warnings: &mut Vec<String>,
    ) {
        if slots.is_empty() {
            return;
        }

        let anchors: Vec<Position> = slots
            .iter()
            .map(|slot| {
                text_frames.get(slot.story_id()).copied().unwrap_or_else(|| {
                    push_warning(
                        warnings,
                        format!("No text frame position for story {}; using page origin", slot.story_id()),
                    );
                    Position::default()
                })
            })
            .collect();
        let positions: Vec<Position> = candidates.iter().map(|c| c.position).collect();

        for (slot, mapping) in slots.iter_mut().zip(assign(&anchors, &positions)) {
            let Some(index) = mapping else {
                debug!("No image left for story {}", slot.story_id());
                continue;
            };
            let original = &candidates[index].basename;
            let expected = rendition_name(original, &rendition.suffix, &rendition.extension);
            debug!("Story {} gets image {original} ({expected})", slot.story_id());

            if let Some(resolver) = self.resolver {
                let id = resolver.resolve(&expected).or_else(|| resolver.resolve(original));
                if id.is_none() {
                    push_warning(
                        warnings,
                        format!(
                            "Image not found in asset library: {expected} (source {original}, story {})",
                            slot.story_id()
                        ),
                    );
                }
                slot.set_attachment_id(id.unwrap_or(NO_ATTACHMENT));
            }
            slot.set_image_basename(expected);
        }
    }
}

fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

/// Stable sort of info teasers by override key; unkeyed records keep their order after keyed ones
fn apply_order_override(items: &mut [InfoTeaser], order: &HashMap<String, i64>) {
    if order.is_empty() {
        return;
    }
    items.sort_by_key(|item| order.get(&item.story_id).map_or((1, 0), |&key| (0, key)));
}

/// Read and parse every spread and story entry, then merge the tables
fn read_package<C: Container + ?Sized>(container: &mut C) -> Result<PackageContents> {
    let mut names = container.entry_names();
    names.sort();

    let mut spread_docs = Vec::new();
    let mut story_docs = Vec::new();
    for name in names {
        let kind = EntryKind::of(&name);
        if kind == EntryKind::Other {
            continue;
        }
        let xml = match container.read_entry(&name) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim_start_matches('\u{feff}').to_string(),
            Err(e) => {
                warn!("Skipping unreadable entry {name}: {e}");
                continue;
            }
        };
        match kind {
            EntryKind::Spread => spread_docs.push((name, xml)),
            EntryKind::Story => story_docs.push((name, xml)),
            EntryKind::Other => {}
        }
    }

    if spread_docs.is_empty() {
        return Err(ImportError::NoSpreads);
    }

    let layouts: Vec<Option<SpreadLayout>> = spread_docs
        .par_iter()
        .map(|(name, xml)| {
            let layout = idml::parse_spread(xml);
            if layout.is_none() {
                warn!("Skipping unparseable spread {name}");
            }
            layout
        })
        .collect();
    let parsed: Vec<ParsedStory> = story_docs
        .par_iter()
        .map(|(name, xml)| {
            let story = idml::parse_story(xml);
            debug!("Parsed {name}: story '{}' with {} paragraph(s)", story.id, story.paragraphs.len());
            story
        })
        .collect();

    let mut contents = PackageContents {
        spread_files: spread_docs.len(),
        story_files: story_docs.len(),
        ..PackageContents::default()
    };

    for layout in layouts.into_iter().flatten() {
        for (story_id, position) in layout.text_frames {
            contents.text_frames.entry(story_id).or_insert(position);
        }
        contents.images.extend(layout.images);
    }

    let mut seen = std::collections::HashSet::new();
    for story in parsed {
        if !story.is_valid() {
            continue;
        }
        if !seen.insert(story.id.clone()) {
            debug!("Ignoring duplicate story id {}", story.id);
            continue;
        }
        contents.stories.push(story);
    }

    debug!(
        "Package: {} spread(s), {} story file(s), {} text frame(s), {} image(s), {} usable stor(ies)",
        contents.spread_files,
        contents.story_files,
        contents.text_frames.len(),
        contents.images.len(),
        contents.stories.len()
    );
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(story_id: &str) -> InfoTeaser {
        InfoTeaser {
            story_id: story_id.to_string(),
            ..InfoTeaser::default()
        }
    }

    #[test]
    fn test_order_override_is_stable() {
        let mut items = vec![info("a"), info("b"), info("c"), info("d")];
        let order = HashMap::from([("c".to_string(), 1), ("a".to_string(), 2)]);
        apply_order_override(&mut items, &order);

        let ids: Vec<&str> = items.iter().map(|i| i.story_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_empty_override_keeps_order() {
        let mut items = vec![info("b"), info("a")];
        apply_order_override(&mut items, &HashMap::new());
        assert_eq!(items[0].story_id, "b");
    }
}
