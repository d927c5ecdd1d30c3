//! Story classification
//!
//! Stories are matched against a prioritized rule table. Each story takes the
//! first rule whose predicate holds; headline and lead are claimed by the
//! first matching story only. When headline or lead are still empty after
//! the pass, the fallback tier re-scans the unclaimed stories and keeps the
//! shortest candidate text.

use std::collections::{BTreeSet, HashSet};

use crate::config::StyleVocabulary;
use crate::idml::{Paragraph, ParsedStory};
use crate::record::{InfoTeaser, ParallaxItem, Teaser};
use crate::text::{extract_trailing_url, normalize, normalize_url, normalized_lines};

/// Upper bound on style names listed in a diagnostic snapshot
pub const DIAGNOSTIC_STYLE_SAMPLE: usize = 20;

/// Roles and fields recovered from a story collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Page headline, empty when not found
    pub headline: String,
    /// Story the headline came from
    pub headline_story: Option<String>,
    /// Lead paragraph, empty when not found
    pub lead: String,
    /// Story the lead came from
    pub lead_story: Option<String>,
    /// Teaser records in story order
    pub teasers: Vec<Teaser>,
    /// Info teaser records in story order
    pub info_teasers: Vec<InfoTeaser>,
    /// Parallax records in story order, one per info story
    pub parallax_items: Vec<ParallaxItem>,
}

impl Classification {
    /// Whether neither teaser nor info stories were found
    #[must_use]
    pub fn has_no_content_stories(&self) -> bool {
        self.teasers.is_empty() && self.info_teasers.is_empty() && self.parallax_items.is_empty()
    }
}

type Predicate = fn(&StyleVocabulary, &ParsedStory, &Classification) -> bool;
type Extractor = fn(&StyleVocabulary, &ParsedStory, &mut Classification);

/// One entry of the primary rule table
struct Rule {
    name: &'static str,
    applies: Predicate,
    extract: Extractor,
}

/// A fallback tier: fills a role that is still empty after the primary pass
struct FallbackRule {
    name: &'static str,
    needed: fn(&Classification) -> bool,
    candidate: fn(&StyleVocabulary, &ParsedStory) -> bool,
    assign: fn(&mut Classification, &ParsedStory, String),
}

const RULES: &[Rule] = &[
    Rule {
        name: "headline",
        applies: is_headline,
        extract: take_headline,
    },
    Rule {
        name: "lead",
        applies: is_lead,
        extract: take_lead,
    },
    Rule {
        name: "teaser",
        applies: is_teaser,
        extract: take_teaser,
    },
    Rule {
        name: "info",
        applies: is_info,
        extract: take_info,
    },
];

const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "alternate headline",
        needed: headline_missing,
        candidate: is_alternate_headline,
        assign: assign_headline,
    },
    FallbackRule {
        name: "alternate lead",
        needed: lead_missing,
        candidate: is_alternate_lead,
        assign: assign_lead,
    },
];

fn is_headline(v: &StyleVocabulary, story: &ParsedStory, found: &Classification) -> bool {
    found.headline_story.is_none() && !is_info_like(v, story) && has_style(story, &v.headline)
}

fn take_headline(_: &StyleVocabulary, story: &ParsedStory, found: &mut Classification) {
    assign_headline(found, story, role_text(story));
}

fn is_lead(v: &StyleVocabulary, story: &ParsedStory, found: &Classification) -> bool {
    found.lead_story.is_none() && !is_info_like(v, story) && has_style(story, &v.lead)
}

fn take_lead(_: &StyleVocabulary, story: &ParsedStory, found: &mut Classification) {
    assign_lead(found, story, role_text(story));
}

fn is_teaser(v: &StyleVocabulary, story: &ParsedStory, _: &Classification) -> bool {
    !is_info_like(v, story)
        && story.has_url_style
        && has_style(story, &v.location)
        && has_style(story, &v.teaser_link)
}

fn take_teaser(v: &StyleVocabulary, story: &ParsedStory, found: &mut Classification) {
    found.teasers.push(extract_teaser(v, story));
}

// The location marker is optional: an info story without one still classifies
fn is_info(v: &StyleVocabulary, story: &ParsedStory, _: &Classification) -> bool {
    has_style(story, &v.info_head) && has_style(story, &v.info_body)
}

fn take_info(v: &StyleVocabulary, story: &ParsedStory, found: &mut Classification) {
    found.info_teasers.push(extract_info_teaser(v, story));
    found.parallax_items.push(extract_parallax_item(v, story));
}

fn headline_missing(found: &Classification) -> bool {
    found.headline.is_empty()
}

fn lead_missing(found: &Classification) -> bool {
    found.lead.is_empty()
}

fn is_alternate_headline(v: &StyleVocabulary, story: &ParsedStory) -> bool {
    !is_info_like(v, story) && has_style(story, &v.alt_headline)
}

fn is_alternate_lead(v: &StyleVocabulary, story: &ParsedStory) -> bool {
    has_style(story, &v.alt_lead)
}

fn assign_headline(found: &mut Classification, story: &ParsedStory, text: String) {
    found.headline = text;
    found.headline_story = Some(story.id.clone());
}

fn assign_lead(found: &mut Classification, story: &ParsedStory, text: String) {
    found.lead = text;
    found.lead_story = Some(story.id.clone());
}

/// Classifier over a fixed style vocabulary
#[derive(Debug, Clone, Copy)]
pub struct StoryClassifier<'v> {
    vocabulary: &'v StyleVocabulary,
}

impl<'v> StoryClassifier<'v> {
    /// Create a classifier for the given vocabulary
    #[must_use]
    pub const fn new(vocabulary: &'v StyleVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Classify every valid story; unmatched stories are ignored
    #[must_use]
    pub fn classify(&self, stories: &[ParsedStory]) -> Classification {
        let v = self.vocabulary;
        let mut found = Classification::default();
        let mut claimed: HashSet<&str> = HashSet::new();

        for story in stories.iter().filter(|s| s.is_valid()) {
            if let Some(rule) = RULES.iter().find(|rule| (rule.applies)(v, story, &found)) {
                log::debug!("Story {} classified by rule '{}'", story.id, rule.name);
                (rule.extract)(v, story, &mut found);
                claimed.insert(story.id.as_str());
            }
        }

        for fallback in FALLBACK_RULES {
            if !(fallback.needed)(&found) {
                continue;
            }

            let mut best: Option<(&ParsedStory, String)> = None;
            for story in stories.iter().filter(|s| s.is_valid()) {
                if claimed.contains(story.id.as_str()) || !(fallback.candidate)(v, story) {
                    continue;
                }
                let text = role_text(story);
                if text.is_empty() {
                    continue;
                }
                let shorter = best
                    .as_ref()
                    .map_or(true, |(_, current)| text.chars().count() < current.chars().count());
                if shorter {
                    best = Some((story, text));
                }
            }

            if let Some((story, text)) = best {
                log::debug!("Story {} classified by fallback '{}'", story.id, fallback.name);
                (fallback.assign)(&mut found, story, text);
                claimed.insert(story.id.as_str());
            }
        }

        found
    }
}

/// Whether the story carries info-page markers and is reserved for info roles
fn is_info_like(v: &StyleVocabulary, story: &ParsedStory) -> bool {
    has_style(story, &v.info_body)
        && (has_style(story, &v.info_location) || has_style(story, &v.info_head))
}

fn has_style(story: &ParsedStory, prefixes: &[String]) -> bool {
    story
        .paragraph_styles
        .iter()
        .any(|style| StyleVocabulary::matches(style, prefixes))
}

fn paragraphs_with<'s>(story: &'s ParsedStory, prefixes: &'s [String]) -> impl Iterator<Item = &'s Paragraph> {
    story
        .paragraphs
        .iter()
        .filter(move |p| StyleVocabulary::matches(&p.style, prefixes))
}

fn first_text(story: &ParsedStory, prefixes: &[String]) -> String {
    paragraphs_with(story, prefixes)
        .map(|p| normalize(&p.text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Normalized story text with any trailing URL removed
fn role_text(story: &ParsedStory) -> String {
    let (text, _) = extract_trailing_url(&story.text_all);
    normalize(&text)
}

/// First URL-styled run of the story, normalized
fn first_story_url(story: &ParsedStory) -> String {
    story
        .paragraphs
        .iter()
        .map(|p| normalize_url(&p.url))
        .find(|url| !url.is_empty())
        .unwrap_or_default()
}

fn extract_teaser(v: &StyleVocabulary, story: &ParsedStory) -> Teaser {
    let location_lines = paragraphs_with(story, &v.location)
        .next()
        .map(|p| normalized_lines(&p.text))
        .unwrap_or_default();
    let location = location_lines.first().cloned().unwrap_or_default();

    let mut headline = first_text(story, &v.teaser_headline);
    if headline.is_empty() {
        headline = location_lines.get(1).cloned().unwrap_or_default();
    }

    let link = paragraphs_with(story, &v.teaser_link).next();
    let (intro, embedded_url) = link.map_or_else(Default::default, |p| {
        let (text, url) = extract_trailing_url(&p.text);
        (normalize(&text), url)
    });

    let mut url = link.map(|p| normalize_url(&p.url)).unwrap_or_default();
    if url.is_empty() {
        url = embedded_url;
    }
    if url.is_empty() {
        url = first_story_url(story);
    }

    Teaser {
        story_id: story.id.clone(),
        location,
        headline,
        intro,
        url,
        ..Teaser::default()
    }
}

fn info_body_paragraphs(v: &StyleVocabulary, story: &ParsedStory) -> Vec<String> {
    paragraphs_with(story, &v.info_body)
        .map(|p| normalize(&p.text))
        .filter(|text| !text.is_empty())
        .collect()
}

fn extract_info_teaser(v: &StyleVocabulary, story: &ParsedStory) -> InfoTeaser {
    let mut intro = info_body_paragraphs(v, story).join(" ");
    let mut url = first_story_url(story);
    if url.is_empty() {
        let (text, embedded) = extract_trailing_url(&intro);
        if !embedded.is_empty() {
            intro = text;
            url = embedded;
        }
    }

    InfoTeaser {
        story_id: story.id.clone(),
        location: first_text(story, &v.info_location),
        headline: first_text(story, &v.info_head),
        intro,
        url,
        ..InfoTeaser::default()
    }
}

fn extract_parallax_item(v: &StyleVocabulary, story: &ParsedStory) -> ParallaxItem {
    ParallaxItem {
        story_id: story.id.clone(),
        location: first_text(story, &v.info_location),
        title: first_text(story, &v.info_head),
        body: info_body_paragraphs(v, story).join("\n\n"),
        ..ParallaxItem::default()
    }
}

/// Snapshot of what the document contained, for unrecognized variants
#[must_use]
pub fn diagnostic_snapshot(spread_files: usize, story_files: usize, stories: &[ParsedStory]) -> String {
    let styles: BTreeSet<&str> = stories
        .iter()
        .flat_map(|s| s.paragraph_styles.iter().map(String::as_str))
        .collect();
    let sample: Vec<&str> = styles.iter().copied().take(DIAGNOSTIC_STYLE_SAMPLE).collect();

    format!(
        "diagnostics: {spread_files} spread file(s), {story_files} story file(s), {} distinct paragraph style(s); sample: [{}]",
        styles.len(),
        sample.join(", ")
    )
}
