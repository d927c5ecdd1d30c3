//! Pattern-based recovery parser for IDML documents that are not well-formed

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::style::{is_url_character_style, link_basename, paragraph_style_name};
use super::types::{ImageCandidate, ParsedStory, SpreadLayout};
use super::{DocumentParser, ParagraphBuilder};
use crate::error::{ImportError, Result};
use crate::geometry::parse_transform;

// =============================================================================
// Pre-compiled patterns
// =============================================================================

static RE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
});
static RE_TEXT_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<TextFrame\b([^>]*)>").expect("valid text frame regex"));
static RE_GRAPHIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(Image|EPS|PDF)\b([^>]*)>").expect("valid graphic regex"));
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Link\b([^>]*)>").expect("valid link regex"));
static RE_STORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Story\b([^>]*)>").expect("valid story regex"));
// Groups: 1 range attributes (opening tag), none for a closing tag
static RE_PARAGRAPH_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ParagraphStyleRange\b([^>]*)>|</ParagraphStyleRange\s*>")
        .expect("valid paragraph boundary regex")
});
static RE_CELL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Cell\b[^>]*[^/]>|<Cell>").expect("valid cell open regex"));
static RE_CELL_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</Cell\s*>").expect("valid cell close regex"));
// Groups: 1 run attributes, 2 run end, 3 content text, 4 break
static RE_RUN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<CharacterStyleRange\b([^>]*)>|(</CharacterStyleRange\s*>)|<Content\s*/>|<Content\b[^>]*>(.*?)</Content\s*>|(<Br\b[^>]*>)",
    )
    .expect("valid run token regex")
});
static RE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid markup regex"));

/// A paragraph range that is still open during the story scan
struct OpenRange {
    /// Index into the paragraph list, which is in opening order
    paragraph: usize,
    /// Offset just past the opening tag
    start: usize,
    in_url_run: bool,
}

/// Parser that recovers spread and story primitives without a DOM
///
/// Attribute order, unbound namespace prefixes, unclosed elements and stray
/// markup are all tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TolerantParser;

impl TolerantParser {
    /// Collect `name="value"` pairs of a start tag, entities unescaped
    fn attributes(tag_body: &str) -> HashMap<&str, String> {
        RE_ATTRIBUTE
            .captures_iter(tag_body)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str();
                let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
                Some((name, unescape(value).into_owned()))
            })
            .collect()
    }

    /// Text between the end of a start tag and its closing tag
    ///
    /// Without a closing tag the body ends at `limit`, the next element of
    /// the same family.
    fn element_body<'a>(xml: &'a str, start: usize, limit: usize, tag: &str) -> &'a str {
        let closing = format!("</{tag}");
        let rest = &xml[start..limit];
        rest.find(&closing).map_or(rest, |end| &rest[..end])
    }

    /// Feed the run tokens of `fragment` into one paragraph
    fn scan_runs(fragment: &str, builder: &mut ParagraphBuilder, in_url_run: &mut bool) {
        for token in RE_RUN_TOKEN.captures_iter(fragment) {
            if let Some(run) = token.get(1) {
                let run_attrs = run.as_str();
                if !run_attrs.trim_end().ends_with('/') {
                    *in_url_run = Self::attributes(run_attrs)
                        .get("AppliedCharacterStyle")
                        .is_some_and(|name| is_url_character_style(name));
                }
            } else if token.get(2).is_some() {
                *in_url_run = false;
            } else if let Some(content) = token.get(3) {
                let text = RE_MARKUP.replace_all(content.as_str(), "");
                builder.push_text(*in_url_run, &unescape(&text));
            } else if token.get(4).is_some() {
                builder.push_break(*in_url_run);
            }
        }
    }

    /// Whether `text` leaves a table cell open
    fn inside_cell(text: &str) -> bool {
        RE_CELL_OPEN.find_iter(text).count() > RE_CELL_CLOSE.find_iter(text).count()
    }
}

/// Best-effort entity unescaping; malformed entities keep the raw text
fn unescape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

impl DocumentParser for TolerantParser {
    fn name(&self) -> &'static str {
        "tolerant"
    }

    fn parse_spread(&self, xml: &str) -> Result<SpreadLayout> {
        let mut layout = SpreadLayout::default();

        for caps in RE_TEXT_FRAME.captures_iter(xml) {
            let attrs = Self::attributes(&caps[1]);
            if let Some(story_id) = attrs.get("ParentStory") {
                let position = parse_transform(attrs.get("ItemTransform").map_or("", String::as_str));
                layout.add_text_frame(story_id, position);
            }
        }

        let graphics: Vec<_> = RE_GRAPHIC.captures_iter(xml).collect();
        for (index, caps) in graphics.iter().enumerate() {
            let tag_body = &caps[2];
            if tag_body.trim_end().ends_with('/') {
                continue;
            }
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let limit = graphics
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(xml.len(), |m| m.start());

            let body = Self::element_body(xml, whole.end(), limit, &caps[1]);
            let Some(link) = RE_LINK.captures(body) else {
                continue;
            };
            let link_attrs = Self::attributes(&link[1]);
            let Some(uri) = link_attrs.get("LinkResourceURI") else {
                continue;
            };
            let basename = link_basename(uri);
            if basename.is_empty() {
                continue;
            }

            let attrs = Self::attributes(tag_body);
            let position = parse_transform(attrs.get("ItemTransform").map_or("", String::as_str));
            layout.images.push(ImageCandidate::new(position, basename));
        }

        Ok(layout)
    }

    fn parse_story(&self, xml: &str) -> Result<ParsedStory> {
        let (story_id, story_start) = RE_STORY
            .captures_iter(xml)
            .find_map(|caps| {
                let id = Self::attributes(&caps[1]).remove("Self")?;
                Some((id, caps.get(0)?.end()))
            })
            .ok_or_else(|| ImportError::Parse("no Story element with a Self id".to_string()))?;

        let body = &xml[story_start..];
        let mut story = ParsedStory::new(story_id);
        let mut paragraphs: Vec<ParagraphBuilder> = Vec::new();
        let mut open: Vec<OpenRange> = Vec::new();
        let mut cursor = 0;

        for boundary in RE_PARAGRAPH_BOUNDARY.captures_iter(body) {
            let Some(whole) = boundary.get(0) else {
                continue;
            };
            if let Some(current) = open.last_mut() {
                let fragment = &body[cursor..whole.start()];
                Self::scan_runs(fragment, &mut paragraphs[current.paragraph], &mut current.in_url_run);
            }
            cursor = whole.end();

            let Some(attrs) = boundary.get(1) else {
                open.pop();
                continue;
            };
            if attrs.as_str().trim_end().ends_with('/') {
                continue;
            }

            // A range opened inside a table cell nests; any other opening
            // ends a range whose closing tag is missing
            let nested = open
                .last()
                .is_some_and(|current| Self::inside_cell(&body[current.start..whole.start()]));
            if !nested {
                open.pop();
            }

            let style = paragraph_style_name(
                Self::attributes(attrs.as_str())
                    .get("AppliedParagraphStyle")
                    .map_or("", String::as_str),
            );
            open.push(OpenRange {
                paragraph: paragraphs.len(),
                start: whole.end(),
                in_url_run: false,
            });
            paragraphs.push(ParagraphBuilder::new(style));
        }

        if let Some(current) = open.last_mut() {
            Self::scan_runs(&body[cursor..], &mut paragraphs[current.paragraph], &mut current.in_url_run);
        }

        for builder in paragraphs {
            story.add_paragraph(builder.finish());
        }

        Ok(story)
    }
}
