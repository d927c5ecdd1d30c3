//! DOM-based parser for well-formed IDML documents

use roxmltree::{Document, Node, ParsingOptions};

use super::style::{is_url_character_style, link_basename, paragraph_style_name};
use super::types::{ImageCandidate, ParsedStory, SpreadLayout};
use super::{DocumentParser, ParagraphBuilder, GRAPHIC_ELEMENTS};
use crate::error::{ImportError, Result};
use crate::geometry::parse_transform;

/// Parser that requires well-formed XML and walks the element tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StrictParser;

impl StrictParser {
    fn parse_document(xml: &str) -> Result<Document<'_>> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Document::parse_with_options(xml, options)
            .map_err(|e| ImportError::Parse(format!("XML parse error: {e}")))
    }

    /// The `Link` resource of a placed graphic, if it has one
    fn link_uri<'a>(graphic: &Node<'a, '_>) -> Option<&'a str> {
        graphic
            .descendants()
            .find(|n| is_element(n, "Link"))
            .and_then(|link| link.attribute("LinkResourceURI"))
    }

    /// Whether a text node sits inside a URL-styled run of `range`
    fn in_url_run(node: &Node, range: &Node) -> bool {
        node.ancestors()
            .take_while(|ancestor| ancestor != range)
            .find(|ancestor| is_element(ancestor, "CharacterStyleRange"))
            .and_then(|run| run.attribute("AppliedCharacterStyle"))
            .is_some_and(is_url_character_style)
    }

    /// Nearest enclosing paragraph range of a node
    ///
    /// Table cells nest ranges inside ranges; content belongs to the
    /// innermost one only.
    fn owning_range<'a, 'i>(node: &Node<'a, 'i>) -> Option<Node<'a, 'i>> {
        node.ancestors()
            .skip(1)
            .find(|ancestor| is_element(ancestor, "ParagraphStyleRange"))
    }

    fn content_text(content: &Node) -> String {
        content
            .children()
            .filter(Node::is_text)
            .filter_map(|child| child.text())
            .collect()
    }
}

#[inline]
fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

impl DocumentParser for StrictParser {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn parse_spread(&self, xml: &str) -> Result<SpreadLayout> {
        let doc = Self::parse_document(xml)?;
        let mut layout = SpreadLayout::default();

        for node in doc.descendants().filter(Node::is_element) {
            let name = node.tag_name().name();
            if name == "TextFrame" {
                if let Some(story_id) = node.attribute("ParentStory") {
                    let position = parse_transform(node.attribute("ItemTransform").unwrap_or_default());
                    layout.add_text_frame(story_id, position);
                }
            } else if GRAPHIC_ELEMENTS.contains(&name) {
                let Some(uri) = Self::link_uri(&node) else {
                    continue;
                };
                let basename = link_basename(uri);
                if basename.is_empty() {
                    continue;
                }
                let position = parse_transform(node.attribute("ItemTransform").unwrap_or_default());
                layout.images.push(ImageCandidate::new(position, basename));
            }
        }

        Ok(layout)
    }

    fn parse_story(&self, xml: &str) -> Result<ParsedStory> {
        let doc = Self::parse_document(xml)?;

        let story_node = doc
            .descendants()
            .find(|n| is_element(n, "Story") && n.attribute("Self").is_some())
            .ok_or_else(|| ImportError::Parse("no Story element with a Self id".to_string()))?;
        let mut story = ParsedStory::new(story_node.attribute("Self").unwrap_or_default());

        for range in story_node
            .descendants()
            .filter(|n| is_element(n, "ParagraphStyleRange"))
        {
            let style = paragraph_style_name(range.attribute("AppliedParagraphStyle").unwrap_or_default());
            let mut builder = ParagraphBuilder::new(style);

            let own_nodes = range
                .descendants()
                .filter(|n| n.is_element() && Self::owning_range(n).as_ref() == Some(&range));
            for node in own_nodes {
                match node.tag_name().name() {
                    "Content" => {
                        builder.push_text(Self::in_url_run(&node, &range), &Self::content_text(&node));
                    }
                    "Br" => builder.push_break(Self::in_url_run(&node, &range)),
                    _ => {}
                }
            }

            story.add_paragraph(builder.finish());
        }

        Ok(story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    const SPREAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<idPkg:Spread xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="16.0">
  <Spread Self="ud6">
    <TextFrame Self="u10a" ParentStory="u1f0" ItemTransform="1 0 0 1 -250 -380" />
    <TextFrame Self="u10b" ParentStory="u1f0" ItemTransform="1 0 0 1 250 380" />
    <TextFrame Self="u10c" ParentStory="u2a1" ItemTransform="1 0 0 1 12.5 100" />
    <Rectangle Self="u11" ItemTransform="1 0 0 1 0 0">
      <Image Self="u12" ItemTransform="1 0 0 1 -240 -150">
        <Link Self="u13" LinkResourceURI="file:///Volumes/Job/Links/Br%C3%BCcke.psd" />
      </Image>
    </Rectangle>
    <Rectangle Self="u14">
      <EPS Self="u15" ItemTransform="0.5 0 0 0.5 40 60">
        <Link Self="u16" LinkResourceURI="file:///Volumes/Job/Links/logo.eps" />
      </EPS>
    </Rectangle>
    <Rectangle Self="u17">
      <Image Self="u18" ItemTransform="1 0 0 1 1 1" />
    </Rectangle>
  </Spread>
</idPkg:Spread>"#;

    const STORY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<idPkg:Story xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="16.0">
  <Story Self="u2a1" AppliedTOCStyle="n">
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Location">
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/$ID/[No character style]">
        <Content>Berlin</Content>
        <Br />
        <Content>New Bridge Opens</Content>
      </CharacterStyleRange>
    </ParagraphStyleRange>
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Teaser-Link">
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/$ID/[No character style]">
        <Content>Read more </Content>
      </CharacterStyleRange>
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/URL">
        <Content>example.com/<?ACE 7?>bridge</Content>
      </CharacterStyleRange>
    </ParagraphStyleRange>
    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/Empty">
      <CharacterStyleRange AppliedCharacterStyle="CharacterStyle/$ID/[No character style]" />
    </ParagraphStyleRange>
  </Story>
</idPkg:Story>"#;

    #[test]
    fn test_spread_text_frames() {
        let layout = StrictParser.parse_spread(SPREAD).unwrap();
        assert_eq!(layout.text_frames.len(), 2);
        assert_eq!(layout.text_frames["u1f0"], Position::new(-250.0, -380.0));
        assert_eq!(layout.text_frames["u2a1"], Position::new(12.5, 100.0));
    }

    #[test]
    fn test_spread_graphics() {
        let layout = StrictParser.parse_spread(SPREAD).unwrap();
        assert_eq!(layout.images.len(), 2, "graphic without link is skipped");
        assert_eq!(layout.images[0].basename, "Brücke.psd");
        assert_eq!(layout.images[0].position, Position::new(-240.0, -150.0));
        assert_eq!(layout.images[1].basename, "logo.eps");
    }

    #[test]
    fn test_empty_spread_is_valid() {
        let layout = StrictParser.parse_spread(r#"<Spread Self="u1"/>"#).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_story_paragraphs() {
        let story = StrictParser.parse_story(STORY).unwrap();
        assert_eq!(story.id, "u2a1");
        assert_eq!(story.paragraphs.len(), 2);
        assert_eq!(story.paragraphs[0].style, "Location");
        assert_eq!(story.paragraphs[0].text, "Berlin\nNew Bridge Opens");
        assert_eq!(story.paragraphs[1].text, "Read more");
        assert_eq!(story.paragraphs[1].url, "example.com/bridge");
        assert!(story.has_url_style);
        assert!(!story.paragraph_styles.contains("Empty"));
    }

    #[test]
    fn test_story_without_self_fails() {
        let result = StrictParser.parse_story("<Story><ParagraphStyleRange/></Story>");
        assert!(result.is_err());
    }
}
