//! Builders for synthetic IDML packages used by the integration tests

#![allow(dead_code)]

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Character style applied to plain runs
pub const PLAIN: &str = "CharacterStyle/$ID/[No character style]";
/// Character style applied to link runs
pub const URL: &str = "CharacterStyle/URL";

/// One paragraph style range: style name and its character runs
pub struct Para<'a> {
    pub style: &'a str,
    pub runs: Vec<(&'a str, &'a str)>,
}

/// Paragraph with a single plain run; `\n` becomes `<Br/>`
pub fn plain<'a>(style: &'a str, text: &'a str) -> Para<'a> {
    Para {
        style,
        runs: vec![(PLAIN, text)],
    }
}

/// Paragraph with a plain run followed by a URL-styled run
pub fn linked<'a>(style: &'a str, text: &'a str, url: &'a str) -> Para<'a> {
    Para {
        style,
        runs: vec![(PLAIN, text), (URL, url)],
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Story document in the packaging namespace
pub fn story_xml(id: &str, paragraphs: &[Para]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<idPkg:Story xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="16.0">
"#,
    );
    let _ = writeln!(xml, r#"  <Story Self="{id}" AppliedTOCStyle="n">"#);
    for paragraph in paragraphs {
        let style = paragraph.style.replace(':', "%3a");
        let _ = writeln!(
            xml,
            r#"    <ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/{style}">"#
        );
        for (char_style, text) in &paragraph.runs {
            let _ = writeln!(xml, r#"      <CharacterStyleRange AppliedCharacterStyle="{char_style}">"#);
            let lines: Vec<String> = text
                .split('\n')
                .map(|line| format!("<Content>{}</Content>", escape(line)))
                .collect();
            let _ = writeln!(xml, "        {}", lines.join("<Br/>"));
            xml.push_str("      </CharacterStyleRange>\n");
        }
        xml.push_str("    </ParagraphStyleRange>\n");
    }
    xml.push_str("  </Story>\n</idPkg:Story>\n");
    xml
}

/// Spread document with text frames `(story, x, y)` and images `(file, x, y)`
pub fn spread_xml(frames: &[(&str, f64, f64)], images: &[(&str, f64, f64)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<idPkg:Spread xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="16.0">
  <Spread Self="ud1">
"#,
    );
    for (index, (story, x, y)) in frames.iter().enumerate() {
        let _ = writeln!(
            xml,
            r#"    <TextFrame Self="tf{index}" ParentStory="{story}" ItemTransform="1 0 0 1 {x} {y}" />"#
        );
    }
    for (index, (file, x, y)) in images.iter().enumerate() {
        let uri = file.replace(' ', "%20");
        let _ = write!(
            xml,
            r#"    <Rectangle Self="r{index}" ItemTransform="1 0 0 1 0 0">
      <Image Self="im{index}" ItemTransform="1 0 0 1 {x} {y}">
        <Link Self="ln{index}" LinkResourceURI="file:///Volumes/Job/Links/{uri}" />
      </Image>
    </Rectangle>
"#
        );
    }
    xml.push_str("  </Spread>\n</idPkg:Spread>\n");
    xml
}

/// Zip the given entries into an IDML package
pub fn build_package(entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("mimetype", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(b"application/vnd.adobe.indesign-idml-package")
        .unwrap();
    for (name, contents) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
