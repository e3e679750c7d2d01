use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{outline, Block, ExportError};
use crate::models::itinerary::Itinerary;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr></w:style>
</w:styles>"#;

/// Run formatting; `size` is in half-points.
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    size: u32,
    bold: bool,
    italic: bool,
}

fn paragraph(out: &mut String, text: &str, style: Option<&str>, centered: bool, run: RunStyle) {
    out.push_str("<w:p>");
    if style.is_some() || centered {
        out.push_str("<w:pPr>");
        if let Some(style) = style {
            out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style));
        }
        if centered {
            out.push_str(r#"<w:jc w:val="center"/>"#);
        }
        out.push_str("</w:pPr>");
    }

    out.push_str("<w:r><w:rPr>");
    if run.bold {
        out.push_str("<w:b/>");
    }
    if run.italic {
        out.push_str("<w:i/>");
    }
    out.push_str(&format!(r#"<w:sz w:val="{}"/>"#, run.size));
    out.push_str("</w:rPr>");
    out.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t>"#,
        escape(&xml_text(text))
    ));
    out.push_str("</w:r></w:p>");
}

/// Drops characters XML 1.0 does not allow in documents.
fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|c| match *c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= '\u{20}',
        })
        .collect()
}

fn empty_paragraph(out: &mut String) {
    out.push_str("<w:p/>");
}

fn document_xml(itinerary: &Itinerary) -> String {
    let mut body = String::new();
    let mut details = Vec::new();

    let bold = |size| RunStyle {
        size,
        bold: true,
        italic: false,
    };
    let plain = |size| RunStyle {
        size,
        ..RunStyle::default()
    };
    let italic = |size| RunStyle {
        size,
        italic: true,
        ..RunStyle::default()
    };

    let blocks = outline(itinerary);
    let mut index = 0;
    while index < blocks.len() {
        match &blocks[index] {
            Block::Title(text) => paragraph(&mut body, text, Some("Title"), true, bold(32)),
            Block::Detail(text) => {
                details.push(text.as_str());
                let next_is_detail = matches!(blocks.get(index + 1), Some(Block::Detail(_)));
                if !next_is_detail {
                    paragraph(&mut body, &details.join(" | "), None, true, plain(24));
                    details.clear();
                }
            }
            Block::Heading(text) => paragraph(&mut body, text, Some("Heading1"), false, bold(28)),
            Block::DayHeading(text) => {
                paragraph(&mut body, text, Some("Heading2"), false, bold(26))
            }
            Block::Meta(_) => {
                // Consecutive meta lines share one italic paragraph.
                let mut meta = Vec::new();
                while let Some(Block::Meta(text)) = blocks.get(index) {
                    meta.push(text.as_str());
                    index += 1;
                }
                paragraph(&mut body, &meta.join(" | "), None, false, italic(20));
                continue;
            }
            Block::ActivityTitle(text) => paragraph(&mut body, text, None, false, bold(22)),
            Block::Body(text) => paragraph(&mut body, text, None, false, plain(22)),
            Block::ActivityMeta(text) => {
                paragraph(&mut body, text, None, false, italic(18));
                empty_paragraph(&mut body);
            }
            Block::Bullet(text) => {
                paragraph(&mut body, &format!("• {}", text), None, false, plain(22))
            }
            Block::Spacer => empty_paragraph(&mut body),
        }
        index += 1;
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}",
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
            "</w:body></w:document>"
        ),
        body
    )
}

pub fn render(itinerary: &Itinerary) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &str); 4] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(itinerary).as_bytes())?;

    Ok(zip.finish()?.into_inner())
}
