use std::fmt::Write as _;

use super::{outline, Block};
use crate::models::itinerary::Itinerary;

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
// 20 mm.
const MARGIN: f32 = 56.7;
const LINE_SPACING: f32 = 1.25;
const BLOCK_GAP: f32 = 4.0;
const SPACER: f32 = 14.0;

// Helvetica advance widths (1/1000 em) for ' '..='~'.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const DEFAULT_WIDTH: u16 = 556;
// Bold glyphs run wider; overestimating only wraps a little earlier.
const BOLD_FACTOR: f32 = 1.1;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    let width = units as f32 * size / 1000.0;
    match font {
        Font::Regular => width,
        Font::Bold => width * BOLD_FACTOR,
    }
}

/// Greedy word wrap. Words wider than a line are split by character.
fn wrap(text: &str, size: f32, font: Font, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(&candidate, size, font) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            for c in word.chars() {
                line.push(c);
                if text_width(&line, size, font) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::replace(&mut line, c.to_string()));
                }
            }
        }
        lines.push(line);
    }

    lines
}

/// Maps a char to its WinAnsiEncoding byte, `?` when it has none.
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => b'?',
    }
}

/// Encodes text as the body of a PDF literal string.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.chars().map(win_ansi) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

struct Layout {
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn text(&mut self, text: &str, size: f32, font: Font) {
        let lines = wrap(text, size, font, PAGE_WIDTH - 2.0 * MARGIN);
        let leading = size * LINE_SPACING;
        let height = lines.len() as f32 * leading;

        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.new_page();
        }

        for line in lines {
            if self.y - leading < MARGIN {
                self.new_page();
            }
            self.y -= leading;
            if !line.is_empty() {
                let _ = writeln!(
                    self.current,
                    "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET",
                    font.resource(),
                    size,
                    MARGIN,
                    self.y,
                    pdf_string(&line)
                );
            }
        }
        self.y -= BLOCK_GAP;
    }

    fn space(&mut self, points: f32) {
        self.y = (self.y - points).max(MARGIN);
    }

    fn finish(mut self) -> Vec<String> {
        self.pages.push(self.current);
        self.pages
    }
}

fn layout(itinerary: &Itinerary) -> Vec<String> {
    let mut layout = Layout::new();

    for block in outline(itinerary) {
        match block {
            Block::Title(text) => {
                layout.text(&text, 20.0, Font::Bold);
                layout.space(SPACER / 2.0);
            }
            Block::Detail(text) => layout.text(&text, 12.0, Font::Bold),
            Block::Heading(text) => layout.text(text, 16.0, Font::Bold),
            Block::DayHeading(text) => layout.text(&text, 14.0, Font::Bold),
            Block::Meta(text) => layout.text(&text, 11.0, Font::Regular),
            Block::ActivityTitle(text) => {
                layout.space(BLOCK_GAP);
                layout.text(&text, 12.0, Font::Bold);
            }
            Block::Body(text) => layout.text(&text, 11.0, Font::Regular),
            Block::ActivityMeta(text) => layout.text(&text, 10.0, Font::Regular),
            Block::Bullet(text) => layout.text(&format!("• {}", text), 11.0, Font::Regular),
            Block::Spacer => layout.space(SPACER),
        }
    }

    layout.finish()
}

/// Assembles the object graph: catalog, page tree, two base fonts, then a
/// page and content stream per page, followed by the xref table.
fn assemble(pages: &[String]) -> Vec<u8> {
    let first_page_obj = 5;
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| first_page_obj + i * 2).collect();

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_ids
                .iter()
                .map(|id| format!("{} 0 R", id))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (content, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", index + 1, body);
    }

    let xref = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    );

    out.into_bytes()
}

pub fn render(itinerary: &Itinerary) -> Vec<u8> {
    assemble(&layout(itinerary))
}
