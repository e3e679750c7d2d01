pub mod docx;
pub mod pdf;

use std::fmt;

use serde::Deserialize;

use crate::models::itinerary::Itinerary;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Archive(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "Failed to write document: {}", err),
            ExportError::Archive(msg) => write!(f, "Failed to build document package: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::Archive(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: ExportFormat,
}

/// A rendered itinerary ready to be sent as a download.
#[derive(Debug)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `<destination>-itinerary.<ext>`, with path separators and control
/// characters replaced.
pub fn file_name(destination: &str, format: ExportFormat) -> String {
    let destination: String = destination
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}-itinerary.{}", destination, format.extension())
}

pub fn render(itinerary: &Itinerary, format: ExportFormat) -> Result<ExportedDocument, ExportError> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::render(itinerary),
        ExportFormat::Docx => docx::render(itinerary)?,
    };
    log::debug!(
        "Exported itinerary for {} as {} ({} bytes)",
        itinerary.destination,
        format.extension(),
        bytes.len()
    );

    Ok(ExportedDocument {
        file_name: file_name(&itinerary.destination, format),
        content_type: format.content_type(),
        bytes,
    })
}

/// One line of a rendered document, shared by both output formats.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Block {
    Title(String),
    Detail(String),
    Heading(&'static str),
    DayHeading(String),
    Meta(String),
    ActivityTitle(String),
    Body(String),
    ActivityMeta(String),
    Bullet(String),
    Spacer,
}

/// Flattens an itinerary into the section order both documents use.
pub(crate) fn outline(itinerary: &Itinerary) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(format!("{} Travel Itinerary", itinerary.destination)),
        Block::Detail(format!("Duration: {}", itinerary.duration)),
        Block::Detail(format!("Travelers: {}", itinerary.travelers)),
        Block::Detail(format!("Budget: {}", itinerary.total_budget)),
        Block::Spacer,
        Block::Heading("OVERVIEW"),
        Block::Body(itinerary.overview.clone()),
        Block::Spacer,
        Block::Heading("TRIP HIGHLIGHTS"),
    ];
    blocks.extend(
        itinerary
            .highlights
            .iter()
            .map(|highlight| Block::Bullet(highlight.clone())),
    );
    blocks.push(Block::Spacer);

    blocks.push(Block::Heading("DAILY ITINERARY"));
    for day in &itinerary.days {
        blocks.push(Block::DayHeading(format!("Day {}: {}", day.day, day.title)));
        blocks.push(Block::Meta(format!("Date: {}", day.date)));
        blocks.push(Block::Meta(format!("Estimated Cost: {}", day.estimated_cost)));
        blocks.push(Block::Meta(format!("Transportation: {}", day.transportation)));
        for activity in &day.activities {
            blocks.push(Block::ActivityTitle(format!(
                "{} - {}",
                activity.time, activity.title
            )));
            blocks.push(Block::Body(activity.description.clone()));
            blocks.push(Block::ActivityMeta(format!(
                "Location: {} | Duration: {} | Cost: {}",
                activity.location, activity.duration, activity.cost
            )));
        }
        blocks.push(Block::Spacer);
    }

    blocks.push(Block::Heading("TRAVEL TIPS"));
    blocks.extend(itinerary.tips.iter().map(|tip| Block::Bullet(tip.clone())));
    blocks
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::itinerary::{Activity, Day};

    pub(crate) fn sample_itinerary() -> Itinerary {
        Itinerary {
            destination: "Lisbon".to_string(),
            duration: "2 days".to_string(),
            total_budget: "$1000-3000".to_string(),
            travelers: "2 People".to_string(),
            overview: "Hills, trams & tiles.".to_string(),
            highlights: vec!["Alfama".to_string(), "Belém".to_string()],
            days: vec![Day {
                day: 1,
                date: "2025-06-01".to_string(),
                title: "Old town".to_string(),
                activities: vec![Activity {
                    time: "09:00".to_string(),
                    title: "Tram 28".to_string(),
                    description: "Ride the <classic> yellow tram.".to_string(),
                    location: "Martim Moniz".to_string(),
                    duration: "1 hour".to_string(),
                    cost: "$3".to_string(),
                    rating: None,
                    category: "sightseeing".to_string(),
                }],
                estimated_cost: "$80".to_string(),
                transportation: "Tram".to_string(),
            }],
            tips: vec!["Wear comfy shoes".to_string()],
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Paris", ExportFormat::Pdf), "Paris-itinerary.pdf");
        assert_eq!(
            file_name(" New York ", ExportFormat::Docx),
            "New York-itinerary.docx"
        );
        assert_eq!(
            file_name("a/b\"c\n", ExportFormat::Pdf),
            "a_b_c-itinerary.pdf"
        );
    }

    #[test]
    fn test_outline_section_order() {
        let blocks = outline(&sample_itinerary());
        let headings: Vec<&str> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(text) => Some(*text),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            ["OVERVIEW", "TRIP HIGHLIGHTS", "DAILY ITINERARY", "TRAVEL TIPS"]
        );
        assert_eq!(blocks[0], Block::Title("Lisbon Travel Itinerary".to_string()));
        assert!(blocks.contains(&Block::DayHeading("Day 1: Old town".to_string())));
        assert!(blocks.contains(&Block::ActivityMeta(
            "Location: Martim Moniz | Duration: 1 hour | Cost: $3".to_string()
        )));
    }

    #[test]
    fn test_render_sets_download_metadata() {
        let document = render(&sample_itinerary(), ExportFormat::Docx).unwrap();
        assert_eq!(document.file_name, "Lisbon-itinerary.docx");
        assert_eq!(document.content_type, ExportFormat::Docx.content_type());
        assert!(!document.bytes.is_empty());
    }
}
