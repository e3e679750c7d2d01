use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::db::store::ItineraryStore;
use crate::models::itinerary::{ComfortLevel, Day, Itinerary, NewItinerary};
use crate::models::trip::TripRequest;
use crate::services::gemini::{strip_code_fences, GenerationError, TextGenerator};

const DEFAULT_HIGHLIGHTS: [&str; 5] = [
    "Explore the most iconic landmarks of {destination}",
    "Experience authentic local cuisine and cultural traditions",
    "Discover hidden gems off the beaten path",
    "Perfect balance of adventure and relaxation",
    "Expert local recommendations for unique experiences",
];

const DEFAULT_TIPS: [&str; 5] = [
    "Book accommodations in advance for better rates",
    "Learn basic local phrases to enhance your experience",
    "Pack comfortable walking shoes for city exploration",
    "Keep digital copies of important documents",
    "Try local street food for authentic flavors",
];

const RESPONSE_SCHEMA: &str = r#"{
  "overview": "Brief description of the trip",
  "highlights": ["highlight 1", "highlight 2", "highlight 3", "highlight 4", "highlight 5"],
  "days": [
    {
      "day": 1,
      "date": "formatted date",
      "title": "Day title",
      "activities": [
        {
          "time": "9:00 AM",
          "title": "Activity name",
          "description": "Activity description",
          "location": "Location name",
          "duration": "2 hours",
          "cost": "$20-30",
          "rating": 4.5,
          "category": "Culture & History"
        }
      ],
      "estimatedCost": "$150-200",
      "transportation": "Walking/Metro"
    }
  ],
  "tips": ["tip 1", "tip 2", "tip 3", "tip 4", "tip 5"]
}"#;

pub fn default_highlights(destination: &str) -> Vec<String> {
    DEFAULT_HIGHLIGHTS
        .iter()
        .map(|highlight| highlight.replace("{destination}", destination))
        .collect()
}

pub fn default_tips() -> Vec<String> {
    DEFAULT_TIPS.iter().map(|tip| tip.to_string()).collect()
}

pub fn default_overview(destination: &str) -> String {
    format!(
        "Discover the magic of {} with this carefully curated adventure.",
        destination
    )
}

pub fn build_prompt(trip: &TripRequest) -> String {
    let interests = if trip.interests().is_empty() {
        "General sightseeing".to_string()
    } else {
        trip.interests().join(", ")
    };

    format!(
        "Create a detailed travel itinerary for {} from {} to {} for {} with a {} budget.\n\n\
         Interests: {}\n\n\
         Please provide a comprehensive travel plan in JSON format with the following structure:\n{}",
        trip.destination(),
        trip.start_date().format("%Y-%m-%d"),
        trip.end_date().format("%Y-%m-%d"),
        trip.travelers().label(),
        trip.budget().as_str(),
        interests,
        RESPONSE_SCHEMA
    )
}

/// Reads an optional field; null or a value of the wrong shape counts as
/// absent.
fn field<T: DeserializeOwned>(object: &serde_json::Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring malformed `{}` in AI response: {}", key, e);
            None
        }
    }
}

/// Parses days one by one so a single malformed entry costs only itself.
fn parse_days(entries: Vec<Value>) -> Vec<Day> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Day>(entry) {
            Ok(day) => Some(day),
            Err(e) => {
                log::warn!("Skipping malformed day {} in AI response: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// Turns the model's raw text into an itinerary. Only text that is not a
/// JSON object is an error; every missing field gets default copy.
pub fn parse_itinerary(trip: &TripRequest, raw: &str) -> Result<Itinerary, GenerationError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        log::error!("Failed to parse AI response: {}", e);
        GenerationError::InvalidFormat(e.to_string())
    })?;
    let object = value.as_object().ok_or_else(|| {
        GenerationError::InvalidFormat("expected a JSON object at the top level".to_string())
    })?;

    let destination = trip.destination();
    let overview = field::<String>(object, "overview")
        .filter(|overview| !overview.trim().is_empty())
        .unwrap_or_else(|| default_overview(destination));
    let highlights = field::<Vec<String>>(object, "highlights")
        .filter(|highlights| !highlights.is_empty())
        .unwrap_or_else(|| default_highlights(destination));
    let days = parse_days(field::<Vec<Value>>(object, "days").unwrap_or_default());
    let tips = field::<Vec<String>>(object, "tips")
        .filter(|tips| !tips.is_empty())
        .unwrap_or_else(default_tips);

    Ok(Itinerary {
        destination: destination.to_string(),
        duration: trip.duration_label(),
        total_budget: trip.budget().range_label().to_string(),
        travelers: trip.travelers().label().to_string(),
        overview,
        highlights,
        days,
        tips,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub itinerary: Itinerary,
    /// Id of the auto-saved copy, when the caller was signed in and the save
    /// went through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_id: Option<String>,
}

pub struct ItineraryGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl ItineraryGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    pub async fn generate(&self, trip: &TripRequest) -> Result<Itinerary, GenerationError> {
        let prompt = build_prompt(trip);
        let raw = self.generator.generate_text(&prompt).await?;
        parse_itinerary(trip, &raw)
    }

    /// Generates an itinerary and, for a signed-in caller, saves it as a
    /// public record. A failed save is logged and never fails the call.
    pub async fn generate_and_save(
        &self,
        trip: &TripRequest,
        owner: Option<&str>,
        store: &dyn ItineraryStore,
    ) -> Result<GeneratedItinerary, GenerationError> {
        let itinerary = self.generate(trip).await?;

        let saved_id = match owner {
            Some(owner) => {
                let input = NewItinerary {
                    title: format!("{} Adventure", trip.destination()),
                    is_public: true,
                    luxury_level: trip.budget(),
                    comfort_level: ComfortLevel::Standard,
                    itinerary: itinerary.clone(),
                };
                match store.insert_itinerary(owner, input).await {
                    Ok(saved) => {
                        log::info!("Itinerary auto-saved as {}", saved.id);
                        Some(saved.id)
                    }
                    Err(e) => {
                        log::warn!("Failed to auto-save itinerary for {}: {}", owner, e);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(GeneratedItinerary {
            itinerary,
            saved_id,
        })
    }
}
