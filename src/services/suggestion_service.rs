use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SuggestionFallback;
use crate::models::suggestion::{LocationSuggestion, LocationType, SuggestionResponse};
use crate::services::debounce::Debouncer;
use crate::services::gemini::{strip_code_fences, GenerationError, TextGenerator};

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 8;

// (id, name, full name, country, type, flag)
const POPULAR_DESTINATIONS: [(&str, &str, &str, &str, LocationType, &str); 15] = [
    ("paris-france", "Paris", "Paris, France", "France", LocationType::City, "🇫🇷"),
    ("tokyo-japan", "Tokyo", "Tokyo, Japan", "Japan", LocationType::City, "🇯🇵"),
    ("new-york-usa", "New York", "New York, USA", "United States", LocationType::City, "🇺🇸"),
    ("london-uk", "London", "London, UK", "United Kingdom", LocationType::City, "🇬🇧"),
    ("rome-italy", "Rome", "Rome, Italy", "Italy", LocationType::City, "🇮🇹"),
    ("barcelona-spain", "Barcelona", "Barcelona, Spain", "Spain", LocationType::City, "🇪🇸"),
    ("amsterdam-netherlands", "Amsterdam", "Amsterdam, Netherlands", "Netherlands", LocationType::City, "🇳🇱"),
    ("sydney-australia", "Sydney", "Sydney, Australia", "Australia", LocationType::City, "🇦🇺"),
    ("dubai-uae", "Dubai", "Dubai, UAE", "United Arab Emirates", LocationType::City, "🇦🇪"),
    ("singapore", "Singapore", "Singapore", "Singapore", LocationType::City, "🇸🇬"),
    ("bali-indonesia", "Bali", "Bali, Indonesia", "Indonesia", LocationType::Region, "🇮🇩"),
    ("santorini-greece", "Santorini", "Santorini, Greece", "Greece", LocationType::City, "🇬🇷"),
    ("iceland", "Iceland", "Iceland", "Iceland", LocationType::Country, "🇮🇸"),
    ("thailand", "Thailand", "Thailand", "Thailand", LocationType::Country, "🇹🇭"),
    ("morocco", "Morocco", "Morocco", "Morocco", LocationType::Country, "🇲🇦"),
];

#[derive(Debug)]
pub enum SuggestionError {
    Remote(GenerationError),
}

impl fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionError::Remote(err) => write!(f, "Failed to fetch suggestions: {}", err),
        }
    }
}

impl std::error::Error for SuggestionError {}

impl From<GenerationError> for SuggestionError {
    fn from(err: GenerationError) -> Self {
        SuggestionError::Remote(err)
    }
}

/// Case-insensitive substring match over name, country and full name of the
/// built-in table, in table order, capped at eight.
pub fn static_suggestions(query: &str) -> Vec<LocationSuggestion> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    POPULAR_DESTINATIONS
        .iter()
        .filter(|(_, name, full_name, country, _, _)| {
            name.to_lowercase().contains(&query)
                || country.to_lowercase().contains(&query)
                || full_name.to_lowercase().contains(&query)
        })
        .take(MAX_SUGGESTIONS)
        .map(
            |(id, name, full_name, country, location_type, flag)| LocationSuggestion {
                id: id.to_string(),
                name: name.to_string(),
                full_name: full_name.to_string(),
                country: country.to_string(),
                location_type: *location_type,
                flag: Some(flag.to_string()),
            },
        )
        .collect()
}

fn build_prompt(query: &str) -> String {
    format!(
        r#"You are a travel location expert. Given the user input "{query}", provide up to {max} relevant travel destinations including cities, countries, landmarks, and popular tourist attractions.

Return ONLY a valid JSON array with this exact structure:
[
  {{
    "id": "unique-id",
    "name": "Location Name",
    "fullName": "Full Location Name with Context",
    "country": "Country Name",
    "type": "city|country|landmark|region",
    "flag": "🇺🇸"
  }}
]

Examples:
- For "par": [{{"id":"paris-france","name":"Paris","fullName":"Paris, France","country":"France","type":"city","flag":"🇫🇷"}}]
- For "tok": [{{"id":"tokyo-japan","name":"Tokyo","fullName":"Tokyo, Japan","country":"Japan","type":"city","flag":"🇯🇵"}}]

Focus on popular travel destinations that match the input. Include the appropriate country flag emoji."#,
        query = query,
        max = MAX_SUGGESTIONS
    )
}

pub struct SuggestionService {
    generator: Arc<dyn TextGenerator>,
    fallback: SuggestionFallback,
    debouncer: Debouncer,
}

impl SuggestionService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        fallback: SuggestionFallback,
        debounce: Duration,
    ) -> Self {
        Self {
            generator,
            fallback,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Autocomplete is off only in strict mode without a generation key.
    pub fn is_enabled(&self) -> bool {
        self.generator.is_configured() || self.fallback == SuggestionFallback::Static
    }

    /// Debounced entry point. `client_key` identifies the caller so that a
    /// burst of keystrokes from one client costs at most one remote call.
    pub async fn suggest(
        &self,
        client_key: &str,
        query: &str,
    ) -> Result<SuggestionResponse, SuggestionError> {
        if !self.debouncer.settle(client_key).await {
            return Ok(SuggestionResponse {
                suggestions: Vec::new(),
                enabled: self.is_enabled(),
                superseded: true,
            });
        }

        Ok(SuggestionResponse {
            suggestions: self.lookup(query).await?,
            enabled: self.is_enabled(),
            superseded: false,
        })
    }

    pub async fn lookup(&self, query: &str) -> Result<Vec<LocationSuggestion>, SuggestionError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS || !self.is_enabled() {
            return Ok(Vec::new());
        }
        if !self.generator.is_configured() {
            return Ok(static_suggestions(query));
        }

        match self.remote_suggestions(query).await {
            Ok(suggestions) => Ok(suggestions),
            Err(err) => match self.fallback {
                SuggestionFallback::Static => {
                    log::warn!("Error fetching location suggestions, using static list: {}", err);
                    Ok(static_suggestions(query))
                }
                SuggestionFallback::Strict => Err(err.into()),
            },
        }
    }

    async fn remote_suggestions(
        &self,
        query: &str,
    ) -> Result<Vec<LocationSuggestion>, GenerationError> {
        let raw = self.generator.generate_text(&build_prompt(query)).await?;
        let cleaned = strip_code_fences(&raw);
        let mut suggestions: Vec<LocationSuggestion> = serde_json::from_str(&cleaned)
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;
        suggestions.truncate(MAX_SUGGESTIONS);
        Ok(suggestions)
    }
}
