use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timestamp;
use crate::models::trip::BudgetTier;

/// Budget level stored with a saved itinerary; same tiers as the planner form.
pub type LuxuryLevel = BudgetTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortLevel {
    Backpacker,
    #[default]
    Standard,
    Comfort,
    Luxury,
}

/// Model output is loosely typed: numbers arrive where text is expected and
/// the other way round. Fields of the wrong shape are coerced, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    #[serde(deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cost: String,
    #[serde(
        deserialize_with = "lenient::rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Day {
    #[serde(deserialize_with = "lenient::day_number")]
    pub day: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::activities")]
    pub activities: Vec<Activity>,
    #[serde(deserialize_with = "lenient::text")]
    pub estimated_cost: String,
    #[serde(deserialize_with = "lenient::text")]
    pub transportation: String,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Activity;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => text,
            Value::Null => String::new(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => other.to_string(),
        })
    }

    pub fn day_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let number = match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number
            .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u32::MAX as f64)
            .map_or(0, |n| n as u32))
    }

    pub fn rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let rating = match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(rating.filter(|r| r.is_finite()))
    }

    /// Keeps every entry that is an object; anything else is dropped.
    pub fn activities<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Activity>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub destination: String,
    pub duration: String,
    pub total_budget: String,
    pub travelers: String,
    pub overview: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl Itinerary {
    /// Whole days parsed from the leading number of the duration label
    /// (`"5 days"` -> 5). Falls back to the number of planned days.
    pub fn duration_days(&self) -> u32 {
        let digits: String = self
            .duration
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits
            .parse()
            .unwrap_or_else(|_| self.days.len() as u32)
    }
}

/// Body of a save request from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveItineraryRequest {
    pub title: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "default_luxury_level")]
    pub luxury_level: LuxuryLevel,
    #[serde(default)]
    pub comfort_level: ComfortLevel,
    pub itinerary: Itinerary,
}

fn default_luxury_level() -> LuxuryLevel {
    BudgetTier::Moderate
}

impl SaveItineraryRequest {
    pub fn into_new_itinerary(self) -> Result<NewItinerary, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Please enter a title for your itinerary".to_string());
        }
        if self.itinerary.destination.trim().is_empty() {
            return Err("Itinerary destination is required".to_string());
        }
        Ok(NewItinerary {
            title: title.to_string(),
            is_public: self.is_public,
            luxury_level: self.luxury_level,
            comfort_level: self.comfort_level,
            itinerary: self.itinerary,
        })
    }
}

/// A validated itinerary ready to be inserted or to replace a stored one.
#[derive(Debug, Clone)]
pub struct NewItinerary {
    pub title: String,
    pub is_public: bool,
    pub luxury_level: LuxuryLevel,
    pub comfort_level: ComfortLevel,
    pub itinerary: Itinerary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedItinerary {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub duration_days: u32,
    pub luxury_level: LuxuryLevel,
    pub comfort_level: ComfortLevel,
    pub is_public: bool,
    pub itinerary_data: Itinerary,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl PersistedItinerary {
    pub fn create(id: String, user_id: &str, input: NewItinerary) -> Self {
        let now = timestamp::now();
        Self {
            id,
            user_id: user_id.to_string(),
            title: input.title,
            destination: input.itinerary.destination.clone(),
            duration_days: input.itinerary.duration_days(),
            luxury_level: input.luxury_level,
            comfort_level: input.comfort_level,
            is_public: input.is_public,
            itinerary_data: input.itinerary,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the stored content with a re-saved version, keeping identity,
    /// ownership and creation time.
    pub fn apply(&mut self, input: NewItinerary) {
        self.title = input.title;
        self.destination = input.itinerary.destination.clone();
        self.duration_days = input.itinerary.duration_days();
        self.luxury_level = input.luxury_level;
        self.comfort_level = input.comfort_level;
        self.is_public = input.is_public;
        self.itinerary_data = input.itinerary;
        self.updated_at = timestamp::now();
    }

    pub fn visible_to(&self, user_id: Option<&str>) -> bool {
        self.is_public || user_id == Some(self.user_id.as_str())
    }
}

/// Row of the summary view: itinerary columns without the body, plus author
/// display fields and rating aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySummary {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub duration_days: u32,
    pub luxury_level: LuxuryLevel,
    pub comfort_level: ComfortLevel,
    pub is_public: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
}

/// Public listing order: best average first, ties broken by rating count.
pub fn sort_by_rating(summaries: &mut [ItinerarySummary]) {
    summaries.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.total_ratings.cmp(&a.total_ratings))
    });
}
