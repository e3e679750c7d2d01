use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const INTEREST_OPTIONS: [&str; 8] = [
    "Adventure & Outdoors",
    "Culture & History",
    "Food & Dining",
    "Nightlife & Entertainment",
    "Shopping",
    "Relaxation & Wellness",
    "Photography",
    "Local Experiences",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Moderate,
    Luxury,
    Premium,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 4] = [
        BudgetTier::Budget,
        BudgetTier::Moderate,
        BudgetTier::Luxury,
        BudgetTier::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "budget",
            BudgetTier::Moderate => "moderate",
            BudgetTier::Luxury => "luxury",
            BudgetTier::Premium => "premium",
        }
    }

    /// Spending range shown next to a generated itinerary.
    pub fn range_label(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "$500-1000",
            BudgetTier::Moderate => "$1000-3000",
            BudgetTier::Luxury => "$3000-5000",
            BudgetTier::Premium => "$5000+",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == value.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelerCount {
    #[serde(rename = "1")]
    Solo,
    #[serde(rename = "2")]
    Couple,
    #[serde(rename = "3-4")]
    SmallGroup,
    #[serde(rename = "5+")]
    LargeGroup,
}

impl TravelerCount {
    pub const ALL: [TravelerCount; 4] = [
        TravelerCount::Solo,
        TravelerCount::Couple,
        TravelerCount::SmallGroup,
        TravelerCount::LargeGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelerCount::Solo => "1",
            TravelerCount::Couple => "2",
            TravelerCount::SmallGroup => "3-4",
            TravelerCount::LargeGroup => "5+",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TravelerCount::Solo => "Solo Traveler",
            TravelerCount::Couple => "2 People",
            TravelerCount::SmallGroup => "3-4 People",
            TravelerCount::LargeGroup => "5+ People",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|count| count.as_str() == value.trim())
    }
}

/// Field-level validation messages, keyed by the form field name.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "Invalid trip request ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Raw planner form as submitted by the client. Every field is optional on
/// the wire so that missing values are reported per field.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripForm {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: String,
    pub travelers: String,
    pub interests: Vec<String>,
}

impl TripForm {
    pub fn validate(self) -> Result<TripRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let start_date = parse_date(&self.start_date, "startDate", &mut errors);
        let end_date = parse_date(&self.end_date, "endDate", &mut errors);

        let budget = BudgetTier::parse(&self.budget);
        if budget.is_none() {
            errors.add("budget", "Choose one of budget, moderate, luxury or premium");
        }

        let travelers = TravelerCount::parse(&self.travelers);
        if travelers.is_none() {
            errors.add("travelers", "Choose one of 1, 2, 3-4 or 5+");
        }

        match (start_date, end_date, budget, travelers) {
            (Some(start_date), Some(end_date), Some(budget), Some(travelers))
                if errors.is_empty() =>
            {
                TripRequest::new(
                    &self.destination,
                    start_date,
                    end_date,
                    budget,
                    travelers,
                    self.interests,
                )
            }
            _ => {
                if self.destination.trim().is_empty() {
                    errors.add("destination", "Destination is required");
                }
                Err(errors)
            }
        }
    }
}

fn parse_date(raw: &str, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        errors.add(field, "Date is required");
        return None;
    }
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Expected a date formatted as YYYY-MM-DD");
            None
        }
    }
}

/// A validated trip request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    budget: BudgetTier,
    travelers: TravelerCount,
    interests: Vec<String>,
}

impl TripRequest {
    pub fn new(
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        budget: BudgetTier,
        travelers: TravelerCount,
        interests: Vec<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let destination = destination.trim();
        if destination.is_empty() {
            errors.add("destination", "Destination is required");
        }
        if end_date < start_date {
            errors.add("endDate", "End date must not be before the start date");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        // Interests behave as a set; keep first-seen order for the prompt.
        let mut unique: Vec<String> = Vec::with_capacity(interests.len());
        for interest in interests {
            let interest = interest.trim();
            if !interest.is_empty() && !unique.iter().any(|seen| seen == interest) {
                unique.push(interest.to_string());
            }
        }

        Ok(Self {
            destination: destination.to_string(),
            start_date,
            end_date,
            budget,
            travelers,
            interests: unique,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn budget(&self) -> BudgetTier {
        self.budget
    }

    pub fn travelers(&self) -> TravelerCount {
        self.travelers
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    /// Number of calendar days covered by the trip, counting both ends.
    pub fn duration_days(&self) -> u32 {
        ((self.end_date - self.start_date).num_days() + 1) as u32
    }

    pub fn duration_label(&self) -> String {
        format!("{} days", self.duration_days())
    }
}

#[derive(Debug, Serialize)]
pub struct TripOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TripOptions {
    pub budgets: Vec<TripOption>,
    pub travelers: Vec<TripOption>,
    pub interests: Vec<&'static str>,
}

impl TripOptions {
    pub fn catalog() -> Self {
        Self {
            budgets: BudgetTier::ALL
                .iter()
                .map(|tier| TripOption {
                    value: tier.as_str(),
                    label: tier.range_label(),
                })
                .collect(),
            travelers: TravelerCount::ALL
                .iter()
                .map(|count| TripOption {
                    value: count.as_str(),
                    label: count.label(),
                })
                .collect(),
            interests: INTEREST_OPTIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn form() -> TripForm {
        TripForm {
            destination: " Lisbon, Portugal ".to_string(),
            start_date: "2025-06-01".to_string(),
            end_date: "2025-06-05".to_string(),
            budget: "moderate".to_string(),
            travelers: "3-4".to_string(),
            interests: vec![
                "Food & Dining".to_string(),
                "Photography".to_string(),
                "Food & Dining".to_string(),
                "  ".to_string(),
            ],
        }
    }

    #[test]
    fn test_duration_is_inclusive() {
        let cases = [
            ("2025-06-01", "2025-06-01", 1),
            ("2025-06-01", "2025-06-02", 2),
            ("2025-06-01", "2025-06-05", 5),
            ("2024-02-27", "2024-03-01", 4),
            ("2025-12-30", "2026-01-02", 4),
        ];

        for (start, end, expected) in cases {
            let trip = TripRequest::new(
                "Rome",
                date(start),
                date(end),
                BudgetTier::Budget,
                TravelerCount::Solo,
                vec![],
            )
            .unwrap();
            assert_eq!(trip.duration_days(), expected, "{} -> {}", start, end);
        }
    }

    #[test]
    fn test_valid_form_becomes_request() {
        let trip = form().validate().unwrap();

        assert_eq!(trip.destination(), "Lisbon, Portugal");
        assert_eq!(trip.budget(), BudgetTier::Moderate);
        assert_eq!(trip.travelers(), TravelerCount::SmallGroup);
        assert_eq!(trip.interests(), ["Food & Dining", "Photography"]);
        assert_eq!(trip.duration_label(), "5 days");
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut input = form();
        input.end_date = "2025-05-30".to_string();

        let errors = input.validate().unwrap_err();
        assert!(errors.fields.contains_key("endDate"));
    }

    #[test]
    fn test_every_bad_field_is_reported() {
        let errors = TripForm {
            start_date: "06/01/2025".to_string(),
            budget: "cheap".to_string(),
            ..TripForm::default()
        }
        .validate()
        .unwrap_err();

        for field in ["destination", "startDate", "endDate", "budget", "travelers"] {
            assert!(errors.fields.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(BudgetTier::Premium.range_label(), "$5000+");
        assert_eq!(TravelerCount::Solo.label(), "Solo Traveler");
        assert_eq!(TravelerCount::parse("5+"), Some(TravelerCount::LargeGroup));
        assert_eq!(BudgetTier::parse("Luxury"), Some(BudgetTier::Luxury));
    }

    #[test]
    fn test_catalog_lists_all_options() {
        let options = TripOptions::catalog();
        assert_eq!(options.budgets.len(), 4);
        assert_eq!(options.travelers.len(), 4);
        assert_eq!(options.interests.len(), 8);
    }
}
