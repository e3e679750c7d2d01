use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timestamp;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub itinerary_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingSubmission {
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

impl RatingSubmission {
    /// Checks the 1-5 range and normalizes a blank review to none.
    pub fn validate(self) -> Result<Self, String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        let review = self
            .review
            .map(|review| review.trim().to_string())
            .filter(|review| !review.is_empty());
        Ok(Self {
            rating: self.rating,
            review,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingAuthor {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A rating joined with its author's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingWithAuthor {
    #[serde(flatten)]
    pub rating: Rating,
    #[serde(default)]
    pub users: RatingAuthor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: u32,
}

impl RatingSummary {
    /// Arithmetic mean of the given scores; zero when there are none.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let (sum, count) = scores
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), score| {
                (sum + u64::from(score), count + 1)
            });
        if count == 0 {
            return Self::default();
        }
        Self {
            average_rating: sum as f64 / f64::from(count),
            total_ratings: count,
        }
    }
}
