use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    itinerary::{ItinerarySummary, NewItinerary, PersistedItinerary},
    rating::{Rating, RatingSubmission, RatingSummary, RatingWithAuthor},
    user::{ProfileUpdate, User},
};

#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Persistence for users, itineraries and ratings. Implementations enforce
/// itinerary ownership on update.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, StoreError>;

    async fn insert_itinerary(
        &self,
        owner: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError>;

    /// Re-save by the owner. `NotFound` for unknown ids, `Forbidden` for rows
    /// owned by someone else.
    async fn update_itinerary(
        &self,
        owner: &str,
        id: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError>;

    async fn get_itinerary(&self, id: &str) -> Result<Option<PersistedItinerary>, StoreError>;

    /// Public rows, best average rating first, then most ratings.
    async fn list_public_summaries(&self) -> Result<Vec<ItinerarySummary>, StoreError>;

    /// All rows owned by `user_id`, newest first.
    async fn list_user_summaries(&self, user_id: &str)
        -> Result<Vec<ItinerarySummary>, StoreError>;

    /// One rating per (itinerary, user); a second submission overwrites the
    /// first in place.
    async fn upsert_rating(
        &self,
        user_id: &str,
        itinerary_id: &str,
        submission: RatingSubmission,
    ) -> Result<Rating, StoreError>;

    /// Ratings for one itinerary with author display fields, newest first.
    async fn list_ratings(&self, itinerary_id: &str) -> Result<Vec<RatingWithAuthor>, StoreError>;

    async fn rating_summary(&self, itinerary_id: &str) -> Result<RatingSummary, StoreError>;
}
