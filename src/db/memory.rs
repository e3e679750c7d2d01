use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::store::{new_id, ItineraryStore, StoreError};
use crate::models::{
    itinerary::{sort_by_rating, ItinerarySummary, NewItinerary, PersistedItinerary},
    rating::{Rating, RatingAuthor, RatingSubmission, RatingSummary, RatingWithAuthor},
    timestamp,
    user::{ProfileUpdate, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    itineraries: Vec<PersistedItinerary>,
    ratings: Vec<Rating>,
}

impl Tables {
    fn summarize(&self, itinerary: &PersistedItinerary) -> ItinerarySummary {
        let author = self.users.iter().find(|user| user.id == itinerary.user_id);
        let summary = RatingSummary::from_scores(
            self.ratings
                .iter()
                .filter(|rating| rating.itinerary_id == itinerary.id)
                .map(|rating| rating.rating),
        );

        ItinerarySummary {
            id: itinerary.id.clone(),
            user_id: itinerary.user_id.clone(),
            title: itinerary.title.clone(),
            destination: itinerary.destination.clone(),
            duration_days: itinerary.duration_days,
            luxury_level: itinerary.luxury_level,
            comfort_level: itinerary.comfort_level,
            is_public: itinerary.is_public,
            created_at: itinerary.created_at,
            updated_at: itinerary.updated_at,
            author_name: author.and_then(|user| user.full_name.clone()),
            author_avatar: author.and_then(|user| user.avatar_url.clone()),
            average_rating: summary.average_rating,
            total_ratings: summary.total_ratings,
        }
    }
}

/// In-process store with the same semantics as the MongoDB one. Backs the
/// HTTP tests and `STORE_BACKEND=memory` local runs; nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rating_count(&self) -> usize {
        self.tables.read().await.ratings.len()
    }
}

#[async_trait]
impl ItineraryStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;

        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        user.updated_at = timestamp::now();
        Ok(user.clone())
    }

    async fn insert_itinerary(
        &self,
        owner: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError> {
        let itinerary = PersistedItinerary::create(new_id(), owner, input);
        self.tables.write().await.itineraries.push(itinerary.clone());
        Ok(itinerary)
    }

    async fn update_itinerary(
        &self,
        owner: &str,
        id: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError> {
        let mut tables = self.tables.write().await;
        let itinerary = tables
            .itineraries
            .iter_mut()
            .find(|itinerary| itinerary.id == id)
            .ok_or_else(|| StoreError::NotFound("Itinerary not found".to_string()))?;
        if itinerary.user_id != owner {
            return Err(StoreError::Forbidden(
                "Only the owner can update this itinerary".to_string(),
            ));
        }
        itinerary.apply(input);
        Ok(itinerary.clone())
    }

    async fn get_itinerary(&self, id: &str) -> Result<Option<PersistedItinerary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .itineraries
            .iter()
            .find(|itinerary| itinerary.id == id)
            .cloned())
    }

    async fn list_public_summaries(&self) -> Result<Vec<ItinerarySummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<ItinerarySummary> = tables
            .itineraries
            .iter()
            .filter(|itinerary| itinerary.is_public)
            .map(|itinerary| tables.summarize(itinerary))
            .collect();
        // Newest first among equals, matching the database sort.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sort_by_rating(&mut summaries);
        Ok(summaries)
    }

    async fn list_user_summaries(
        &self,
        user_id: &str,
    ) -> Result<Vec<ItinerarySummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<ItinerarySummary> = tables
            .itineraries
            .iter()
            .filter(|itinerary| itinerary.user_id == user_id)
            .map(|itinerary| tables.summarize(itinerary))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn upsert_rating(
        &self,
        user_id: &str,
        itinerary_id: &str,
        submission: RatingSubmission,
    ) -> Result<Rating, StoreError> {
        let mut tables = self.tables.write().await;
        let now = timestamp::now();

        if let Some(existing) = tables
            .ratings
            .iter_mut()
            .find(|rating| rating.itinerary_id == itinerary_id && rating.user_id == user_id)
        {
            existing.rating = submission.rating;
            existing.review = submission.review;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let rating = Rating {
            id: new_id(),
            itinerary_id: itinerary_id.to_string(),
            user_id: user_id.to_string(),
            rating: submission.rating,
            review: submission.review,
            created_at: now,
            updated_at: now,
        };
        tables.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn list_ratings(&self, itinerary_id: &str) -> Result<Vec<RatingWithAuthor>, StoreError> {
        let tables = self.tables.read().await;
        let mut ratings: Vec<RatingWithAuthor> = tables
            .ratings
            .iter()
            .filter(|rating| rating.itinerary_id == itinerary_id)
            .map(|rating| {
                let users = tables
                    .users
                    .iter()
                    .find(|user| user.id == rating.user_id)
                    .map(|user| RatingAuthor {
                        full_name: user.full_name.clone(),
                        avatar_url: user.avatar_url.clone(),
                    })
                    .unwrap_or_default();
                RatingWithAuthor {
                    rating: rating.clone(),
                    users,
                }
            })
            .collect();
        ratings.sort_by(|a, b| b.rating.created_at.cmp(&a.rating.created_at));
        Ok(ratings)
    }

    async fn rating_summary(&self, itinerary_id: &str) -> Result<RatingSummary, StoreError> {
        let tables = self.tables.read().await;
        Ok(RatingSummary::from_scores(
            tables
                .ratings
                .iter()
                .filter(|rating| rating.itinerary_id == itinerary_id)
                .map(|rating| rating.rating),
        ))
    }
}
