use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};

use crate::db::store::{new_id, ItineraryStore, StoreError};
use crate::models::{
    itinerary::{ItinerarySummary, NewItinerary, PersistedItinerary},
    rating::{Rating, RatingAuthor, RatingSubmission, RatingSummary, RatingWithAuthor},
    timestamp,
    user::{ProfileUpdate, User},
};

const USERS: &str = "users";
const ITINERARIES: &str = "itineraries";
const RATINGS: &str = "itinerary_ratings";

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: Arc<Client>, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn itineraries(&self) -> Collection<PersistedItinerary> {
        self.db.collection(ITINERARIES)
    }

    fn ratings(&self) -> Collection<Rating> {
        self.db.collection(RATINGS)
    }

    /// Creates the unique indexes the upsert and sign-up paths rely on.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(IndexModel::builder().keys(doc! {"id": 1}).options(unique()).build())
            .await?;
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! {"email": 1})
                    .options(unique())
                    .build(),
            )
            .await?;
        self.itineraries()
            .create_index(IndexModel::builder().keys(doc! {"id": 1}).options(unique()).build())
            .await?;
        self.itineraries()
            .create_index(
                IndexModel::builder()
                    .keys(doc! {"user_id": 1, "created_at": -1})
                    .build(),
            )
            .await?;
        self.ratings()
            .create_index(
                IndexModel::builder()
                    .keys(doc! {"itinerary_id": 1, "user_id": 1})
                    .options(unique())
                    .build(),
            )
            .await?;

        log::info!("MongoDB indexes ensured");
        Ok(())
    }

    /// The summary view: itinerary rows joined with their author and rating
    /// aggregates, without the itinerary body.
    fn summary_pipeline(filter: Document, sort: Document) -> Vec<Document> {
        vec![
            doc! {"$match": filter},
            doc! {"$lookup": {
                "from": RATINGS,
                "localField": "id",
                "foreignField": "itinerary_id",
                "as": "ratings",
            }},
            doc! {"$lookup": {
                "from": USERS,
                "localField": "user_id",
                "foreignField": "id",
                "as": "author",
            }},
            doc! {"$addFields": {
                "average_rating": {"$ifNull": [{"$avg": "$ratings.rating"}, 0.0]},
                "total_ratings": {"$size": "$ratings"},
                "author_name": {"$arrayElemAt": ["$author.full_name", 0]},
                "author_avatar": {"$arrayElemAt": ["$author.avatar_url", 0]},
            }},
            doc! {"$project": {
                "_id": 0,
                "ratings": 0,
                "author": 0,
                "itinerary_data": 0,
            }},
            doc! {"$sort": sort},
        ]
    }

    async fn summaries(
        &self,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<ItinerarySummary>, StoreError> {
        let cursor = self
            .db
            .collection::<Document>(ITINERARIES)
            .aggregate(Self::summary_pipeline(filter, sort))
            .await?;
        let summaries = cursor.with_type::<ItinerarySummary>().try_collect().await?;
        Ok(summaries)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl ItineraryStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! {"ping": 1}).await?;
        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::Conflict(
                "An account with this email already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! {"email": email}).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! {"id": id}).await?)
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut set = doc! {"updated_at": timestamp::format(&timestamp::now())};
        if let Some(full_name) = update.full_name {
            set.insert("full_name", full_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            set.insert("avatar_url", avatar_url);
        }

        self.users()
            .find_one_and_update(doc! {"id": id}, doc! {"$set": set})
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn insert_itinerary(
        &self,
        owner: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError> {
        let itinerary = PersistedItinerary::create(new_id(), owner, input);
        self.itineraries().insert_one(&itinerary).await?;
        log::info!("Saved itinerary {} for user {}", itinerary.id, owner);
        Ok(itinerary)
    }

    async fn update_itinerary(
        &self,
        owner: &str,
        id: &str,
        input: NewItinerary,
    ) -> Result<PersistedItinerary, StoreError> {
        let mut itinerary = self
            .itineraries()
            .find_one(doc! {"id": id})
            .await?
            .ok_or_else(|| StoreError::NotFound("Itinerary not found".to_string()))?;
        if itinerary.user_id != owner {
            return Err(StoreError::Forbidden(
                "Only the owner can update this itinerary".to_string(),
            ));
        }

        itinerary.apply(input);
        self.itineraries()
            .replace_one(doc! {"id": id, "user_id": owner}, &itinerary)
            .await?;
        Ok(itinerary)
    }

    async fn get_itinerary(&self, id: &str) -> Result<Option<PersistedItinerary>, StoreError> {
        Ok(self.itineraries().find_one(doc! {"id": id}).await?)
    }

    async fn list_public_summaries(&self) -> Result<Vec<ItinerarySummary>, StoreError> {
        self.summaries(
            doc! {"is_public": true},
            doc! {"average_rating": -1, "total_ratings": -1, "created_at": -1},
        )
        .await
    }

    async fn list_user_summaries(
        &self,
        user_id: &str,
    ) -> Result<Vec<ItinerarySummary>, StoreError> {
        self.summaries(doc! {"user_id": user_id}, doc! {"created_at": -1})
            .await
    }

    async fn upsert_rating(
        &self,
        user_id: &str,
        itinerary_id: &str,
        submission: RatingSubmission,
    ) -> Result<Rating, StoreError> {
        let filter = doc! {"itinerary_id": itinerary_id, "user_id": user_id};
        let now = timestamp::format(&timestamp::now());

        let mut update = doc! {
            "$set": {"rating": i32::from(submission.rating), "updated_at": now.clone()},
            "$setOnInsert": {"id": new_id(), "created_at": now},
        };
        match submission.review {
            Some(review) => {
                if let Ok(set) = update.get_document_mut("$set") {
                    set.insert("review", review);
                }
            }
            None => {
                update.insert("$unset", doc! {"review": ""});
            }
        }

        match self
            .ratings()
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await
        {
            Ok(_) => {}
            // Two first-time submissions raced; the unique index let one
            // insert win, so apply ours as a plain update.
            Err(err) if is_duplicate_key(&err) => {
                update.remove("$setOnInsert");
                self.ratings().update_one(filter.clone(), update).await?;
            }
            Err(err) => return Err(err.into()),
        }

        self.ratings()
            .find_one(filter)
            .await?
            .ok_or_else(|| StoreError::Database("Rating vanished after upsert".to_string()))
    }

    async fn list_ratings(&self, itinerary_id: &str) -> Result<Vec<RatingWithAuthor>, StoreError> {
        let ratings: Vec<Rating> = self
            .ratings()
            .find(doc! {"itinerary_id": itinerary_id})
            .sort(doc! {"created_at": -1})
            .await?
            .try_collect()
            .await?;

        let user_ids: Vec<&str> = ratings.iter().map(|r| r.user_id.as_str()).collect();
        let authors: HashMap<String, RatingAuthor> = self
            .users()
            .find(doc! {"id": {"$in": user_ids}})
            .await?
            .try_collect::<Vec<User>>()
            .await?
            .into_iter()
            .map(|user| {
                (
                    user.id,
                    RatingAuthor {
                        full_name: user.full_name,
                        avatar_url: user.avatar_url,
                    },
                )
            })
            .collect();

        Ok(ratings
            .into_iter()
            .map(|rating| {
                let users = authors.get(&rating.user_id).cloned().unwrap_or_default();
                RatingWithAuthor { rating, users }
            })
            .collect())
    }

    async fn rating_summary(&self, itinerary_id: &str) -> Result<RatingSummary, StoreError> {
        let scores: Vec<u8> = self
            .ratings()
            .find(doc! {"itinerary_id": itinerary_id})
            .await?
            .map_ok(|rating| rating.rating)
            .try_collect()
            .await?;
        Ok(RatingSummary::from_scores(scores))
    }
}
