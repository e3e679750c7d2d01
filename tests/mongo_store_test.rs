//! Runs against a live MongoDB at `MONGODB_URI`:
//! `cargo test --test mongo_store_test -- --ignored`

use trip_planner_api::db::mongo::create_mongo_client;
use trip_planner_api::db::mongo_store::MongoStore;
use trip_planner_api::db::store::{new_id, ItineraryStore, StoreError};
use trip_planner_api::models::itinerary::{ComfortLevel, Itinerary, NewItinerary};
use trip_planner_api::models::rating::RatingSubmission;
use trip_planner_api::models::timestamp;
use trip_planner_api::models::trip::BudgetTier;
use trip_planner_api::models::user::User;

async fn store() -> MongoStore {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    // A fresh database per run keeps runs independent.
    let database = format!("trip_planner_test_{}", new_id().replace('-', ""));
    let client = create_mongo_client(&uri, &database).await.unwrap();
    let store = MongoStore::new(client, &database);
    store.ensure_indexes().await.unwrap();
    store
}

fn user(email: &str, name: &str) -> User {
    let now = timestamp::now();
    User {
        id: new_id(),
        email: email.to_string(),
        password: "hash".to_string(),
        full_name: Some(name.to_string()),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    }
}

fn new_itinerary(destination: &str, is_public: bool) -> NewItinerary {
    NewItinerary {
        title: format!("{} Adventure", destination),
        is_public,
        luxury_level: BudgetTier::Moderate,
        comfort_level: ComfortLevel::Standard,
        itinerary: Itinerary {
            destination: destination.to_string(),
            duration: "3 days".to_string(),
            ..Itinerary::default()
        },
    }
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_conflict() {
    let store = store().await;
    store.create_user(user("ana@example.com", "Ana")).await.unwrap();

    let err = store
        .create_user(user("ana@example.com", "Other Ana"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
#[ignore]
async fn test_rating_upsert_and_summary_view() {
    let store = store().await;
    let owner = store.create_user(user("ana@example.com", "Ana")).await.unwrap();
    let rater = store.create_user(user("bo@example.com", "Bo")).await.unwrap();
    let other = store.create_user(user("cy@example.com", "Cy")).await.unwrap();

    let a = store
        .insert_itinerary(&owner.id, new_itinerary("Aveiro", true))
        .await
        .unwrap();
    let b = store
        .insert_itinerary(&owner.id, new_itinerary("Braga", true))
        .await
        .unwrap();
    store
        .insert_itinerary(&owner.id, new_itinerary("Hidden", false))
        .await
        .unwrap();

    let submit = |rating: u8, review: Option<&str>| RatingSubmission {
        rating,
        review: review.map(str::to_string),
    };

    let first = store
        .upsert_rating(&rater.id, &a.id, submit(2, Some("meh")))
        .await
        .unwrap();
    let second = store
        .upsert_rating(&rater.id, &a.id, submit(5, None))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.review, None);

    store.upsert_rating(&rater.id, &b.id, submit(5, None)).await.unwrap();
    store.upsert_rating(&other.id, &b.id, submit(5, None)).await.unwrap();

    let summary = store.rating_summary(&a.id).await.unwrap();
    assert_eq!(summary.total_ratings, 1);
    assert_eq!(summary.average_rating, 5.0);

    let public = store.list_public_summaries().await.unwrap();
    let ids: Vec<&str> = public.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, [b.id.as_str(), a.id.as_str()]);
    assert_eq!(public[0].author_name.as_deref(), Some("Ana"));

    let ratings = store.list_ratings(&b.id).await.unwrap();
    assert_eq!(ratings.len(), 2);
    assert!(ratings.iter().all(|row| row.users.full_name.is_some()));
}

#[tokio::test]
#[ignore]
async fn test_update_is_owner_only() {
    let store = store().await;
    let owner = store.create_user(user("ana@example.com", "Ana")).await.unwrap();
    let other = store.create_user(user("bo@example.com", "Bo")).await.unwrap();
    let saved = store
        .insert_itinerary(&owner.id, new_itinerary("Porto", false))
        .await
        .unwrap();

    let err = store
        .update_itinerary(&other.id, &saved.id, new_itinerary("Porto", true))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Forbidden(_)));

    let updated = store
        .update_itinerary(&owner.id, &saved.id, new_itinerary("Porto", true))
        .await
        .unwrap();
    assert!(updated.is_public);
    assert_eq!(updated.created_at, saved.created_at);
}
