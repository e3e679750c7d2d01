pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod store;

use std::sync::Arc;

use crate::config::StoreBackend;
use store::{ItineraryStore, StoreError};

/// Opens the configured store, creating MongoDB indexes on the way.
pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn ItineraryStore>, StoreError> {
    match backend {
        StoreBackend::Mongo { uri, database } => {
            let client = mongo::create_mongo_client(uri, database).await?;
            let store = mongo_store::MongoStore::new(client, database);
            store.ensure_indexes().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}
