// src/storage/mod.rs

pub mod file;
pub mod mongo;
pub mod records;
pub mod traits;
pub mod window;

pub use file::FileStore;
pub use mongo::MongoStore;
pub use records::{NewUser, NewVisitor, Period, User, Visitor, VisitorCounts};
pub use traits::VisitorStore;

use crate::config::AppConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

/// Select and build the backing store from the resolved configuration.
///
/// A configured MongoDB URI selects the document-backed store; otherwise
/// state lives in the JSON file at the configured path. The choice is made
/// once at startup and callers only ever see the trait object.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn VisitorStore>> {
    match &config.mongodb_uri {
        Some(uri) => {
            info!(database = %config.mongodb_database, "MongoDB URI configured. Using document-backed store.");
            let store = MongoStore::connect(uri, &config.mongodb_database).await?;
            Ok(Arc::new(store))
        }
        None => {
            info!(path = %config.data_file.display(), "No MongoDB URI configured. Using file-backed store.");
            let store = FileStore::open(&config.data_file).await?;
            Ok(Arc::new(store))
        }
    }
}
