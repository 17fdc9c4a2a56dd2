// src/storage/mongo.rs

use crate::error::{AppError, Result};
use crate::storage::window::window_start;
use crate::storage::{NewUser, NewVisitor, Period, User, Visitor, VisitorCounts, VisitorStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, trace};
use uuid::Uuid;

const USERS_COLLECTION: &str = "users";
const VISITORS_COLLECTION: &str = "visitors";

/// MongoDB implementation of visitor storage.
///
/// Every operation is an individual query round-trip against the `users`
/// or `visitors` collection; nothing is cached in-process. The connection
/// is established lazily: the first operation pings the server once, then
/// a flag short-circuits the check for the rest of the process lifetime.
pub struct MongoStore {
    db: Database,
    initialized: AtomicBool,
}

/// A visitor document as stored in MongoDB. The timestamp is a native BSON
/// datetime so window counts run as range-index lookups, and the struct
/// carries no `_id`: Mongo's internal identifier never reaches callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitorDocument {
    id: String,
    user_id: Option<String>,
    page: String,
    referrer: Option<String>,
    user_agent: Option<String>,
    ip: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    timestamp: DateTime<Utc>,
}

impl From<VisitorDocument> for Visitor {
    fn from(doc: VisitorDocument) -> Self {
        Visitor {
            id: doc.id,
            user_id: doc.user_id,
            page: doc.page,
            referrer: doc.referrer,
            user_agent: doc.user_agent,
            ip: doc.ip,
            timestamp: doc.timestamp,
        }
    }
}

impl MongoStore {
    /// Build a store from a connection string. The URI is parsed here but
    /// no connectivity check happens until the first operation.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        Ok(Self {
            db: client.database(database),
            initialized: AtomicBool::new(false),
        })
    }

    /// One-time connectivity check. A failed ping is fatal to the calling
    /// operation; there is no fallback store to degrade to.
    async fn ensure_ready(&self) -> Result<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        self.initialized.store(true, Ordering::Release);
        info!(database = %self.db.name(), "Connected to MongoDB successfully");
        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS_COLLECTION)
    }

    fn visitors(&self) -> Collection<VisitorDocument> {
        self.db.collection(VISITORS_COLLECTION)
    }
}

#[async_trait]
impl VisitorStore for MongoStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.ensure_ready().await?;
        let user = self.users().find_one(doc! { "id": id }, None).await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.ensure_ready().await?;
        let user = self
            .users()
            .find_one(doc! { "username": username }, None)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.ensure_ready().await?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new_user.username,
            password: new_user.password,
        };
        self.users().insert_one(&user, None).await?;
        Ok(user)
    }

    async fn track_visitor(&self, visit: NewVisitor) -> Result<Visitor> {
        self.ensure_ready().await?;
        let document = VisitorDocument {
            id: Uuid::new_v4().to_string(),
            user_id: visit.user_id,
            page: visit.page,
            referrer: visit.referrer,
            user_agent: visit.user_agent,
            ip: visit.ip,
            timestamp: Utc::now(),
        };
        self.visitors().insert_one(&document, None).await?;
        trace!(visitor.id = %document.id, visitor.page = %document.page, "Tracked visitor in MongoDB");
        Ok(document.into())
    }

    async fn visitor_counts(&self, period: Option<Period>) -> Result<VisitorCounts> {
        self.ensure_ready().await?;
        let now = Utc::now();
        let requested: &[Period] = match period {
            Some(ref p) => std::slice::from_ref(p),
            None => &Period::ALL,
        };

        // One counting query per requested window: the database's range
        // filter replaces the file store's in-process scan.
        let mut counts = VisitorCounts::new();
        for &p in requested {
            let start = BsonDateTime::from_chrono(window_start(p, now));
            let count = self
                .visitors()
                .count_documents(doc! { "timestamp": { "$gte": start } }, None)
                .await?;
            counts.insert(p, count);
        }
        Ok(counts)
    }

    async fn all_visitors(&self) -> Result<Vec<Visitor>> {
        self.ensure_ready().await?;
        let cursor = self.visitors().find(doc! {}, None).await?;
        let documents: Vec<VisitorDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Visitor::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn visitor_document_stores_native_bson_datetime() {
        let document = VisitorDocument {
            id: "v1".to_string(),
            user_id: None,
            page: "/home".to_string(),
            referrer: None,
            user_agent: Some("curl/8.0".to_string()),
            ip: Some("127.0.0.1".to_string()),
            timestamp: Utc::now(),
        };

        let serialized = bson::to_document(&document).unwrap();
        assert!(matches!(serialized.get("timestamp"), Some(Bson::DateTime(_))));
        // The public id is the only identifier this document carries.
        assert!(serialized.get("_id").is_none());
        assert_eq!(serialized.get_str("id").unwrap(), "v1");
    }

    #[test]
    fn visitor_document_round_trips_through_bson() {
        let document = VisitorDocument {
            id: "v2".to_string(),
            user_id: Some("u1".to_string()),
            page: "/pricing".to_string(),
            referrer: Some("https://example.com".to_string()),
            user_agent: None,
            ip: None,
            timestamp: Utc::now(),
        };

        let serialized = bson::to_document(&document).unwrap();
        let restored: VisitorDocument = bson::from_document(serialized).unwrap();
        let visitor: Visitor = restored.into();
        assert_eq!(visitor.id, "v2");
        assert_eq!(visitor.user_id.as_deref(), Some("u1"));
        assert_eq!(visitor.page, "/pricing");
        // BSON datetimes carry millisecond precision.
        assert_eq!(
            visitor.timestamp.timestamp_millis(),
            document.timestamp.timestamp_millis()
        );
    }
}
