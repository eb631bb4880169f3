//! Document store abstraction
//!
//! All persistent state lives in flat JSON documents grouped into a handful of
//! untyped collections. The store does no filtering; callers fetch a whole
//! collection and filter in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;
pub mod records;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// The collections used by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Prices,
    ShopItems,
    Inventory,
    Beverages,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Prices,
        Collection::ShopItems,
        Collection::Inventory,
        Collection::Beverages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Prices => "prices",
            Collection::ShopItems => "shopItems",
            Collection::Inventory => "inventory",
            Collection::Beverages => "beverages",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document: its identifier and its untyped body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// `createdAt` of the document, if it carries a readable one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        records::timestamp_field(&self.data, "createdAt")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{collection} document {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    #[error("ordered fetch is not available for {0}")]
    OrderingUnavailable(&'static str),

    #[error("document body must be a JSON object")]
    InvalidDocument,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            return StoreError::Unavailable(err.to_string());
        }
        if let sqlx::Error::Database(db) = &err {
            // insufficient_privilege
            if db.code().as_deref() == Some("42501") {
                return StoreError::PermissionDenied(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// External document store. No optimistic concurrency: last writer wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap connectivity check
    async fn ping(&self) -> StoreResult<()>;

    /// Every document in the collection, in no guaranteed order
    async fn fetch_all(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Every document, newest `createdAt` first. May fail with
    /// [`StoreError::OrderingUnavailable`].
    async fn fetch_all_ordered(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Insert a new document and return its generated id
    async fn create(&self, collection: Collection, data: Value) -> StoreResult<String>;

    /// Shallow-merge `partial` into an existing document
    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()>;

    /// Remove a document. Removing a missing document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;
}

/// Newest-first fetch that falls back to an in-memory sort when the store
/// cannot order the query itself
pub async fn fetch_newest_first(
    store: &dyn DocumentStore,
    collection: Collection,
) -> StoreResult<Vec<Document>> {
    match store.fetch_all_ordered(collection).await {
        Ok(docs) => Ok(docs),
        Err(StoreError::OrderingUnavailable(_)) => {
            tracing::warn!(
                collection = collection.name(),
                "ordered fetch unavailable, sorting in memory"
            );
            let mut docs = store.fetch_all(collection).await?;
            sort_newest_first(&mut docs);
            Ok(docs)
        }
        Err(e) => Err(e),
    }
}

/// Stable sort by `createdAt` descending; a missing timestamp counts as epoch
pub fn sort_newest_first(docs: &mut [Document]) {
    // `None` orders before any timestamp, so reversed it lands last
    docs.sort_by_key(|doc| std::cmp::Reverse(doc.created_at()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, created_at: Option<&str>) -> Document {
        let data = match created_at {
            Some(ts) => json!({ "createdAt": ts }),
            None => json!({}),
        };
        Document {
            id: id.to_string(),
            data,
        }
    }

    #[test]
    fn test_sort_newest_first_missing_is_oldest() {
        let mut docs = vec![
            doc("a", Some("2024-01-01T08:00:00.000Z")),
            doc("b", None),
            doc("c", Some("2024-01-03T08:00:00.000Z")),
            doc("d", Some("2024-01-02T08:00:00.000Z")),
        ];
        sort_newest_first(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_sort_newest_first_mixed_timestamp_shapes() {
        let mut docs = vec![
            doc("text", Some("2024-01-02T08:00:00Z")),
            Document {
                id: "millis".to_string(),
                // 2024-01-03T08:00:00Z
                data: json!({ "createdAt": 1_704_268_800_000i64 }),
            },
            Document {
                id: "seconds".to_string(),
                // 2024-01-01T08:00:00Z
                data: json!({ "createdAt": { "seconds": 1_704_096_000i64, "nanoseconds": 0 } }),
            },
            doc("offset", Some("2024-01-02T12:00:00+05:30")),
            doc("garbage", Some("yesterday")),
        ];
        sort_newest_first(&mut docs);
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["millis", "text", "offset", "seconds", "garbage"]);
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["prices", "shopItems", "inventory", "beverages"]);
    }
}
