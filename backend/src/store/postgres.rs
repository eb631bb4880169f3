//! PostgreSQL-backed document store
//!
//! One `documents` table keyed by (collection, id) with a JSONB body.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{sort_newest_first, Collection, Document, DocumentStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn to_documents(rows: Vec<(String, Value)>) -> Vec<Document> {
        rows.into_iter()
            .map(|(id, data)| Document { id, data })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn fetch_all(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1
            ORDER BY inserted_at
            "#,
        )
        .bind(collection.name())
        .fetch_all(&self.db)
        .await?;

        Ok(Self::to_documents(rows))
    }

    async fn fetch_all_ordered(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        // createdAt may be a string, epoch millis or a {seconds} object, so
        // SQL only supplies the insertion tiebreak and the stable sort does the rest
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY inserted_at",
        )
        .bind(collection.name())
        .fetch_all(&self.db)
        .await?;

        let mut docs = Self::to_documents(rows);
        sort_newest_first(&mut docs);
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, (String, Value)>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, data)| Document { id, data }))
    }

    async fn create(&self, collection: Collection, data: Value) -> StoreResult<String> {
        if !data.is_object() {
            return Err(StoreError::InvalidDocument);
        }
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection.name())
            .bind(&id)
            .bind(&data)
            .execute(&self.db)
            .await?;

        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()> {
        if !partial.is_object() {
            return Err(StoreError::InvalidDocument);
        }

        // jsonb || jsonb replaces top-level keys, which is the shallow merge we want
        let result = sqlx::query(
            r#"
            UPDATE documents SET data = data || $3
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(&partial)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.name(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
