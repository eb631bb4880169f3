//! Process-local document store
//!
//! Used by the `memory` backend and by the test suites. Supports injecting
//! write failures so multi-step operations can be exercised mid-sequence.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{sort_newest_first, Collection, Document, DocumentStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    ordered_fetch_unavailable: bool,
    fail_item: Option<String>,
    fail_after_writes: Option<usize>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<Collection, Vec<Document>>,
    faults: Faults,
    writes: usize,
}

impl MemoryState {
    fn docs(&self, collection: Collection) -> &[Document] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.faults.unavailable {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    /// Decide whether the next write fails. `item_names` are the item names
    /// the write touches (new body and existing document).
    fn check_write(&self, item_names: &[Option<&str>]) -> StoreResult<()> {
        self.check_read()?;
        if let Some(limit) = self.faults.fail_after_writes {
            if self.writes >= limit {
                return Err(StoreError::Unavailable(format!(
                    "write limit of {} reached",
                    limit
                )));
            }
        }
        if let Some(target) = &self.faults.fail_item {
            if item_names.iter().flatten().any(|name| name == target) {
                return Err(StoreError::Unavailable(format!(
                    "writes for {} are failing",
                    target
                )));
            }
        }
        Ok(())
    }
}

fn item_name(data: &Value) -> Option<&str> {
    data.get("itemName").and_then(Value::as_str)
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: RwLock<MemoryState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the whole store offline (reads and writes fail)
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.faults.unavailable = unavailable;
    }

    /// Make `fetch_all_ordered` report that ordering is unsupported
    pub async fn set_ordered_fetch_unavailable(&self, unavailable: bool) {
        self.state.write().await.faults.ordered_fetch_unavailable = unavailable;
    }

    /// Fail every write that touches a document for this item name
    pub async fn fail_writes_for_item(&self, item_name: impl Into<String>) {
        self.state.write().await.faults.fail_item = Some(item_name.into());
    }

    /// Allow `count` more successful writes, then fail every write
    pub async fn fail_writes_after(&self, count: usize) {
        let mut state = self.state.write().await;
        state.faults.fail_after_writes = Some(state.writes + count);
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.faults = Faults::default();
    }

    /// Number of successful writes so far
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }

    /// Insert a document under a caller-chosen id, bypassing fault injection
    pub async fn insert(&self, collection: Collection, id: impl Into<String>, data: Value) {
        let mut state = self.state.write().await;
        state
            .collections
            .entry(collection)
            .or_default()
            .push(Document {
                id: id.into(),
                data,
            });
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> StoreResult<()> {
        self.state.read().await.check_read()
    }

    async fn fetch_all(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        state.check_read()?;
        Ok(state.docs(collection).to_vec())
    }

    async fn fetch_all_ordered(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        state.check_read()?;
        if state.faults.ordered_fetch_unavailable {
            return Err(StoreError::OrderingUnavailable(collection.name()));
        }
        let mut docs = state.docs(collection).to_vec();
        sort_newest_first(&mut docs);
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        state.check_read()?;
        Ok(state.docs(collection).iter().find(|d| d.id == id).cloned())
    }

    async fn create(&self, collection: Collection, data: Value) -> StoreResult<String> {
        if !data.is_object() {
            return Err(StoreError::InvalidDocument);
        }
        let mut state = self.state.write().await;
        state.check_write(&[item_name(&data)])?;

        let id = Uuid::new_v4().to_string();
        state
            .collections
            .entry(collection)
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        state.writes += 1;
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()> {
        let Value::Object(fields) = partial else {
            return Err(StoreError::InvalidDocument);
        };
        let mut state = self.state.write().await;

        let existing_name = state
            .docs(collection)
            .iter()
            .find(|d| d.id == id)
            .and_then(|d| item_name(&d.data))
            .map(str::to_string);
        let new_name = fields.get("itemName").and_then(Value::as_str);
        state.check_write(&[existing_name.as_deref(), new_name])?;

        let doc = state
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.name(),
                id: id.to_string(),
            })?;
        if let Value::Object(body) = &mut doc.data {
            for (key, value) in fields {
                body.insert(key, value);
            }
        }
        state.writes += 1;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let existing_name = state
            .docs(collection)
            .iter()
            .find(|d| d.id == id)
            .and_then(|d| item_name(&d.data))
            .map(str::to_string);
        state.check_write(&[existing_name.as_deref()])?;

        if let Some(docs) = state.collections.get_mut(&collection) {
            docs.retain(|d| d.id != id);
        }
        state.writes += 1;
        Ok(())
    }
}
