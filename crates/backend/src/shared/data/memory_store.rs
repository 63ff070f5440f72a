use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::document_store::{
    as_object, check_expect, merge_patch, touched_collections, ChangeEvent, Document,
    DocumentStore, StoreError, WriteOp, CHANGE_CHANNEL_CAPACITY,
};

/// In-process document store.
///
/// A batch is applied to a staged copy under the write lock and swapped in
/// only if every op succeeds.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Seed documents with known ids, without emitting change events
    pub async fn seed(&self, collection: &str, documents: Vec<Document>) {
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_op(
    state: &mut HashMap<String, Vec<Document>>,
    op: WriteOp,
) -> Result<String, StoreError> {
    match op {
        WriteOp::Insert { collection, data } => {
            as_object(&data)?;
            let mut data = data;
            if let Some(map) = data.as_object_mut() {
                map.remove("id");
            }
            let id = Uuid::new_v4().to_string();
            state
                .entry(collection)
                .or_default()
                .push(Document::new(id.clone(), data));
            Ok(id)
        }
        WriteOp::Update {
            collection,
            id,
            data,
        } => {
            let doc = state
                .get_mut(&collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::not_found(&collection, &id))?;
            merge_patch(&mut doc.data, &data)?;
            Ok(id)
        }
        WriteOp::Delete { collection, id } => {
            let docs = state
                .get_mut(&collection)
                .ok_or_else(|| StoreError::not_found(&collection, &id))?;
            let position = docs
                .iter()
                .position(|d| d.id == id)
                .ok_or_else(|| StoreError::not_found(&collection, &id))?;
            docs.remove(position);
            Ok(id)
        }
        WriteOp::Expect {
            collection,
            id,
            field,
            value,
        } => {
            let doc = state
                .get(&collection)
                .and_then(|docs| docs.iter().find(|d| d.id == id))
                .ok_or_else(|| StoreError::not_found(&collection, &id))?;
            check_expect(&collection, &id, &doc.data, &field, &value)?;
            Ok(id)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> Result<Vec<String>, StoreError> {
        let touched = touched_collections(&ops);
        let mut guard = self.collections.write().await;
        let mut staged = guard.clone();
        let mut ids = Vec::with_capacity(ops.len());
        for op in ops {
            ids.push(apply_op(&mut staged, op)?);
        }
        *guard = staged;
        drop(guard);

        for collection in touched {
            // No receivers is fine: nobody is subscribed yet
            let _ = self.changes.send(ChangeEvent { collection });
        }
        Ok(ids)
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
pub fn doc(id: &str, data: Value) -> Document {
    Document::new(id, data)
}
