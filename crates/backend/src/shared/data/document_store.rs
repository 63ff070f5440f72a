//! Document database abstraction.
//!
//! The service treats storage as a set of named collections of JSON
//! documents with store-assigned ids, plus a change feed. Every write goes
//! through `commit`, which applies a batch atomically.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the change broadcast; slow subscribers re-read on lag
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Store is unavailable: {0}")]
    Unavailable(String),

    #[error("Document {collection}/{id} changed: '{field}' is no longer {expected}")]
    PreconditionFailed {
        collection: String,
        id: String,
        field: String,
        expected: Value,
    },
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// A stored document: id plus a JSON object body (the id is not part of the body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }

    /// Decode into a camelCase aggregate, injecting the document id as `id`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut body = self.data.clone();
        match body.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), Value::String(self.id.clone()));
            }
            None => {
                return Err(StoreError::InvalidDocument(format!(
                    "document {} is not an object",
                    self.id
                )))
            }
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// Serialize an aggregate into a document body, dropping its `id` field
pub fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    let mut body = serde_json::to_value(value)?;
    match body.as_object_mut() {
        Some(map) => {
            map.remove("id");
        }
        None => {
            return Err(StoreError::InvalidDocument(
                "aggregate did not serialize to an object".into(),
            ))
        }
    }
    Ok(body)
}

/// Shallow merge of `patch` into `target` (both must be objects)
pub fn merge_patch(target: &mut Value, patch: &Value) -> Result<(), StoreError> {
    let patch = as_object(patch)?;
    let target = target
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("stored body is not an object".into()))?;
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

pub fn as_object(value: &Value) -> Result<&Map<String, Value>, StoreError> {
    value
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("document body must be a JSON object".into()))
}

/// One write in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert { collection: String, data: Value },
    /// Shallow merge of `data` into the existing body
    Update {
        collection: String,
        id: String,
        data: Value,
    },
    Delete { collection: String, id: String },
    /// Guard: the batch fails unless the stored field still equals `value`
    /// (a missing field equals `null`). Writes nothing.
    Expect {
        collection: String,
        id: String,
        field: String,
        value: Value,
    },
}

impl WriteOp {
    pub fn insert(collection: &str, data: Value) -> Self {
        WriteOp::Insert {
            collection: collection.to_string(),
            data,
        }
    }

    pub fn update(collection: &str, id: &str, data: Value) -> Self {
        WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        }
    }

    pub fn delete(collection: &str, id: &str) -> Self {
        WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn expect(collection: &str, id: &str, field: &str, value: Value) -> Self {
        WriteOp::Expect {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            value,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Insert { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. }
            | WriteOp::Expect { collection, .. } => collection,
        }
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, WriteOp::Expect { .. })
    }
}

/// Проверка guard-операции против текущего тела документа
pub fn check_expect(
    collection: &str,
    id: &str,
    body: &Value,
    field: &str,
    value: &Value,
) -> Result<(), StoreError> {
    let stored = body.get(field).unwrap_or(&Value::Null);
    if stored == value {
        Ok(())
    } else {
        Err(StoreError::PreconditionFailed {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            expected: value.clone(),
        })
    }
}

/// Emitted once per touched collection after a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
}

/// Collections written by a batch, in first-touch order, without repeats.
/// Guards do not count as writes.
pub fn touched_collections(ops: &[WriteOp]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for op in ops.iter().filter(|op| !op.is_guard()) {
        if !out.iter().any(|c| c == op.collection()) {
            out.push(op.collection().to_string());
        }
    }
    out
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection in insertion order
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Apply every op or none. Returns the affected id per op
    /// (the generated id for inserts). Guards are checked against the
    /// state the batch sees, so a failed guard aborts the whole batch with
    /// `StoreError::PreconditionFailed`.
    async fn commit(&self, ops: Vec<WriteOp>) -> Result<Vec<String>, StoreError>;

    /// Change feed; a receiver created before a commit sees its events
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;

    fn backend_name(&self) -> &'static str;

    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let ids = self.commit(vec![WriteOp::insert(collection, data)]).await?;
        ids.into_iter()
            .next()
            .ok_or_else(|| StoreError::Unavailable("commit returned no id".into()))
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.commit(vec![WriteOp::update(collection, id, data)])
            .await
            .map(|_| ())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.commit(vec![WriteOp::delete(collection, id)])
            .await
            .map(|_| ())
    }
}
