use contracts::domain::a001_inventory_item::InventoryItem;
use contracts::enums::InventoryCategory;
use serde_json::Value;

use crate::shared::data::collections::{schema_for_category, CollectionSchema};
use crate::shared::data::{Document, DocumentStore, StoreError, WriteOp};

/// Позиция вместе с guard на остаток, прочитанный из того же документа.
/// Guard кладется в commit перед записью нового остатка.
#[derive(Debug, Clone)]
pub struct StockRead {
    pub item: InventoryItem,
    pub guard: WriteOp,
}

fn stock_read(schema: &CollectionSchema, doc: &Document) -> Result<StockRead, StoreError> {
    let item = schema.to_item(doc)?;
    let stored = doc.data.get(schema.fields.quantity).cloned().unwrap_or(Value::Null);
    Ok(StockRead {
        item,
        guard: WriteOp::expect(schema.collection, &doc.id, schema.fields.quantity, stored),
    })
}

/// Прямое чтение категории из хранилища (минуя feed)
pub async fn list(
    store: &dyn DocumentStore,
    category: InventoryCategory,
) -> Result<Vec<InventoryItem>, StoreError> {
    Ok(list_for_update(store, category)
        .await?
        .into_iter()
        .map(|read| read.item)
        .collect())
}

pub async fn list_for_update(
    store: &dyn DocumentStore,
    category: InventoryCategory,
) -> Result<Vec<StockRead>, StoreError> {
    let schema = schema_for_category(category);
    let docs = store.list(schema.collection).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match stock_read(schema, doc) {
            Ok(read) => Some(read),
            Err(e) => {
                tracing::warn!("Skipping document: {}", e);
                None
            }
        })
        .collect())
}

pub async fn get_for_update(
    store: &dyn DocumentStore,
    category: InventoryCategory,
    id: &str,
) -> Result<Option<StockRead>, StoreError> {
    let schema = schema_for_category(category);
    store
        .get(schema.collection, id)
        .await?
        .map(|doc| stock_read(schema, &doc))
        .transpose()
}

pub async fn get(
    store: &dyn DocumentStore,
    category: InventoryCategory,
    id: &str,
) -> Result<Option<InventoryItem>, StoreError> {
    let schema = schema_for_category(category);
    store
        .get(schema.collection, id)
        .await?
        .map(|doc| schema.to_item(&doc))
        .transpose()
}

pub async fn insert(store: &dyn DocumentStore, item: &InventoryItem) -> Result<String, StoreError> {
    let schema = schema_for_category(item.category);
    store.insert(schema.collection, schema.to_body(item)).await
}

pub async fn update(store: &dyn DocumentStore, item: &InventoryItem) -> Result<(), StoreError> {
    let schema = schema_for_category(item.category);
    store
        .update(schema.collection, &item.id, schema.to_body(item))
        .await
}

pub async fn delete(
    store: &dyn DocumentStore,
    category: InventoryCategory,
    id: &str,
) -> Result<(), StoreError> {
    store.delete(schema_for_category(category).collection, id).await
}

/// Операция записи остатка для пакетного commit
pub fn quantity_update_op(item: &InventoryItem) -> WriteOp {
    let schema = schema_for_category(item.category);
    let updated_at = item.updated_at.unwrap_or_else(chrono::Utc::now);
    WriteOp::update(
        schema.collection,
        &item.id,
        schema.quantity_patch(item.quantity, updated_at),
    )
}
