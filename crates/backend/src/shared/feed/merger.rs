//! Сборка единого списка инвентаря из снимков нескольких коллекций.

use contracts::domain::a001_inventory_item::InventoryItem;
use std::collections::{BTreeSet, HashMap};

use crate::shared::data::collections::{schema_for_collection, CollectionSchema, INVENTORY_SCHEMAS};
use crate::shared::data::SnapshotResult;

/// Состояние слияния снимков.
///
/// Каждый снимок заменяет срез своей коллекции целиком. Список готов,
/// когда каждая коллекция хотя бы раз что-то доставила; ошибка подписки
/// считается доставкой пустого среза.
#[derive(Debug)]
pub struct SnapshotMerger {
    schemas: Vec<&'static CollectionSchema>,
    slices: HashMap<&'static str, Vec<InventoryItem>>,
    delivered: BTreeSet<&'static str>,
    failed: BTreeSet<&'static str>,
}

impl SnapshotMerger {
    /// Merger over every inventory collection
    pub fn new() -> Self {
        Self::for_schemas(INVENTORY_SCHEMAS.iter().collect())
    }

    /// Merger over a subset of collections; unknown names are ignored
    pub fn for_collections(collections: &[&str]) -> Self {
        Self::for_schemas(
            collections
                .iter()
                .filter_map(|c| schema_for_collection(c))
                .collect(),
        )
    }

    fn for_schemas(mut schemas: Vec<&'static CollectionSchema>) -> Self {
        schemas.sort_by_key(|s| s.category.ordinal());
        schemas.dedup_by_key(|s| s.collection);
        Self {
            schemas,
            slices: HashMap::new(),
            delivered: BTreeSet::new(),
            failed: BTreeSet::new(),
        }
    }

    pub fn collections(&self) -> Vec<&'static str> {
        self.schemas.iter().map(|s| s.collection).collect()
    }

    /// Применить результат подписки. Возвращает false, если коллекция
    /// не отслеживается.
    pub fn apply(&mut self, result: SnapshotResult) -> bool {
        match result {
            Ok(snapshot) => {
                let Some(schema) = self.schema(&snapshot.collection) else {
                    tracing::warn!("Snapshot for untracked collection {}", snapshot.collection);
                    return false;
                };
                let mut slice = Vec::with_capacity(snapshot.documents.len());
                for doc in &snapshot.documents {
                    match schema.to_item(doc) {
                        Ok(item) => slice.push(item),
                        Err(e) => tracing::warn!("Skipping document: {}", e),
                    }
                }
                self.slices.insert(schema.collection, slice);
                self.delivered.insert(schema.collection);
                if self.failed.remove(schema.collection) {
                    tracing::info!("Subscription for {} recovered", schema.collection);
                }
                true
            }
            Err(err) => {
                let Some(schema) = self.schema(err.collection()) else {
                    tracing::warn!("Error for untracked collection: {}", err);
                    return false;
                };
                tracing::warn!(
                    "Subscription failed, treating {} as empty: {}",
                    schema.collection,
                    err
                );
                self.slices.insert(schema.collection, Vec::new());
                self.delivered.insert(schema.collection);
                self.failed.insert(schema.collection);
                true
            }
        }
    }

    fn schema(&self, collection: &str) -> Option<&'static CollectionSchema> {
        self.schemas
            .iter()
            .copied()
            .find(|s| s.collection == collection)
    }

    pub fn is_ready(&self) -> bool {
        self.delivered.len() == self.schemas.len()
    }

    pub fn delivered(&self) -> usize {
        self.delivered.len()
    }

    pub fn expected(&self) -> usize {
        self.schemas.len()
    }

    pub fn failed_collections(&self) -> Vec<String> {
        self.failed.iter().map(|c| c.to_string()).collect()
    }

    /// Единый список в фиксированном порядке коллекций
    pub fn items(&self) -> Vec<InventoryItem> {
        self.schemas
            .iter()
            .filter_map(|s| self.slices.get(s.collection))
            .flat_map(|slice| slice.iter().cloned())
            .collect()
    }
}

impl Default for SnapshotMerger {
    fn default() -> Self {
        Self::new()
    }
}
