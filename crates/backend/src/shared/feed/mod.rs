//! Inventory feed: live, merged view of every inventory collection.
//!
//! One subscription task per collection sends snapshots into a single
//! merge task; the merge task publishes `FeedState` through a watch
//! channel. Readers either take the current state or wait for the
//! loading gate.

pub mod merger;

use contracts::domain::a001_inventory_item::InventoryItem;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::shared::data::collections::INVENTORY_SCHEMAS;
use crate::shared::data::{subscribe, DocumentStore, SnapshotResult, Subscription};
pub use merger::SnapshotMerger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    pub phase: FeedPhase,
    pub items: Arc<Vec<InventoryItem>>,
    pub delivered: usize,
    pub expected: usize,
    pub failed_collections: Vec<String>,
    /// Растет на каждом примененном снимке
    pub version: u64,
}

impl FeedState {
    fn loading(expected: usize) -> Self {
        Self {
            phase: FeedPhase::Loading,
            items: Arc::new(Vec::new()),
            delivered: 0,
            expected,
            failed_collections: Vec::new(),
            version: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == FeedPhase::Ready
    }
}

#[derive(Debug, Error)]
#[error("Inventory is still loading ({delivered}/{expected} collections)")]
pub struct FeedNotReady {
    pub delivered: usize,
    pub expected: usize,
}

pub struct InventoryFeed {
    state: watch::Receiver<FeedState>,
    subscriptions: Vec<Subscription>,
    merge_task: JoinHandle<()>,
}

impl InventoryFeed {
    /// Subscribe to every inventory collection
    pub fn start(store: Arc<dyn DocumentStore>) -> Self {
        let collections: Vec<&str> = INVENTORY_SCHEMAS.iter().map(|s| s.collection).collect();
        Self::start_with(store, &collections)
    }

    pub fn start_with(store: Arc<dyn DocumentStore>, collections: &[&str]) -> Self {
        let merger = SnapshotMerger::for_collections(collections);
        let collections = merger.collections();
        let (state_tx, state_rx) = watch::channel(FeedState::loading(merger.expected()));
        let (tx, rx) = mpsc::channel::<SnapshotResult>(64);

        tracing::info!(
            "Starting inventory feed over {} collections ({} store)",
            collections.len(),
            store.backend_name()
        );
        let subscriptions = collections
            .iter()
            .map(|c| subscribe(store.clone(), c, tx.clone()))
            .collect();
        drop(tx);

        let merge_task = tokio::spawn(run_merge(merger, rx, state_tx));
        Self {
            state: state_rx,
            subscriptions,
            merge_task,
        }
    }

    pub fn current(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Ждать открытия loading gate не дольше `timeout`
    pub async fn wait_ready(&self, timeout: Duration) -> Result<FeedState, FeedNotReady> {
        let mut rx = self.state.clone();
        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(FeedState::is_ready).await.map(|s| s.clone())
        })
        .await;
        match waited {
            Ok(Ok(state)) => Ok(state),
            _ => {
                let state = self.current();
                Err(FeedNotReady {
                    delivered: state.delivered,
                    expected: state.expected,
                })
            }
        }
    }

    /// Остановить все подписки и задачу слияния
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
        self.merge_task.abort();
    }
}

impl Drop for InventoryFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_merge(
    mut merger: SnapshotMerger,
    mut rx: mpsc::Receiver<SnapshotResult>,
    state_tx: watch::Sender<FeedState>,
) {
    let mut version = 0u64;
    while let Some(result) = rx.recv().await {
        let was_ready = merger.is_ready();
        if !merger.apply(result) {
            continue;
        }
        version += 1;
        let state = FeedState {
            phase: if merger.is_ready() {
                FeedPhase::Ready
            } else {
                FeedPhase::Loading
            },
            items: Arc::new(merger.items()),
            delivered: merger.delivered(),
            expected: merger.expected(),
            failed_collections: merger.failed_collections(),
            version,
        };
        if !was_ready && state.is_ready() {
            tracing::info!(
                "Inventory feed ready: {} items, failed collections: {:?}",
                state.items.len(),
                state.failed_collections
            );
        }
        state_tx.send_replace(state);
    }
    tracing::debug!("Inventory feed merge task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::collections::{FOOD_ITEMS, LAPTOPS, MEDICATIONS};
    use crate::shared::data::{
        ChangeEvent, Document, MemoryDocumentStore, StoreError, WriteOp,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::{broadcast, Notify};

    /// Store wrapper: one collection always fails, one waits for a gate
    struct FlakyStore {
        inner: MemoryDocumentStore,
        failing: &'static str,
        gated: &'static str,
        gate: Notify,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
            if collection == self.failing {
                return Err(StoreError::Unavailable("permission denied".into()));
            }
            if collection == self.gated {
                self.gate.notified().await;
            }
            self.inner.list(collection).await
        }

        async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn commit(&self, ops: Vec<WriteOp>) -> Result<Vec<String>, StoreError> {
            self.inner.commit(ops).await
        }

        fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
            self.inner.changes()
        }

        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_loading_gate_waits_for_slow_collection() {
        let inner = MemoryDocumentStore::new();
        inner
            .seed(LAPTOPS, vec![Document::new("l1", json!({"model": "X1", "qty": 5}))])
            .await;
        inner
            .seed(FOOD_ITEMS, vec![Document::new("f1", json!({"name": "Rice", "quantity": 30}))])
            .await;
        let store = Arc::new(FlakyStore {
            inner,
            failing: MEDICATIONS,
            gated: FOOD_ITEMS,
            gate: Notify::new(),
        });

        let feed = InventoryFeed::start_with(store.clone(), &[LAPTOPS, FOOD_ITEMS, MEDICATIONS]);

        let mut rx = feed.watch();
        let partial = tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| s.delivered == 2),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(partial.phase, FeedPhase::Loading);
        assert_eq!(partial.items.len(), 1);
        assert_eq!(partial.items[0].name, "X1");
        assert_eq!(partial.failed_collections, vec![MEDICATIONS.to_string()]);
        assert!(feed.wait_ready(Duration::from_millis(50)).await.is_err());

        store.gate.notify_one();
        let ready = feed.wait_ready(Duration::from_secs(2)).await.unwrap();
        let names: Vec<_> = ready.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["X1", "Rice"]);

        feed.shutdown();
    }

    #[tokio::test]
    async fn test_feed_follows_store_changes() {
        let store = Arc::new(MemoryDocumentStore::new());
        let feed = InventoryFeed::start(store.clone());
        let ready = feed.wait_ready(Duration::from_secs(2)).await.unwrap();
        assert!(ready.items.is_empty());

        store
            .insert(FOOD_ITEMS, json!({"name": "Rice", "quantity": 3}))
            .await
            .unwrap();
        let mut rx = feed.watch();
        let filled = rx.wait_for(|s| !s.items.is_empty());
        let state = tokio::time::timeout(Duration::from_secs(2), filled)
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(state.items[0].quantity, 3);
    }
}
