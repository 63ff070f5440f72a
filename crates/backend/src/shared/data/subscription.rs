//! Live snapshots of one collection.
//!
//! A subscription delivers the full document list once on start and again
//! after every change to its collection. Each delivery is a complete
//! snapshot, never a delta.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::document_store::{Document, DocumentStore};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Error)]
pub enum SubscriptionError {
    #[error("Failed to read collection {collection}: {message}")]
    Read { collection: String, message: String },

    #[error("Change feed closed for collection {collection}")]
    Closed { collection: String },
}

impl SubscriptionError {
    pub fn collection(&self) -> &str {
        match self {
            SubscriptionError::Read { collection, .. }
            | SubscriptionError::Closed { collection } => collection,
        }
    }
}

pub type SnapshotResult = Result<Snapshot, SubscriptionError>;

/// Handle of a running subscription. Dropping it stops delivery.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop aborts the task
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a subscription that sends snapshots of `collection` into `tx`.
pub fn subscribe(
    store: Arc<dyn DocumentStore>,
    collection: &str,
    tx: mpsc::Sender<SnapshotResult>,
) -> Subscription {
    let name = collection.to_string();
    // Receiver is created before the first read so no commit falls between
    let changes = store.changes();
    let handle = tokio::spawn(run_subscription(store, name, changes, tx));
    Subscription { handle }
}

async fn run_subscription(
    store: Arc<dyn DocumentStore>,
    collection: String,
    mut changes: tokio::sync::broadcast::Receiver<super::ChangeEvent>,
    tx: mpsc::Sender<SnapshotResult>,
) {
    loop {
        let result = match store.list(&collection).await {
            Ok(documents) => Ok(Snapshot {
                collection: collection.clone(),
                documents,
            }),
            Err(e) => {
                tracing::warn!("Subscription read failed for {}: {}", collection, e);
                Err(SubscriptionError::Read {
                    collection: collection.clone(),
                    message: e.to_string(),
                })
            }
        };
        if tx.send(result).await.is_err() {
            tracing::debug!("Subscription receiver for {} is gone", collection);
            return;
        }

        loop {
            match changes.recv().await {
                Ok(event) if event.collection == collection => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        "Subscription for {} lagged by {} events, re-reading",
                        collection,
                        skipped
                    );
                    break;
                }
                Err(RecvError::Closed) => {
                    let _ = tx
                        .send(Err(SubscriptionError::Closed {
                            collection: collection.clone(),
                        }))
                        .await;
                    return;
                }
            }
        }
    }
}
