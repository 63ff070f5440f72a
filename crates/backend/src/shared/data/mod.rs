pub mod collections;
pub mod db;
pub mod document_store;
pub mod memory_store;
pub mod sqlite_store;
pub mod subscription;

pub use document_store::{ChangeEvent, Document, DocumentStore, StoreError, WriteOp};
pub use memory_store::MemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
pub use subscription::{subscribe, Snapshot, SnapshotResult, Subscription, SubscriptionError};
