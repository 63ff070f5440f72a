use contracts::domain::a004_laptop_submission::LaptopSubmission;

use crate::shared::data::collections::LAPTOP_SUBMISSIONS;
use crate::shared::data::document_store::encode;
use crate::shared::data::{DocumentStore, StoreError, WriteOp};

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<LaptopSubmission>, StoreError> {
    let docs = store.list(LAPTOP_SUBMISSIONS).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode::<LaptopSubmission>() {
            Ok(submission) => Some(submission),
            Err(e) => {
                tracing::warn!("Skipping laptop submission {}: {}", doc.id, e);
                None
            }
        })
        .collect())
}

pub async fn get(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<LaptopSubmission>, StoreError> {
    store
        .get(LAPTOP_SUBMISSIONS, id)
        .await?
        .map(|doc| doc.decode())
        .transpose()
}

pub async fn insert(
    store: &dyn DocumentStore,
    submission: &LaptopSubmission,
) -> Result<String, StoreError> {
    store.insert(LAPTOP_SUBMISSIONS, encode(submission)?).await
}

pub fn delete_op(id: &str) -> WriteOp {
    WriteOp::delete(LAPTOP_SUBMISSIONS, id)
}
