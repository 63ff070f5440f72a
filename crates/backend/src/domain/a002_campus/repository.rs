use contracts::domain::a002_campus::Campus;

use crate::shared::data::collections::CAMPUSES;
use crate::shared::data::document_store::encode;
use crate::shared::data::{DocumentStore, StoreError};

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Campus>, StoreError> {
    let docs = store.list(CAMPUSES).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode::<Campus>() {
            Ok(campus) => Some(campus),
            Err(e) => {
                tracing::warn!("Skipping campus {}: {}", doc.id, e);
                None
            }
        })
        .collect())
}

pub async fn get(store: &dyn DocumentStore, id: &str) -> Result<Option<Campus>, StoreError> {
    store
        .get(CAMPUSES, id)
        .await?
        .map(|doc| doc.decode())
        .transpose()
}

pub async fn insert(store: &dyn DocumentStore, campus: &Campus) -> Result<String, StoreError> {
    store.insert(CAMPUSES, encode(campus)?).await
}
