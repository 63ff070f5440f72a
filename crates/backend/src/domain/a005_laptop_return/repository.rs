use contracts::domain::a005_laptop_return::LaptopReturn;

use crate::shared::data::collections::LAPTOP_RETURNS;
use crate::shared::data::document_store::encode;
use crate::shared::data::{DocumentStore, StoreError, WriteOp};

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<LaptopReturn>, StoreError> {
    let docs = store.list(LAPTOP_RETURNS).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode::<LaptopReturn>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping laptop return {}: {}", doc.id, e);
                None
            }
        })
        .collect())
}

pub fn insert_op(record: &LaptopReturn) -> Result<WriteOp, StoreError> {
    Ok(WriteOp::insert(LAPTOP_RETURNS, encode(record)?))
}
