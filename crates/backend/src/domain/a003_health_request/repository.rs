use contracts::domain::a003_health_request::{HealthRequest, RequestStatus};

use crate::shared::data::collections::HEALTH_REQUESTS;
use crate::shared::data::document_store::encode;
use crate::shared::data::{DocumentStore, StoreError, WriteOp};

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<HealthRequest>, StoreError> {
    let docs = store.list(HEALTH_REQUESTS).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode::<HealthRequest>() {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::warn!("Skipping health request {}: {}", doc.id, e);
                None
            }
        })
        .collect())
}

pub async fn get(store: &dyn DocumentStore, id: &str) -> Result<Option<HealthRequest>, StoreError> {
    store
        .get(HEALTH_REQUESTS, id)
        .await?
        .map(|doc| doc.decode())
        .transpose()
}

pub async fn insert(
    store: &dyn DocumentStore,
    request: &HealthRequest,
) -> Result<String, StoreError> {
    store.insert(HEALTH_REQUESTS, encode(request)?).await
}

/// Запись решения по заявке (для пакетного commit)
pub fn decision_op(request: &HealthRequest) -> Result<WriteOp, StoreError> {
    Ok(WriteOp::update(HEALTH_REQUESTS, &request.id, encode(request)?))
}

/// Guard: решение записывается, только пока заявка еще pending
pub fn pending_guard(id: &str) -> WriteOp {
    WriteOp::expect(
        HEALTH_REQUESTS,
        id,
        "status",
        serde_json::Value::from(RequestStatus::Pending.code()),
    )
}
