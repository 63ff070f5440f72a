use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, DatabaseTransaction, QueryOrder, Set, TransactionTrait};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::document_store::{
    as_object, check_expect, merge_patch, touched_collections, ChangeEvent, Document,
    DocumentStore, StoreError, WriteOp, CHANGE_CHANNEL_CAPACITY,
};

/// Row of the `documents` table: one JSON body per (collection, id)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub data: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Document {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let data: Value = serde_json::from_str(&m.data)?;
        Ok(Document::new(m.id, data))
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Document store over sqlite (sea-orm).
///
/// `commit` runs the whole batch in one transaction. Batches are applied
/// one at a time, so guards see every earlier commit. Change events go out
/// only after the transaction commits.
pub struct SqliteDocumentStore {
    conn: DatabaseConnection,
    changes: broadcast::Sender<ChangeEvent>,
    write_lock: Mutex<()>,
}

impl SqliteDocumentStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            conn,
            changes,
            write_lock: Mutex::new(()),
        }
    }

    async fn apply_op(txn: &DatabaseTransaction, op: WriteOp) -> Result<String, StoreError> {
        match op {
            WriteOp::Insert { collection, data } => {
                as_object(&data)?;
                let mut data = data;
                if let Some(map) = data.as_object_mut() {
                    map.remove("id");
                }
                let id = Uuid::new_v4().to_string();
                let now = timestamp();
                let active = ActiveModel {
                    collection: Set(collection),
                    id: Set(id.clone()),
                    data: Set(serde_json::to_string(&data)?),
                    created_at: Set(now.clone()),
                    updated_at: Set(now),
                };
                active.insert(txn).await?;
                Ok(id)
            }
            WriteOp::Update {
                collection,
                id,
                data,
            } => {
                let model = Entity::find_by_id((collection.clone(), id.clone()))
                    .one(txn)
                    .await?
                    .ok_or_else(|| StoreError::not_found(&collection, &id))?;
                let mut body: Value = serde_json::from_str(&model.data)?;
                merge_patch(&mut body, &data)?;

                let mut active: ActiveModel = model.into();
                active.data = Set(serde_json::to_string(&body)?);
                active.updated_at = Set(timestamp());
                active.update(txn).await?;
                Ok(id)
            }
            WriteOp::Delete { collection, id } => {
                let result = Entity::delete_by_id((collection.clone(), id.clone()))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(StoreError::not_found(&collection, &id));
                }
                Ok(id)
            }
            WriteOp::Expect {
                collection,
                id,
                field,
                value,
            } => {
                let model = Entity::find_by_id((collection.clone(), id.clone()))
                    .one(txn)
                    .await?
                    .ok_or_else(|| StoreError::not_found(&collection, &id))?;
                let body: Value = serde_json::from_str(&model.data)?;
                check_expect(&collection, &id, &body, &field, &value)?;
                Ok(id)
            }
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Entity::find()
            .filter(Column::Collection.eq(collection))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Expr::cust("rowid"))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Document::try_from)
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.conn)
            .await?
            .map(Document::try_from)
            .transpose()
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> Result<Vec<String>, StoreError> {
        let touched = touched_collections(&ops);
        let write = self.write_lock.lock().await;
        let txn = self.conn.begin().await?;
        let mut ids = Vec::with_capacity(ops.len());
        for op in ops {
            // Dropping the transaction on error rolls it back
            ids.push(Self::apply_op(&txn, op).await?);
        }
        txn.commit().await?;
        drop(write);

        for collection in touched {
            let _ = self.changes.send(ChangeEvent { collection });
        }
        Ok(ids)
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
