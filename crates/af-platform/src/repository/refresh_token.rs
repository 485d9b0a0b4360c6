//! Refresh Token Store
//!
//! Port for refresh-token persistence. Writes are staged by `upsert` and
//! `delete` and only become durable at `commit` — the unit-of-work
//! boundary. The record is keyed by user id, so the at-most-one-live-token
//! invariant holds at the storage level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::{Collection, Database, IndexModel};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::RefreshTokenRecord;
use crate::error::Result;

/// A staged write, applied at commit time.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite {
    Upsert(RefreshTokenRecord),
    Delete { user_id: String },
}

/// Persistence port for refresh tokens, as consumed by the orchestrator.
///
/// Reads do not observe staged writes; the orchestrator stages at most one
/// write per flow and commits before returning.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Exact, case-sensitive match on the token value.
    async fn find_by_token(&self, code: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Stage a create-or-replace keyed by user id.
    async fn upsert(&self, user_id: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Stage removal of the record.
    async fn delete(&self, record: &RefreshTokenRecord) -> Result<()>;

    /// Flush all staged writes.
    async fn commit(&self) -> Result<()>;
}

/// MongoDB-backed store, one document per user in `refresh_tokens`.
pub struct MongoRefreshTokenStore {
    collection: Collection<RefreshTokenRecord>,
    pending: Mutex<Vec<PendingWrite>>,
}

impl MongoRefreshTokenStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("refresh_tokens"),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Unique index on the token value; `_id` (user id) is unique already.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(
                mongodb::options::IndexOptions::builder()
                    .unique(true)
                    .build(),
            )
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    fn stage(&self, write: PendingWrite) {
        self.pending
            .lock()
            .expect("refresh token write buffer poisoned")
            .push(write);
    }
}

#[async_trait]
impl RefreshTokenStore for MongoRefreshTokenStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.collection.find_one(doc! { "_id": user_id }).await?)
    }

    async fn find_by_token(&self, code: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.collection.find_one(doc! { "code": code }).await?)
    }

    async fn upsert(&self, user_id: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.stage(PendingWrite::Upsert(RefreshTokenRecord::new(
            user_id, code, expires_at,
        )));
        Ok(())
    }

    async fn delete(&self, record: &RefreshTokenRecord) -> Result<()> {
        self.stage(PendingWrite::Delete {
            user_id: record.user_id.clone(),
        });
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let writes: Vec<PendingWrite> = {
            let mut pending = self
                .pending
                .lock()
                .expect("refresh token write buffer poisoned");
            pending.drain(..).collect()
        };

        for write in writes {
            match write {
                PendingWrite::Upsert(record) => {
                    debug!(user_id = %record.user_id, "Upserting refresh token");
                    self.collection
                        .replace_one(doc! { "_id": &record.user_id }, &record)
                        .upsert(true)
                        .await?;
                }
                PendingWrite::Delete { user_id } => {
                    debug!(user_id = %user_id, "Deleting refresh token");
                    self.collection.delete_one(doc! { "_id": &user_id }).await?;
                }
            }
        }
        Ok(())
    }
}
