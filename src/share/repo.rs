//! Storage seam for share tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::share::model::ShareTokenEntry;

/// Errors from the durable share token store.
#[derive(Debug, Error)]
pub enum ShareStoreError {
    /// The underlying database rejected or failed the query.
    #[error("share token query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying embedded migrations failed.
    #[error("share token migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The store did not answer within the configured deadline.
    #[error("share token store timed out")]
    Timeout,
}

/// Durable storage behind the [`ShareTokenRegistry`](crate::share::ShareTokenRegistry).
///
/// Implementations never update rows in place: new tokens are appended and
/// stale rows purged. All expiry comparisons use the `now` the registry
/// passes in, so store and registry can never disagree about the time.
#[async_trait]
pub trait ShareTokenRepo: Send + Sync {
    /// Returns the most recently created entry for `document_id`, whether or
    /// not it has expired.
    async fn latest_for_document(
        &self,
        document_id: Uuid,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError>;

    /// Appends a freshly minted entry.
    async fn insert(&self, entry: &ShareTokenEntry) -> Result<(), ShareStoreError>;

    /// Returns an entry matching the exact `(document_id, token)` pair whose
    /// expiry lies after `now`, if one exists.
    async fn find_valid(
        &self,
        document_id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError>;

    /// Deletes every row whose expiry is at or before `now`; returns how many
    /// rows went away.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ShareStoreError>;
}
