//! In-memory share token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::share::model::ShareTokenEntry;
use crate::share::repo::{ShareStoreError, ShareTokenRepo};

/// Share token repository backed by a process-local map.
///
/// Used by tests and by deployments that accept losing share links on
/// restart. Rows are appended per document just like the Postgres
/// repository appends rows per document.
#[derive(Default)]
pub struct MemoryShareTokenRepo {
    rows: DashMap<Uuid, Vec<ShareTokenEntry>>,
}

impl MemoryShareTokenRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareTokenRepo for MemoryShareTokenRepo {
    async fn latest_for_document(
        &self,
        document_id: Uuid,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
        let latest = self.rows.get(&document_id).and_then(|rows| {
            rows.iter().max_by_key(|entry| entry.created_at).cloned()
        });
        Ok(latest)
    }

    async fn insert(&self, entry: &ShareTokenEntry) -> Result<(), ShareStoreError> {
        self.rows
            .entry(entry.document_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        document_id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
        let found = self.rows.get(&document_id).and_then(|rows| {
            rows.iter()
                .find(|entry| entry.token == token && entry.expires_at > now)
                .cloned()
        });
        Ok(found)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ShareStoreError> {
        let mut purged = 0;

        self.rows.retain(|_, rows| {
            let before = rows.len();
            rows.retain(|entry| entry.expires_at > now);
            purged += (before - rows.len()) as u64;
            !rows.is_empty()
        });

        Ok(purged)
    }
}
