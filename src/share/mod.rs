//! Durable share tokens granting read-only access to a document.
//!
//! Unlike verification codes, share tokens are capabilities: they are never
//! consumed by use and stay valid for repeated access until expiry. The
//! registry keeps one authoritative token per document and hands the same
//! string back for every request inside the validity window, so links
//! already sent around keep working.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, instrument};
use uuid::Uuid;

use markpad_config::ShareConfig;
use markpad_core::{Clock, generate};

use crate::metrics;

pub mod memory;
pub mod model;
pub mod postgres;
pub mod repo;

pub use memory::MemoryShareTokenRepo;
pub use model::ShareTokenEntry;
pub use postgres::PgShareTokenRepo;
pub use repo::{ShareStoreError, ShareTokenRepo};

const LOCK_SHARDS: usize = 16;

/// Hands out and checks share tokens, one current token per document.
///
/// Every mint for a document runs under one of a fixed set of key-sharded
/// async locks, so two racing `get_or_create` calls for the same document
/// serialize instead of both minting. Unrelated documents almost always land
/// on different shards and proceed in parallel.
///
/// Calls into the backing repository carry a deadline; a store that does not
/// answer in time surfaces as [`ShareStoreError::Timeout`] rather than as a
/// denied token.
pub struct ShareTokenRegistry {
    repo: Arc<dyn ShareTokenRepo>,
    locks: Vec<Mutex<()>>,
    ttl: Duration,
    store_timeout: std::time::Duration,
    clock: Arc<dyn Clock>,
}

impl ShareTokenRegistry {
    pub fn new(config: &ShareConfig, repo: Arc<dyn ShareTokenRepo>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            locks: (0..LOCK_SHARDS).map(|_| Mutex::new(())).collect(),
            ttl: Duration::seconds(config.token_ttl_secs),
            store_timeout: config.store_timeout(),
            clock,
        }
    }

    fn lock_for(&self, document_id: Uuid) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        document_id.hash(&mut hasher);
        &self.locks[(hasher.finish() as usize) % self.locks.len()]
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, ShareStoreError>>,
    ) -> Result<T, ShareStoreError> {
        match timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                metrics::track_share_store_timeout();
                Err(ShareStoreError::Timeout)
            }
        }
    }

    /// Returns the document's current share token, minting one only when no
    /// unexpired token exists.
    ///
    /// Repeated calls inside the validity window return the identical string;
    /// a new token appears only once the previous one has expired.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, document_id: Uuid) -> Result<String, ShareStoreError> {
        let _guard = self.lock_for(document_id).lock().await;
        let now = self.clock.now();

        if let Some(existing) = self.call(self.repo.latest_for_document(document_id)).await? {
            if existing.expires_at > now {
                metrics::track_share_token_reused();
                return Ok(existing.token);
            }
        }

        let entry = ShareTokenEntry {
            document_id,
            token: generate::share_token(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.call(self.repo.insert(&entry)).await?;

        debug!(document.id = %document_id, "minted share token");
        metrics::track_share_token_minted();

        Ok(entry.token)
    }

    /// True iff `token` is exactly the stored token for `document_id` and has
    /// not expired.
    ///
    /// Read-only, so it takes no shard lock. A token for a different document
    /// never resolves, even if the string happens to match.
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, document_id: Uuid, token: &str) -> Result<bool, ShareStoreError> {
        let now = self.clock.now();

        let found = self
            .call(self.repo.find_valid(document_id, token, now))
            .await?
            .is_some();

        metrics::track_share_resolution(found);
        Ok(found)
    }

    /// Deletes expired rows from the backing store; returns how many went
    /// away. Resolution already ignores expired rows, so this is purely about
    /// keeping the table from growing without bound.
    pub async fn purge_expired(&self) -> Result<u64, ShareStoreError> {
        let now = self.clock.now();
        let purged = self.call(self.repo.purge_expired(now)).await?;

        if purged > 0 {
            debug!(purged, "purged expired share tokens");
        }
        metrics::track_shares_purged(purged);
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use markpad_core::ManualClock;

    fn registry_with_clock(timeout_secs: u64) -> (ShareTokenRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let config = ShareConfig {
            token_ttl_secs: 604800,
            store_timeout_secs: timeout_secs,
        };
        let registry = ShareTokenRegistry::new(
            &config,
            Arc::new(MemoryShareTokenRepo::new()),
            clock.clone(),
        );
        (registry, clock)
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent_while_valid() {
        let (registry, _clock) = registry_with_clock(5);
        let doc = Uuid::new_v4();

        let first = registry.get_or_create(doc).await.unwrap();
        let second = registry.get_or_create(doc).await.unwrap();
        let third = registry.get_or_create(doc).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_new_token_after_expiry() {
        let (registry, clock) = registry_with_clock(5);
        let doc = Uuid::new_v4();

        let first = registry.get_or_create(doc).await.unwrap();
        clock.advance(Duration::days(7) + Duration::seconds(1));
        let second = registry.get_or_create(doc).await.unwrap();

        assert_ne!(first, second);
        assert!(!registry.resolve(doc, &first).await.unwrap());
        assert!(registry.resolve(doc, &second).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_requires_exact_pair() {
        let (registry, _clock) = registry_with_clock(5);
        let doc = Uuid::new_v4();
        let other_doc = Uuid::new_v4();

        let token = registry.get_or_create(doc).await.unwrap();

        assert!(registry.resolve(doc, &token).await.unwrap());
        assert!(!registry.resolve(other_doc, &token).await.unwrap());
        assert!(!registry.resolve(doc, "0000000000000000").await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_false_after_expiry() {
        let (registry, clock) = registry_with_clock(5);
        let doc = Uuid::new_v4();

        let token = registry.get_or_create(doc).await.unwrap();
        clock.advance(Duration::days(7));

        assert!(!registry.resolve(doc, &token).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_create_mints_single_token() {
        let (registry, _clock) = registry_with_clock(5);
        let registry = Arc::new(registry);
        let doc = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(
                async move { registry.get_or_create(doc).await },
            ));
        }

        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap());
        }

        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_drops_only_expired_rows() {
        let (registry, clock) = registry_with_clock(5);
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();

        registry.get_or_create(doc_a).await.unwrap();
        registry.get_or_create(doc_b).await.unwrap();

        clock.advance(Duration::days(7) + Duration::seconds(1));
        let fresh = registry.get_or_create(doc_a).await.unwrap();

        assert_eq!(registry.purge_expired().await.unwrap(), 2);
        assert!(registry.resolve(doc_a, &fresh).await.unwrap());
        assert_eq!(registry.purge_expired().await.unwrap(), 0);
    }

    struct PendingRepo;

    #[async_trait]
    impl ShareTokenRepo for PendingRepo {
        async fn latest_for_document(
            &self,
            _document_id: Uuid,
        ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
            std::future::pending().await
        }

        async fn insert(&self, _entry: &ShareTokenEntry) -> Result<(), ShareStoreError> {
            std::future::pending().await
        }

        async fn find_valid(
            &self,
            _document_id: Uuid,
            _token: &str,
            _now: DateTime<Utc>,
        ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
            std::future::pending().await
        }

        async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, ShareStoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_unresponsive_store_times_out() {
        let clock = Arc::new(ManualClock::default());
        let config = ShareConfig {
            token_ttl_secs: 604800,
            store_timeout_secs: 0,
        };
        let registry = ShareTokenRegistry::new(&config, Arc::new(PendingRepo), clock);

        let minted = registry.get_or_create(Uuid::new_v4()).await;
        assert!(matches!(minted, Err(ShareStoreError::Timeout)));

        let resolved = registry.resolve(Uuid::new_v4(), "deadbeef").await;
        assert!(matches!(resolved, Err(ShareStoreError::Timeout)));
    }
}
