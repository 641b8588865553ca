mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{setup_service, test_session_config, test_verification_config};
use markpad_config::ShareConfig;
use markpad_core::ManualClock;
use markpad_credentials::email::RecordingMailer;
use markpad_credentials::share::{ShareStoreError, ShareTokenEntry, ShareTokenRepo};
use markpad_credentials::{CredentialError, CredentialService};
use uuid::Uuid;

#[tokio::test]
async fn test_share_token_is_stable_while_valid() {
    let harness = setup_service();
    let document = Uuid::new_v4();

    let first = harness.service.share_token(document).await.unwrap();
    let second = harness.service.share_token(document).await.unwrap();
    let third = harness.service.share_token(document).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_share_token_rotates_after_expiry() {
    let harness = setup_service();
    let document = Uuid::new_v4();

    let first = harness.service.share_token(document).await.unwrap();
    harness
        .clock
        .advance(Duration::days(7) + Duration::seconds(1));
    let second = harness.service.share_token(document).await.unwrap();

    assert_ne!(first, second);
    assert!(
        !harness
            .service
            .resolve_share_token(document, &first)
            .await
            .unwrap()
    );
    assert!(
        harness
            .service
            .resolve_share_token(document, &second)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_resolve_requires_the_matching_document() {
    let harness = setup_service();
    let doc_a = Uuid::new_v4();
    let doc_b = Uuid::new_v4();

    let token_a = harness.service.share_token(doc_a).await.unwrap();
    let token_b = harness.service.share_token(doc_b).await.unwrap();
    assert_ne!(token_a, token_b);

    assert!(
        !harness
            .service
            .resolve_share_token(doc_b, &token_a)
            .await
            .unwrap()
    );
    assert!(
        harness
            .service
            .resolve_share_token(doc_a, &token_a)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_resolve_never_consumes_the_token() {
    let harness = setup_service();
    let document = Uuid::new_v4();

    let token = harness.service.share_token(document).await.unwrap();

    for _ in 0..3 {
        assert!(
            harness
                .service
                .resolve_share_token(document, &token)
                .await
                .unwrap()
        );
    }
    assert_eq!(harness.service.share_token(document).await.unwrap(), token);
}

#[tokio::test]
async fn test_purge_reports_expired_rows_only() {
    let harness = setup_service();
    let doc_a = Uuid::new_v4();
    let doc_b = Uuid::new_v4();

    harness.service.share_token(doc_a).await.unwrap();
    harness.service.share_token(doc_b).await.unwrap();

    harness
        .clock
        .advance(Duration::days(7) + Duration::seconds(1));

    let doc_c = Uuid::new_v4();
    let fresh = harness.service.share_token(doc_c).await.unwrap();

    let purged = harness.service.purge_expired_shares().await.unwrap();
    assert_eq!(purged, 2);

    assert!(
        harness
            .service
            .resolve_share_token(doc_c, &fresh)
            .await
            .unwrap()
    );
}

/// Repository whose every call hangs forever, standing in for an
/// unreachable database.
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
async fn test_store_outage_reports_transient_failure() {
    let service = CredentialService::new(
        &test_verification_config(),
        test_session_config(),
        &ShareConfig {
            token_ttl_secs: 604800,
            store_timeout_secs: 0,
        },
        Arc::new(RecordingMailer::new()),
        Arc::new(PendingRepo),
        Arc::new(ManualClock::default()),
    );
    let document = Uuid::new_v4();

    let minted = service.share_token(document).await;
    let err = minted.unwrap_err();
    assert!(matches!(err, CredentialError::StoreUnavailable(_)));
    assert!(err.is_transient());

    let resolved = service.resolve_share_token(document, "deadbeef").await;
    let err = resolved.unwrap_err();
    assert!(matches!(
        err,
        CredentialError::StoreUnavailable(ShareStoreError::Timeout)
    ));
    assert!(err.is_transient());
}
