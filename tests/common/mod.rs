use std::sync::Arc;

use markpad_config::{SessionConfig, ShareConfig, VerificationConfig};
use markpad_core::ManualClock;
use markpad_credentials::CredentialService;
use markpad_credentials::email::RecordingMailer;
use markpad_credentials::share::MemoryShareTokenRepo;
use uuid::Uuid;

/// A service wired to in-process doubles, plus handles to the clock that
/// drives every expiry and the mailer that captures every code.
#[allow(dead_code)]
pub struct TestHarness {
    pub service: CredentialService,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<ManualClock>,
}

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: "test-secret-key-at-least-32-characters-long".to_string(),
        token_ttl_secs: 604800,
    }
}

pub fn test_verification_config() -> VerificationConfig {
    VerificationConfig { code_ttl_secs: 600 }
}

pub fn test_share_config() -> ShareConfig {
    ShareConfig {
        token_ttl_secs: 604800,
        store_timeout_secs: 5,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a service backed by the in-memory share repository, a recording
/// mailer, and a manual clock frozen at "now".
pub fn setup_service() -> TestHarness {
    init_tracing();

    let clock = Arc::new(ManualClock::default());
    let mailer = Arc::new(RecordingMailer::new());

    let service = CredentialService::new(
        &test_verification_config(),
        test_session_config(),
        &test_share_config(),
        mailer.clone(),
        Arc::new(MemoryShareTokenRepo::new()),
        clock.clone(),
    );

    TestHarness {
        service,
        mailer,
        clock,
    }
}

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
