//! Credential service facade.
//!
//! Composes the verification store, the session token functions, and the
//! share registry behind one entry point and translates their failures into
//! [`CredentialError`]. Pure coordination: the invariants live in the parts
//! it wraps.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use markpad_config::{SessionConfig, ShareConfig, SmtpConfig, VerificationConfig};
use markpad_core::{Clock, SystemClock};
use markpad_session::SessionTokenError;

use crate::email::{EmailDispatch, mailer_from_config};
use crate::error::CredentialError;
use crate::metrics;
use crate::share::{ShareTokenRegistry, ShareTokenRepo};
use crate::verification::{Purpose, VerificationCodeStore};

/// Entry point the request layer talks to.
pub struct CredentialService {
    verification: VerificationCodeStore,
    shares: ShareTokenRegistry,
    session: SessionConfig,
    mailer: Arc<dyn EmailDispatch>,
    clock: Arc<dyn Clock>,
}

impl CredentialService {
    /// Builds the production service: configuration from the environment,
    /// the system clock, and SMTP delivery (or the logging stand-in when
    /// sending is disabled).
    pub fn from_env(repo: Arc<dyn ShareTokenRepo>) -> Self {
        Self::new(
            &VerificationConfig::from_env(),
            SessionConfig::from_env(),
            &ShareConfig::from_env(),
            mailer_from_config(SmtpConfig::from_env()),
            repo,
            Arc::new(SystemClock),
        )
    }

    /// Builds a service with every collaborator supplied by the caller.
    pub fn new(
        verification: &VerificationConfig,
        session: SessionConfig,
        share: &ShareConfig,
        mailer: Arc<dyn EmailDispatch>,
        repo: Arc<dyn ShareTokenRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verification: VerificationCodeStore::new(verification, clock.clone()),
            shares: ShareTokenRegistry::new(share, repo, clock.clone()),
            session,
            mailer,
            clock,
        }
    }

    /// Starts a verification flow for `email`: issues a code and mails it.
    ///
    /// The code is stored first and withdrawn again if delivery fails, so a
    /// mailer outage never strands the address behind
    /// [`CredentialError::AlreadyActive`] for the rest of the TTL.
    #[instrument(skip(self))]
    pub async fn start_verification(
        &self,
        email: &str,
        purpose: Purpose,
    ) -> Result<(), CredentialError> {
        let code = self.verification.issue(email, purpose)?;

        if let Err(err) = self
            .mailer
            .send_verification_code(email, purpose, &code)
            .await
        {
            let withdrawn = self.verification.retract(email, purpose, &code);
            metrics::track_email_dispatch(false);
            warn!(email, purpose = %purpose, withdrawn, error = %err, "verification email failed");
            return Err(CredentialError::Dispatch(err));
        }

        metrics::track_email_dispatch(true);
        info!(email, purpose = %purpose, "verification code issued");
        Ok(())
    }

    /// Checks a code the user typed back; true consumes it.
    pub fn consume_verification(&self, email: &str, purpose: Purpose, code: &str) -> bool {
        self.verification.consume(email, purpose, code)
    }

    /// True while an unexpired code is pending for the pair.
    pub fn has_active_verification(&self, email: &str, purpose: Purpose) -> bool {
        self.verification.has_active(email, purpose)
    }

    /// Mints a session token for an authenticated account.
    pub fn issue_session(&self, account_id: Uuid) -> Result<String, CredentialError> {
        let token = markpad_session::issue(account_id, &self.session, self.clock.as_ref())
            .map_err(|e| CredentialError::TokenMint(e.to_string()))?;

        metrics::track_session_issued();
        Ok(token)
    }

    /// Validates a presented session token, returning the account it names.
    pub fn validate_session(&self, token: &str) -> Result<Uuid, CredentialError> {
        match markpad_session::validate(token, &self.session, self.clock.as_ref()) {
            Ok(subject) => {
                metrics::track_session_validation("ok");
                Ok(subject)
            }
            Err(SessionTokenError::Expired) => {
                metrics::track_session_validation("expired");
                Err(CredentialError::ExpiredToken)
            }
            Err(_) => {
                metrics::track_session_validation("invalid");
                Err(CredentialError::InvalidToken)
            }
        }
    }

    /// Returns the document's current share token, minting one if needed.
    pub async fn share_token(&self, document_id: Uuid) -> Result<String, CredentialError> {
        Ok(self.shares.get_or_create(document_id).await?)
    }

    /// True iff `token` currently grants read access to `document_id`.
    pub async fn resolve_share_token(
        &self,
        document_id: Uuid,
        token: &str,
    ) -> Result<bool, CredentialError> {
        Ok(self.shares.resolve(document_id, token).await?)
    }

    /// Drops expired share rows from the durable store.
    pub async fn purge_expired_shares(&self) -> Result<u64, CredentialError> {
        Ok(self.shares.purge_expired().await?)
    }

    /// Spawns the background sweep for verification codes nobody ever looks
    /// at again.
    pub fn start_verification_sweeper(
        &self,
        interval: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        self.verification.start_sweeper(interval)
    }
}
