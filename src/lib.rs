//! # Markpad Credentials
//!
//! The time-bounded credential subsystem of the Markpad document editor:
//! one-time email verification codes, signed session tokens, and durable
//! document share tokens.
//!
//! ## Overview
//!
//! Three credential kinds with different lifecycles share one injected clock
//! and one error taxonomy:
//!
//! - **Verification codes**: six-digit, single-use, ten-minute proof that the
//!   caller controls an email address, scoped by purpose (registration vs.
//!   password reset)
//! - **Session tokens**: HS256-signed JWTs asserting an account identity for
//!   seven days, validated without any server-side lookup
//! - **Share tokens**: durable 64-hex-character capabilities granting
//!   read-only access to one document for seven days, reused while valid so
//!   links already sent around keep working
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── email.rs          # EmailDispatch seam: SMTP, null, and recording mailers
//! ├── error.rs          # CredentialError taxonomy
//! ├── metrics.rs        # Counters on the `metrics` facade
//! ├── service.rs        # CredentialService facade
//! ├── share/            # Durable share token registry (Postgres / in-memory)
//! └── verification.rs   # In-memory single-use code store
//! crates/
//! ├── markpad-core      # Clock injection and credential generators
//! ├── markpad-config    # Environment-backed configuration
//! └── markpad-session   # Session token claims, minting, validation
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use markpad_credentials::share::PgShareTokenRepo;
//! use markpad_credentials::{CredentialService, Purpose};
//!
//! let repo = PgShareTokenRepo::connect(&database_url).await?;
//! repo.migrate().await?;
//!
//! let service = CredentialService::from_env(Arc::new(repo));
//!
//! // Email ownership
//! service.start_verification("user@example.com", Purpose::Registration).await?;
//! let ok = service.consume_verification("user@example.com", Purpose::Registration, &typed_code);
//!
//! // Sessions
//! let token = service.issue_session(account_id)?;
//! let account = service.validate_session(&token)?;
//!
//! // Share links
//! let share = service.share_token(document_id).await?;
//! let readable = service.resolve_share_token(document_id, &share).await?;
//! ```
//!
//! ### Environment Variables
//!
//! ```bash
//! JWT_SECRET=your-secure-secret-key
//! SESSION_TOKEN_EXPIRY=604800
//! VERIFICATION_CODE_EXPIRY=600
//! SHARE_TOKEN_EXPIRY=604800
//! SHARE_STORE_TIMEOUT=5
//! SMTP_ENABLED=true
//! SMTP_HOST=smtp.example.com
//! SMTP_PORT=465
//! ```
//!
//! ## Modules
//!
//! - [`email`]: Verification email dispatch
//! - [`error`]: Failure taxonomy
//! - [`metrics`]: Business counters
//! - [`service`]: The facade the request layer calls
//! - [`share`]: Share token registry and repositories
//! - [`verification`]: Verification code store
//!
//! ## Security Considerations
//!
//! - Codes and tokens come from `rand::thread_rng()`; share tokens carry 256
//!   bits of entropy
//! - A code issued for one purpose can never satisfy the other
//! - Consume and resolve misses are plain `false`, leaking nothing about
//!   which field failed
//! - Session tokens cannot be revoked before natural expiry; size the
//!   lifetime accordingly

pub mod email;
pub mod error;
pub mod metrics;
pub mod service;
pub mod share;
pub mod verification;

pub use error::CredentialError;
pub use service::CredentialService;
pub use verification::{Purpose, VerificationCodeStore};

// Re-export workspace crates for convenience
pub use markpad_config;
pub use markpad_core;
pub use markpad_session;
