//! # Markpad Config
//!
//! Configuration types for the Markpad credential subsystem.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`session`]: session token signing secret and lifetime
//! - [`verification`]: verification code lifetime
//! - [`share`]: share token lifetime and backing-store deadline
//! - [`smtp`]: SMTP settings for the verification-code mailer
//!
//! # Example
//!
//! ```ignore
//! use markpad_config::{SessionConfig, ShareConfig, SmtpConfig, VerificationConfig};
//!
//! // Load all configs from environment
//! let session_config = SessionConfig::from_env();
//! let verification_config = VerificationConfig::from_env();
//! let share_config = ShareConfig::from_env();
//! let smtp_config = SmtpConfig::from_env();
//! ```

pub mod session;
pub mod share;
pub mod smtp;
pub mod verification;

// Re-export commonly used types at crate root
pub use session::SessionConfig;
pub use share::ShareConfig;
pub use smtp::SmtpConfig;
pub use verification::VerificationConfig;
