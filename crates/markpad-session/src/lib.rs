//! # Markpad Session
//!
//! Stateless session tokens for the Markpad credential subsystem.
//!
//! This crate provides:
//!
//! - [`claims`]: The JWT claim structure session tokens carry
//! - [`token`]: Minting and validation built on HS256 signatures
//!
//! A session token proves that its bearer completed authentication within the
//! configured lifetime (seven days by default). Validation needs nothing but
//! the token, the shared secret, and a clock; no server-side session record
//! exists, so tokens cannot be revoked before they expire.
//!
//! # Example
//!
//! ```ignore
//! use markpad_config::SessionConfig;
//! use markpad_core::SystemClock;
//! use markpad_session::{issue, validate};
//!
//! let config = SessionConfig::from_env();
//! let clock = SystemClock;
//!
//! // Mint a token for an authenticated account
//! let token = issue(account_id, &config, &clock)?;
//!
//! // Later, turn a presented token back into the account id
//! let subject = validate(&token, &config, &clock)?;
//! ```

pub mod claims;
pub mod token;

// Re-export commonly used types at crate root
pub use claims::SessionClaims;
pub use token::{SessionTokenError, issue, validate};
