//! Session token minting and validation.
//!
//! Session tokens are HS256-signed JWTs carrying only the subject id and the
//! issue/expiry instants. Possession of a token whose signature checks out and
//! whose expiry has not passed is the entire proof of a live session; nothing
//! is stored server-side and there is no revocation list.
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
//! let token = issue(account_id, &config, &clock)?;
//! let subject = validate(&token, &config, &clock)?;
//! assert_eq!(subject, account_id);
//! ```

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use markpad_config::SessionConfig;
use markpad_core::Clock;

use crate::claims::SessionClaims;

/// Errors produced while minting or validating session tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    /// The token is malformed, carries a bad signature, or names a subject
    /// that is not a UUID.
    #[error("session token is invalid")]
    Invalid,

    /// The token is well formed and correctly signed but its expiry instant
    /// has been reached.
    #[error("session token has expired")]
    Expired,

    /// Signing the claims failed.
    #[error("failed to encode session token: {0}")]
    Encoding(String),
}

/// Mints a session token for `subject_id`.
///
/// The token's issue instant is read from `clock` and its expiry is the issue
/// instant plus the configured lifetime, so two tokens minted at the same
/// instant for the same subject are byte-identical.
///
/// # Arguments
///
/// * `subject_id` - The authenticated account's UUID
/// * `config` - Session configuration holding the signing secret and lifetime
/// * `clock` - Time source for the `iat`/`exp` claims
///
/// # Errors
///
/// Returns [`SessionTokenError::Encoding`] if signing fails.
pub fn issue(
    subject_id: Uuid,
    config: &SessionConfig,
    clock: &dyn Clock,
) -> Result<String, SessionTokenError> {
    let now = clock.now().timestamp();

    let claims = SessionClaims {
        sub: subject_id.to_string(),
        iat: now,
        exp: now + config.token_ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| SessionTokenError::Encoding(e.to_string()))
}

/// Validates a session token and returns the subject it was minted for.
///
/// A token passes only if its signature verifies under the configured secret
/// and its expiry lies strictly in the future of `clock`. A token whose expiry
/// equals the current instant is already expired.
///
/// # Arguments
///
/// * `token` - The JWT string presented by the client
/// * `config` - Session configuration holding the signing secret
/// * `clock` - Time source the expiry is checked against
///
/// # Errors
///
/// Returns [`SessionTokenError::Invalid`] for malformed tokens, bad
/// signatures, and subjects that do not parse as UUIDs, and
/// [`SessionTokenError::Expired`] for tokens past their lifetime. The two
/// cases are kept distinct so callers can tell a stale session apart from a
/// forged one.
pub fn validate(
    token: &str,
    config: &SessionConfig,
    clock: &dyn Clock,
) -> Result<Uuid, SessionTokenError> {
    // Expiry is compared against the injected clock below, not against the
    // library's view of system time.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| SessionTokenError::Invalid)?;

    if data.claims.exp <= clock.now().timestamp() {
        return Err(SessionTokenError::Expired);
    }

    Uuid::parse_str(&data.claims.sub).map_err(|_| SessionTokenError::Invalid)
}
