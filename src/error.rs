//! Error taxonomy for credential operations.

use thiserror::Error;

use crate::email::DispatchError;
use crate::share::ShareStoreError;

/// Failures a credential operation can report.
///
/// Lookup misses on `consume` and `resolve` are booleans rather than errors,
/// so a caller cannot tell which part of a multi-field check failed. Every
/// variant here is per-request; nothing is fatal to the process.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// An unexpired code already exists for this address and purpose.
    #[error("a verification code is already active for this address")]
    AlreadyActive,

    /// The session token is malformed or its signature does not verify.
    #[error("session token is invalid")]
    InvalidToken,

    /// The session token is well formed and correctly signed but past its
    /// expiry.
    #[error("session token has expired")]
    ExpiredToken,

    /// The verification email could not be handed to the mailer. The issued
    /// code has been withdrawn, so the caller may retry immediately.
    #[error("failed to dispatch verification email")]
    Dispatch(#[from] DispatchError),

    /// The durable share token store failed or missed its deadline.
    #[error("share token store unavailable")]
    StoreUnavailable(#[from] ShareStoreError),

    /// Minting a session token failed.
    #[error("failed to mint session token: {0}")]
    TokenMint(String),
}

impl CredentialError {
    /// True for collaborator outages the caller can retry as-is, as opposed
    /// to anything wrong with the request itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CredentialError::Dispatch(_) | CredentialError::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_are_marked() {
        assert!(CredentialError::StoreUnavailable(ShareStoreError::Timeout).is_transient());
        assert!(!CredentialError::AlreadyActive.is_transient());
        assert!(!CredentialError::InvalidToken.is_transient());
        assert!(!CredentialError::ExpiredToken.is_transient());
    }

    #[test]
    fn test_store_error_converts() {
        let err: CredentialError = ShareStoreError::Timeout.into();
        assert!(matches!(err, CredentialError::StoreUnavailable(_)));
    }
}
