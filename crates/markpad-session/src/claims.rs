//! JWT claim structure for session tokens.
//!
//! A session token is entirely self-contained: the server keeps no record of
//! issued tokens, so everything validation needs lives in these claims.

use serde::{Deserialize, Serialize};

/// JWT claims for session tokens.
///
/// # Fields
///
/// - `sub`: Subject ID (the authenticated account)
/// - `iat`: Token issued-at timestamp
/// - `exp`: Token expiration timestamp
///
/// Timestamps are Unix seconds taken from the injected clock at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject ID (subject claim)
    pub sub: String,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: i64,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = SessionClaims {
            sub: "6e0b1c3a-9a1f-4b42-bd0e-0f6f9b6e2a11".to_string(),
            iat: 1234567800,
            exp: 1234567890,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"6e0b1c3a-9a1f-4b42-bd0e-0f6f9b6e2a11""#));
        assert!(serialized.contains(r#""exp":1234567890"#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"subject-123","iat":9999999900,"exp":9999999999}"#;
        let claims: SessionClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "subject-123");
        assert_eq!(claims.iat, 9999999900);
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_claims_reject_missing_exp() {
        let json = r#"{"sub":"subject-123","iat":9999999900}"#;
        let parsed: Result<SessionClaims, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_claims_clone() {
        let claims = SessionClaims {
            sub: "subject-789".to_string(),
            iat: 1234567800,
            exp: 1234567890,
        };
        let cloned = claims.clone();
        assert_eq!(claims.sub, cloned.sub);
        assert_eq!(claims.exp, cloned.exp);
    }
}
