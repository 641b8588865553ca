use std::env;

#[derive(Clone, Debug)]
pub struct VerificationConfig {
    pub code_ttl_secs: i64,
}

impl VerificationConfig {
    pub fn from_env() -> Self {
        Self {
            code_ttl_secs: env::var("VERIFICATION_CODE_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(600), // 10 minutes
        }
    }
}
