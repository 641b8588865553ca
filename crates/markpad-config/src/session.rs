use std::env;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    pub token_ttl_secs: i64,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            token_ttl_secs: env::var("SESSION_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(604800), // 7 days
        }
    }
}
