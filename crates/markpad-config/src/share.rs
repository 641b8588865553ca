use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ShareConfig {
    pub token_ttl_secs: i64,
    pub store_timeout_secs: u64,
}

impl ShareConfig {
    pub fn from_env() -> Self {
        Self {
            token_ttl_secs: env::var("SHARE_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(604800), // 7 days
            store_timeout_secs: env::var("SHARE_STORE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(5),
        }
    }

    /// Deadline applied to every call into the backing store.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}
