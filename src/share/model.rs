use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One minted share token for a document.
///
/// Rows are append-only: a fresh row is written only once the previous one
/// has expired, and only the most recently created row for a document is
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShareTokenEntry {
    /// Document the token grants read-only access to.
    pub document_id: Uuid,
    /// Fixed-length hex capability string (32 random bytes).
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
