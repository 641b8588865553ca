//! Postgres-backed share token repository.
//!
//! Share tokens outlive the process (links already handed out must keep
//! working across restarts), so the production registry sits on a Postgres
//! table. The schema lives in `migrations/` and is applied with
//! [`PgShareTokenRepo::migrate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::share::model::ShareTokenEntry;
use crate::share::repo::{ShareStoreError, ShareTokenRepo};

/// Share token repository backed by the `share_tokens` table.
pub struct PgShareTokenRepo {
    pool: PgPool,
}

impl PgShareTokenRepo {
    /// Wraps an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and wraps the resulting pool.
    pub async fn connect(database_url: &str) -> Result<Self, ShareStoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations for the `share_tokens` table.
    pub async fn migrate(&self) -> Result<(), ShareStoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ShareTokenRepo for PgShareTokenRepo {
    async fn latest_for_document(
        &self,
        document_id: Uuid,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
        let entry = sqlx::query_as::<_, ShareTokenEntry>(
            "SELECT document_id, token, created_at, expires_at
             FROM share_tokens
             WHERE document_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn insert(&self, entry: &ShareTokenEntry) -> Result<(), ShareStoreError> {
        sqlx::query(
            "INSERT INTO share_tokens (document_id, token, created_at, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.document_id)
        .bind(&entry.token)
        .bind(entry.created_at)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_valid(
        &self,
        document_id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareTokenEntry>, ShareStoreError> {
        let entry = sqlx::query_as::<_, ShareTokenEntry>(
            "SELECT document_id, token, created_at, expires_at
             FROM share_tokens
             WHERE document_id = $1 AND token = $2 AND expires_at > $3",
        )
        .bind(document_id)
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ShareStoreError> {
        let result = sqlx::query("DELETE FROM share_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
