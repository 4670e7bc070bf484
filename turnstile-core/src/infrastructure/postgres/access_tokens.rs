use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::{AccessTokenRecord, AccessTokenRepository};
use crate::error::Result;

#[derive(sqlx::FromRow)]
struct AccessTokenRow {
    id: Uuid,
    token_hash: String,
    user_id: Option<Uuid>,
    is_api_key: bool,
    name: Option<String>,
    device_id: Option<String>,
    device_name: Option<String>,
    client: Option<String>,
    version: Option<String>,
    revoked: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<AccessTokenRow> for AccessTokenRecord {
    fn from(row: AccessTokenRow) -> Self {
        AccessTokenRecord {
            id: row.id,
            token_hash: row.token_hash,
            user_id: row.user_id,
            is_api_key: row.is_api_key,
            name: row.name,
            device_id: row.device_id,
            device_name: row.device_name,
            client: row.client,
            version: row.version,
            revoked: row.revoked,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

pub struct PostgresAccessTokenRepository {
    pool: PgPool,
}

impl fmt::Debug for PostgresAccessTokenRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresAccessTokenRepository").finish()
    }
}

impl PostgresAccessTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for PostgresAccessTokenRepository {
    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessTokenRecord>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT
                id, token_hash, user_id, is_api_key, name,
                device_id, device_name, client, version,
                revoked, created_at, expires_at
            FROM access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccessTokenRecord::from))
    }

    async fn insert(&self, record: &AccessTokenRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (
                id, token_hash, user_id, is_api_key, name,
                device_id, device_name, client, version,
                revoked, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.is_api_key)
        .bind(record.name.as_deref())
        .bind(record.device_id.as_deref())
        .bind(record.device_name.as_deref())
        .bind(record.client.as_deref())
        .bind(record.version.as_deref())
        .bind(record.revoked)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE access_tokens SET revoked = TRUE WHERE id = $1 AND NOT revoked",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
