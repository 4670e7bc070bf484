use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use turnstile_model::SubscriptionType;
use uuid::Uuid;

use crate::domain::repositories::PinUserRepository;
use crate::domain::users::User;
use crate::error::{Result, StoreError};

const PIN_CODE_INDEX: &str = "users_pin_code_unique";
const USERNAME_CONSTRAINT: &str = "users_username_unique";

const USER_COLUMNS: &str = "id, username, is_administrator, pin_code, \
     subscription_type, expiration_date, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    is_administrator: bool,
    pin_code: Option<String>,
    subscription_type: SubscriptionType,
    expiration_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            is_administrator: row.is_administrator,
            pin_code: row.pin_code,
            subscription_type: row.subscription_type,
            expiration_date: row.expiration_date,
            created_at: row.created_at,
        }
    }
}

pub struct PostgresPinUserRepository {
    pool: PgPool,
}

impl fmt::Debug for PostgresPinUserRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresPinUserRepository").finish()
    }
}

enum Violation {
    Pin,
    Username,
}

fn unique_violation(err: &sqlx::Error) -> Option<Violation> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    match db_err.constraint() {
        Some(PIN_CODE_INDEX) => Some(Violation::Pin),
        Some(USERNAME_CONSTRAINT) => Some(Violation::Username),
        _ => None,
    }
}

impl PostgresPinUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_all(&self, users: &[User]) -> std::result::Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for user in users {
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, username, is_administrator, pin_code,
                    subscription_type, expiration_date, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(user.is_administrator)
            .bind(user.pin_code.as_deref())
            .bind(user.subscription_type)
            .bind(user.expiration_date)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}

#[async_trait]
impl PinUserRepository for PostgresPinUserRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE pin_code = $1"
        ))
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn existing_pins(
        &self,
        candidates: &[String],
    ) -> Result<HashSet<String>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT pin_code FROM users WHERE pin_code = ANY($1)",
        )
        .bind(candidates)
        .fetch_all(&self.pool)
        .await?;

        Ok(taken.into_iter().collect())
    }

    async fn insert_batch(&self, users: &[User]) -> Result<()> {
        if users.is_empty() {
            return Ok(());
        }

        match self.insert_all(users).await {
            Ok(()) => Ok(()),
            Err(err) => match unique_violation(&err) {
                Some(Violation::Pin) => {
                    // The transaction has rolled back; report which codes a
                    // concurrent writer now owns.
                    let candidates: Vec<String> = users
                        .iter()
                        .filter_map(|user| user.pin_code.clone())
                        .collect();
                    let taken = self.existing_pins(&candidates).await?;
                    Err(StoreError::DuplicatePin(taken.into_iter().collect()))
                }
                Some(Violation::Username) => Err(StoreError::DuplicateUsername(
                    "username collision in batch".into(),
                )),
                None => Err(err.into()),
            },
        }
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        match self.insert_all(std::slice::from_ref(user)).await {
            Ok(()) => Ok(()),
            Err(err) => match unique_violation(&err) {
                Some(Violation::Username) => {
                    Err(StoreError::DuplicateUsername(user.username.clone()))
                }
                Some(Violation::Pin) => Err(StoreError::DuplicatePin(
                    user.pin_code.clone().into_iter().collect(),
                )),
                None => Err(err.into()),
            },
        }
    }

    async fn list_pin_users(
        &self,
        tier: Option<SubscriptionType>,
    ) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE pin_code IS NOT NULL
              AND pin_code <> ''
              AND ($1::INTEGER IS NULL OR subscription_type = $1)
            ORDER BY created_at, id
            "#
        ))
        .bind(tier.map(|tier| tier.as_i32()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
