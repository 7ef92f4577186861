//! Local user records mirrored from Stytch identities.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::is_unique_violation;

const USER_COLUMNS: &str = "id, email, name, stytch_user_id, created_at, last_login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub stytch_user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    /// The email already belongs to a different Stytch identity.
    #[error("email already registered to another account")]
    EmailConflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl UserRecord {
    fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            email: row.get("email"),
            name: row.get("name"),
            stytch_user_id: row.get("stytch_user_id"),
            created_at: row.get("created_at"),
            last_login: row.get("last_login"),
        }
    }
}

/// Look up the local record for a Stytch user id.
///
/// # Errors
/// Returns the underlying database error.
pub async fn find_by_stytch_user_id(
    pool: &PgPool,
    stytch_user_id: &str,
) -> Result<Option<UserRecord>, UserStoreError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE stytch_user_id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(&query)
        .bind(stytch_user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;
    Ok(row.as_ref().map(UserRecord::from_row))
}

/// Insert the user, or refresh email, name (when given) and `last_login` on an
/// existing record. A single upsert keeps concurrent first logins consistent.
///
/// # Errors
/// `EmailConflict` when the email is taken by another Stytch identity.
pub async fn get_or_create_user(
    pool: &PgPool,
    stytch_user_id: &str,
    email: &str,
    name: Option<&str>,
) -> Result<UserRecord, UserStoreError> {
    let query = format!(
        r"
        INSERT INTO users (stytch_user_id, email, name, last_login)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (stytch_user_id) DO UPDATE
        SET email = EXCLUDED.email,
            name = COALESCE(EXCLUDED.name, users.name),
            last_login = now()
        RETURNING {USER_COLUMNS}
        "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPSERT"
    );
    let row = sqlx::query(&query)
        .bind(stytch_user_id)
        .bind(email)
        .bind(name)
        .fetch_one(pool)
        .instrument(span)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                UserStoreError::EmailConflict
            } else {
                UserStoreError::Database(err)
            }
        })?;
    Ok(UserRecord::from_row(&row))
}
