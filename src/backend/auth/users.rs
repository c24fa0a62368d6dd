/**
 * User Model and Database Operations
 *
 * Accounts start unverified. Sign-up stores the user, a one-time
 * verification token and the organizer role in a single transaction;
 * redeeming the token marks the account verified and deletes the token.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role granted to every new account
pub const ORGANIZER_ROLE: i32 = 1;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Freshly registered user with its pending verification token
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub verification_token: String,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, verified, created_at, updated_at";

/// Create an unverified user, its verification token and role
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<Registration, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, verified)
        VALUES ($1, $2, $3, $4, FALSE)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;

    let verification_token = Uuid::new_v4().simple().to_string();
    sqlx::query("INSERT INTO verifications (user_id, token) VALUES ($1, $2)")
        .bind(user.id)
        .bind(&verification_token)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO users_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(user.id)
        .bind(ORGANIZER_ROLE)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Registration {
        user,
        verification_token,
    })
}

/// Get user by email
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by username
pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Redeem a verification token
///
/// Returns the verified user, or `None` when the token is unknown.
pub async fn verify_user_by_token(pool: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user_id: Option<Uuid> =
        sqlx::query_scalar("DELETE FROM verifications WHERE token = $1 RETURNING user_id")
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET verified = TRUE, updated_at = NOW() WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(user))
}
