//! Repositories: users, roles, password_reset_tokens.

use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;

// ---- User ----

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Inserts a user; returns `None` when the email is already taken. Uniqueness
/// rides on the `lower(email)` unique index, so concurrent inserts for the
/// same email resolve to exactly one winner.
pub async fn user_create(
    pool: &DbPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        RETURNING id, name, email, password_hash, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn user_find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE lower(email) = lower($1)",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

// ---- Roles (closed set) ----

/// Role names form a closed set; anything outside it never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    Premium,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Premium => "Premium",
        }
    }
}

/// Seeds the fixed role set at startup. Idempotent.
pub async fn role_seed(pool: &DbPool) -> AppResult<()> {
    for role in Role::ALL {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Assigns a role to a user. Returns `false` when the role row is missing
/// (seed never ran), so the caller can surface a store failure.
pub async fn user_role_assign(pool: &DbPool, user_id: Uuid, role: Role) -> AppResult<bool> {
    let r = sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id)
        SELECT $1, id FROM roles WHERE name = $2
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(r.rows_affected() > 0)
}

// ---- Password reset tokens ----

/// Fingerprint of a password hash, stored with each issued token. A password
/// change via any path alters the fingerprint and strands outstanding tokens.
pub fn password_fingerprint(password_hash: &str) -> String {
    hex::encode(Sha256::digest(password_hash.as_bytes()))
}

pub async fn reset_token_insert(
    pool: &DbPool,
    user_id: Uuid,
    token: &str,
    password_fingerprint: &str,
    expires_at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO password_reset_tokens (user_id, token, password_fingerprint, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(token)
    .bind(password_fingerprint)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Redeems a reset token and replaces the user's password hash in one
/// transaction. The user row is locked first, so concurrent redemptions for
/// the same user serialize and the fingerprint is checked against the hash
/// as it stands inside the transaction, not a caller snapshot; the
/// conditional UPDATE both checks and burns the token. Returns `false` when
/// the token is unknown, expired, already used, issued to another user, or
/// stale (password changed since issue).
pub async fn reset_token_redeem(
    pool: &DbPool,
    user_id: Uuid,
    token: &str,
    new_password_hash: &str,
) -> AppResult<bool> {
    let mut tx = pool.begin().await?;

    let row: Option<(String,)> =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((current_hash,)) = row else {
        tx.rollback().await?;
        return Ok(false);
    };

    let burned: Option<(String,)> = sqlx::query_as(
        r#"
        UPDATE password_reset_tokens
        SET used_at = NOW()
        WHERE token = $1 AND user_id = $2 AND used_at IS NULL AND expires_at > NOW()
        RETURNING password_fingerprint
        "#,
    )
    .bind(token)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((fingerprint,)) = burned else {
        tx.rollback().await?;
        return Ok(false);
    };
    if fingerprint != password_fingerprint(&current_hash) {
        // Token predates a password change; leave it burned.
        tx.commit().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_are_closed() {
        let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(names, vec!["User", "Admin", "Premium"]);
    }

    #[test]
    fn fingerprint_tracks_the_hash() {
        let f1 = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$def");
        let f2 = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$def");
        let f3 = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$changed");
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }
}
