//! Password-reset token lifecycle: issue, redeem, invalidate.
//!
//! A token is an opaque 32-byte random hex string stored against the user
//! together with a fingerprint of the password hash current at issue time.
//! Redemption locks the user row and re-reads that hash inside its
//! transaction, so a token moves from Issued to exactly one of Redeemed,
//! Expired, or Invalidated and never back, even under concurrent requests.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};

use crate::account::CredentialService;
use crate::db::{self, DbPool, UserRow};
use crate::error::{AppError, AppResult};

const TOKEN_BYTES: usize = 32;

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues a single-use reset token for the user, valid for `ttl`.
pub async fn issue_reset_token(pool: &DbPool, user: &UserRow, ttl: Duration) -> AppResult<String> {
    let token = generate_token();
    let fingerprint = db::password_fingerprint(&user.password_hash);
    let expires_at = Utc::now() + ttl;
    db::reset_token_insert(pool, user.id, &token, &fingerprint, expires_at).await?;
    tracing::debug!(user_id = %user.id, "issued password reset token");
    Ok(token)
}

/// Redeems a reset token: replaces the user's password hash and burns the
/// token atomically. Fails when the token is unknown, expired, already used,
/// issued to another user, or stale after an intervening password change.
pub async fn redeem_reset_token(
    pool: &DbPool,
    user: &UserRow,
    token: &str,
    new_password: &str,
) -> AppResult<()> {
    let new_hash = CredentialService::hash_password(new_password)?;
    let redeemed = db::reset_token_redeem(pool, user.id, token, &new_hash).await?;
    if !redeemed {
        return Err(AppError::InvalidToken("Failed to reset password.".to_string()));
    }
    tracing::info!(user_id = %user.id, "password reset completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_opaque_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
