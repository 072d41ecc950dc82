//! Bearer-token minting: signed JWTs carrying identity claims.

use crate::db::UserRow;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token validity window.
const TOKEN_VALIDITY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints HS512-signed bearer tokens. Pure computation over (user, key,
/// issuer/audience config); identical inputs differ only in iat/exp.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(secret: String, issuer: String, audience: String) -> Self {
        Self {
            secret,
            issuer,
            audience,
        }
    }

    pub fn issue(&self, user: &UserRow) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Other(anyhow::anyhow!("jwt encode: {}", e)))?;
        Ok(token)
    }

    /// Decodes a token, checking signature, expiry, issuer, and audience.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::InvalidCredentials(format!("invalid bearer token: {}", e)))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service() -> TokenService {
        TokenService::new(
            "test-jwt-secret-min-32-chars!!!!".to_string(),
            "gatehouse".to_string(),
            "gatehouse-clients".to_string(),
        )
    }

    fn user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "hello".to_string(),
            email: "hello@example.com".to_string(),
            password_hash: "unused".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let svc = service();
        let u = user();
        let token = svc.issue(&u).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, u.id.to_string());
        assert_eq!(claims.email, "hello@example.com");
        assert_eq!(claims.name, "hello");
        assert_eq!(claims.iss, "gatehouse");
        assert_eq!(claims.aud, "gatehouse-clients");
    }

    #[test]
    fn expiry_is_seven_days_out() {
        let svc = service();
        let token = svc.issue(&user()).unwrap();
        let claims = svc.verify(&token).unwrap();
        let window = claims.exp - claims.iat;
        assert_eq!(window, 7 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let svc = service();
        let token = svc.issue(&user()).unwrap();
        let other = TokenService::new(
            "test-jwt-secret-min-32-chars!!!!".to_string(),
            "gatehouse".to_string(),
            "someone-else".to_string(),
        );
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let svc = service();
        let token = svc.issue(&user()).unwrap();
        let other = TokenService::new(
            "a-completely-different-secret-key!!".to_string(),
            "gatehouse".to_string(),
            "gatehouse-clients".to_string(),
        );
        assert!(other.verify(&token).is_err());
    }
}
