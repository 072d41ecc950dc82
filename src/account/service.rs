//! Credential service: password hashing/verification and the complexity policy.

use crate::error::{AppError, AppResult, ErrorDetail};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum password length enforced by the policy.
const MIN_PASSWORD_LEN: usize = 8;

pub struct CredentialService;

impl CredentialService {
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Other(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    /// Constant-time verification, delegated to the argon2 hasher.
    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Other(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Checks the complexity policy: min length 8, uppercase, lowercase,
    /// digit, non-alphanumeric. Returns every violated rule.
    pub fn check_password_policy(password: &str) -> Vec<ErrorDetail> {
        let mut errors = Vec::new();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(ErrorDetail::new(
                "PasswordTooShort",
                "Passwords must be at least 8 characters.",
            ));
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            errors.push(ErrorDetail::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase letter.",
            ));
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            errors.push(ErrorDetail::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase letter.",
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(ErrorDetail::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit.",
            ));
        }
        if password.chars().all(|c| c.is_alphanumeric()) {
            errors.push(ErrorDetail::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non-alphanumeric character.",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() {
        let hash = CredentialService::hash_password("My$ecret1").unwrap();
        assert!(CredentialService::verify_password("My$ecret1", &hash).unwrap());
        assert!(!CredentialService::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = CredentialService::hash_password("My$ecret1").unwrap();
        let b = CredentialService::hash_password("My$ecret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn policy_accepts_compliant_password() {
        assert!(CredentialService::check_password_policy("Test@123").is_empty());
        assert!(CredentialService::check_password_policy("Aa1!aaaa").is_empty());
    }

    #[test]
    fn policy_rejects_123() {
        let errors = CredentialService::check_password_policy("123");
        let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"PasswordTooShort"));
        assert!(codes.contains(&"PasswordRequiresUpper"));
        assert!(codes.contains(&"PasswordRequiresLower"));
        assert!(codes.contains(&"PasswordRequiresNonAlphanumeric"));
        assert!(!codes.contains(&"PasswordRequiresDigit"));
    }

    #[test]
    fn policy_reports_each_missing_class() {
        let codes = |p: &str| -> Vec<String> {
            CredentialService::check_password_policy(p)
                .into_iter()
                .map(|e| e.code)
                .collect()
        };
        assert_eq!(codes("lower@123aa"), vec!["PasswordRequiresUpper"]);
        assert_eq!(codes("UPPER@123"), vec!["PasswordRequiresLower"]);
        assert_eq!(codes("NoDigits!here"), vec!["PasswordRequiresDigit"]);
        assert_eq!(codes("NoSymbol123"), vec!["PasswordRequiresNonAlphanumeric"]);
    }
}
