//! Account workflow: register, login, forgot-password, reset-password.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::account::{reset, CredentialService};
use crate::db::{self, Role};
use crate::error::{AppError, AppResult, ErrorDetail};
use crate::handlers::http::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "The Name field is required."))]
    pub name: String,
    #[validate(email(message = "The Email field must contain a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,
    #[validate(length(min = 1, message = "The Confirm Password field is required."))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "The Email field is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "The Email field must contain a valid email address."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "The Email field must contain a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The Token field is required."))]
    pub token: String,
    #[validate(length(min = 1, message = "The New Password field is required."))]
    pub new_password: String,
    #[validate(length(min = 1, message = "The Confirm Password field is required."))]
    pub confirm_password: String,
}

/// Uniform result envelope for every account operation. Never persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub is_success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthResponse {
    fn success(message: &str, token: Option<String>) -> Self {
        Self {
            is_success: true,
            message: message.to_string(),
            token,
        }
    }
}

/// POST /account/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if body.password != body.confirm_password {
        return Err(AppError::Validation("Passwords do not match.".to_string()));
    }

    let policy_errors = CredentialService::check_password_policy(&body.password);
    if !policy_errors.is_empty() {
        return Err(AppError::WeakPassword(policy_errors));
    }

    let password_hash = CredentialService::hash_password(&body.password)?;
    let user = db::user_create(state.db(), &body.name, &body.email, &password_hash)
        .await?
        .ok_or_else(|| {
            AppError::DuplicateUser(vec![ErrorDetail::new(
                "DuplicateEmail",
                &format!("Email '{}' is already taken.", body.email),
            )])
        })?;

    match db::user_role_assign(state.db(), user.id, Role::User).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(AppError::Internal(vec![ErrorDetail::new(
                "RoleAssignmentFailed",
                &format!("Role '{}' does not exist.", Role::User.as_str()),
            )]));
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "role assignment failed");
            return Err(AppError::Internal(vec![ErrorDetail::new(
                "RoleAssignmentFailed",
                "Could not assign the default role.",
            )]));
        }
    }

    let token = state.tokens().issue(&user)?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(Json(AuthResponse::success(
        "Account created successfully!",
        Some(token),
    )))
}

/// POST /account/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = db::user_find_by_email(state.db(), &body.email)
        .await?
        .ok_or_else(|| AppError::InvalidCredentials("User not found.".to_string()))?;

    if !CredentialService::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials("Invalid password.".to_string()));
    }

    // No token in the login payload; clients keep the one from registration.
    Ok(Json(AuthResponse::success("Login successful!", None)))
}

/// POST /account/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Unknown emails get a 400 with a generic-sounding message; known emails
    // get a 200 carrying the token. Kept as-is pending product clarification.
    let user = db::user_find_by_email(state.db(), &body.email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "If a user with that email exists, a password reset email will be sent."
                    .to_string(),
            )
        })?;

    let token = reset::issue_reset_token(state.db(), &user, state.reset_ttl()).await?;
    let link = reset_link(state.reset_link_base(), &token, &user.email)?;

    let subject = "Password Reset";
    let body_html = format!(
        "<p>Hello,</p>\
         <p>We received a request to reset the password for your account. \
         If you did not request a password reset, please ignore this email. \
         Otherwise, click the link below to reset your password:</p>\
         <p><a href='{link}'>Reset Password</a></p>\
         <p>If the link above does not work, copy and paste this URL into your browser:</p>\
         <p>{link}</p>"
    );

    // Dispatch is fire-and-forget-tolerant: the token is already issued, so a
    // delivery failure must not fail this request.
    if let Err(e) = state.mailer().send(&user.email, subject, &body_html).await {
        tracing::warn!(error = %e, user_id = %user.id, "reset email dispatch failed");
    }

    Ok(Json(AuthResponse::success(
        "A password reset link has been sent to your email.",
        Some(token),
    )))
}

/// Builds the reset link with percent-encoded query values; addresses like
/// `user+tag@example.com` must survive the round trip through the client.
fn reset_link(base: &str, token: &str, email: &str) -> AppResult<String> {
    let mut link = url::Url::parse(&format!("{}/reset-password", base))
        .map_err(|e| AppError::Config(format!("invalid reset link base: {}", e)))?;
    link.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("email", email);
    Ok(link.into())
}

/// POST /account/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = db::user_find_by_email(state.db(), &body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    if body.new_password != body.confirm_password {
        return Err(AppError::Mismatch("Passwords do not match.".to_string()));
    }

    // The new password goes through the same policy as registration.
    let policy_errors = CredentialService::check_password_policy(&body.new_password);
    if !policy_errors.is_empty() {
        return Err(AppError::WeakPassword(policy_errors));
    }

    reset::redeem_reset_token(state.db(), &user, &body.token, &body.new_password).await?;

    Ok(Json(AuthResponse::success(
        "Password has been reset successfully.",
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_encodes_query_values() {
        let link = reset_link("http://localhost:3000", "abc123", "user+tag@example.com").unwrap();
        assert_eq!(
            link,
            "http://localhost:3000/reset-password?token=abc123&email=user%2Btag%40example.com"
        );
    }

    #[test]
    fn reset_link_rejects_invalid_base() {
        assert!(reset_link("not a url", "abc123", "user@example.com").is_err());
    }
}
