//! Shared application state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use chrono::Duration;
use serde_json::json;

use crate::account::TokenService;
use crate::db::DbPool;
use crate::notify::Mailer;

/// Shared application state, wired explicitly in `main` (and in tests).
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
    pub reset_token_ttl_minutes: i64,
    pub reset_link_base: String,
}

impl AppState {
    pub fn db(&self) -> &DbPool {
        &self.db
    }
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }
    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.reset_token_ttl_minutes)
    }
    pub fn reset_link_base(&self) -> &str {
        &self.reset_link_base
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "gatehouse" })),
    )
}
