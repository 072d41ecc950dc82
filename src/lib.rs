//! Account-management API built with Rust.
//!
//! Registration, login, password reset, and JWT issuance over a PostgreSQL
//! identity store.

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod notify;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;

use axum::routing::{get, post};
use handlers::http;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router (account routes, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let account_routes = axum::Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/forgot-password", post(account::forgot_password))
        .route("/reset-password", post(account::reset_password));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/account", account_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
