//! Entry point: load config, wire dependencies, and run the server.

use gatehouse::account::TokenService;
use gatehouse::config::Config;
use gatehouse::db;
use gatehouse::notify::LogMailer;
use gatehouse::{create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    db::role_seed(&db_pool).await.map_err(|e| anyhow::anyhow!("role seed: {}", e))?;

    let tokens = TokenService::new(
        config.jwt_secret.clone(),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
    );
    let mailer = Arc::new(LogMailer::new(config.smtp.clone()));

    let state = AppState {
        db: db_pool,
        tokens,
        mailer,
        reset_token_ttl_minutes: config.reset_token_ttl_minutes,
        reset_link_base: config.reset_link_base.clone(),
    };

    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
