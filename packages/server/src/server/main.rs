// Main entry point for the ghostwriter server

use std::sync::Arc;

use anyhow::{Context, Result};
use ghostwriter_core::kernel::{AnthropicClient, ServerDeps, SlackClient};
use ghostwriter_core::server::{build_app, AxumAppState};
use ghostwriter_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ghostwriter_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ghostwriter");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(timezone = %config.schedule_timezone, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let content = AnthropicClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
    )
    .context("Failed to create Anthropic client")?;
    let chat = SlackClient::new(config.slack_bot_token.clone())
        .context("Failed to create Slack client")?;

    let deps = ServerDeps::from_config(pool, Arc::new(content), Arc::new(chat), &config);
    if config.linear_webhook_secret.is_none() {
        tracing::warn!("LINEAR_WEBHOOK_SECRET not set, Linear deliveries are not verified");
    }

    let app = build_app(AxumAppState::new(
        deps,
        config.slack_signing_secret.clone(),
        config.linear_webhook_secret.clone(),
    ));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Slack events: http://localhost:{}/slack/events", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
