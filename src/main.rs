use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::ConnectOptions;
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use intern_dashboard::auth::TokenSigner;
use intern_dashboard::config::DashboardConfig;
use intern_dashboard::state::AppState;
use intern_dashboard::{fixtures, http};

const LOG_FORMAT_VAR: &str = "INTERN_DASHBOARD_LOG_FORMAT";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let database = connect_database(&config).await?;
    run_migrations(&database).await?;

    if config.demo.seed {
        fixtures::seed_demo(&database, config.demo.password.as_deref())
            .await
            .context("Failed to seed demo data")?;
    }

    let tokens = TokenSigner::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl());
    let app_state = AppState::new(database, tokens);

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("Intern dashboard listening on {local_addr}");

    let router: Router = http::router(app_state);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|format| format == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

async fn connect_database(config: &DashboardConfig) -> Result<sea_orm::DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .acquire_timeout(Duration::from_secs(10));

    if let Some(min) = config.database.min_connections {
        options.min_connections(min);
    }

    Database::connect(options)
        .await
        .context("Failed to connect to database")
}

async fn run_migrations(database: &sea_orm::DatabaseConnection) -> Result<()> {
    migration::Migrator::up(database, None)
        .await
        .context("Database migrations failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
