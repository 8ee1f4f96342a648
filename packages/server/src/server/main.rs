// Main entry point for API server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fairytale_worker_client::{WorkerClient, WorkerOptions};
use server_core::common::utils::ExpoClient;
use server_core::domains::auth::JwtService;
use server_core::domains::fairytales::PgFairytaleStore;
use server_core::domains::notifications::PushNotifier;
use server_core::kernel::{LocalBlobStorage, ServerDeps, WorkerClientAdapter};
use server_core::server::{build_app, AppOptions, AppState};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StoryPool fairytale API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

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

    // Generation worker
    let worker = WorkerClient::new(WorkerOptions {
        base_url: config.worker_base_url.clone(),
        generate_endpoint: config.worker_generate_endpoint.clone(),
        service_token: config.worker_service_token.clone(),
        timeout: config.worker_timeout,
    })
    .context("Failed to create worker client")?;
    tracing::info!(url = %worker.generate_url(), "Worker client ready");

    // Blob storage
    tokio::fs::create_dir_all(&config.blob_root)
        .await
        .with_context(|| format!("Failed to create blob directory {}", config.blob_root))?;
    let blobs = LocalBlobStorage::new(&config.blob_root, &config.blob_public_base_url);

    // Push notifications
    let expo = Arc::new(ExpoClient::new(config.expo_access_token.clone()));
    let notifier = PushNotifier::new(pool.clone(), expo);

    let deps = ServerDeps::new(
        Arc::new(PgFairytaleStore::new(pool.clone())),
        Arc::new(WorkerClientAdapter::new(Arc::new(worker))),
        Arc::new(blobs),
        Arc::new(notifier),
    );

    let state = AppState {
        deps,
        jwt_service: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        worker_accept_token: Arc::from(config.worker_accept_token.as_str()),
    };

    let app = build_app(
        state,
        AppOptions {
            allowed_origins: config.allowed_origins.clone(),
            uploads_dir: Some(PathBuf::from(&config.blob_root)),
        },
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
