//! card-ledger - credit card ledger backend API
//!
//! Records accounts, operation types and transactions; posting a transaction
//! adjusts the account's available limit with a compensating undo if the
//! record cannot be persisted.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_ledger::api::{self, AppState};
use card_ledger::service::{AccountLimitService, TransactionService};
use card_ledger::store::{
    AccountStore, OperationStore, PgAccountStore, PgOperationStore, PgTransactionStore,
    TransactionStore,
};
use card_ledger::{db, Config};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "card_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .merge(api::create_router())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting card-ledger server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    // Verify database schema
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    tracing::info!("Listening on http://{}", addr);

    // Wire stores and services
    let accounts: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
    let operations: Arc<dyn OperationStore> = Arc::new(PgOperationStore::new(pool.clone()));
    let transactions: Arc<dyn TransactionStore> = Arc::new(PgTransactionStore::new(pool.clone()));
    let limits = Arc::new(AccountLimitService::new(accounts.clone()));
    let posting = Arc::new(TransactionService::new(
        accounts.clone(),
        operations.clone(),
        transactions.clone(),
        limits,
        config.posting_timeout(),
    ));

    let state = AppState {
        accounts,
        operations,
        transactions,
        posting,
    };

    // Build router and start server
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
