use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use boardwalk_core::account::AccountDirectory;
use boardwalk_core::memory::{InMemoryAccountDirectory, InMemoryBoardStore};
use boardwalk_core::service::BoardService;
use boardwalk_core::store::BoardStore;
use boardwalk_db::stores::{PgAccountDirectory, PgBoardStore};
use boardwalk_db::DbPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boardwalk_api::background::event_log::BoardEventLog;
use boardwalk_api::cache::BoardListCache;
use boardwalk_api::config::{ServerConfig, StoreBackend};
use boardwalk_api::router::build_app_router;
use boardwalk_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardwalk_api=debug,boardwalk_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        board_store = ?config.board_store,
        board_list_cache = config.board_list_cache,
        "Loaded server configuration"
    );

    // --- Collaborators ---
    let (pool, store, accounts) = match config.board_store {
        StoreBackend::Postgres => {
            let pool = connect_database().await;
            let store: Arc<dyn BoardStore> = Arc::new(PgBoardStore::new(pool.clone()));
            let accounts: Arc<dyn AccountDirectory> =
                Arc::new(PgAccountDirectory::new(pool.clone()));
            (Some(pool), store, accounts)
        }
        StoreBackend::Memory => {
            let store: Arc<dyn BoardStore> = Arc::new(InMemoryBoardStore::new());
            let accounts: Arc<dyn AccountDirectory> =
                Arc::new(InMemoryAccountDirectory::with_active(&config.memory_accounts).await);
            tracing::warn!(
                seeded_accounts = config.memory_accounts.len(),
                "Using in-memory board store; data is lost on restart"
            );
            (None, store, accounts)
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(boardwalk_events::EventBus::default());
    let event_log_cancel = CancellationToken::new();
    let event_log_handle = tokio::spawn(BoardEventLog::run(
        event_bus.subscribe(),
        event_log_cancel.clone(),
    ));
    tracing::info!("Event bus created, board event log started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        boards: BoardService::new(store, accounts),
        list_cache: Arc::new(BoardListCache::new(config.board_list_cache)),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    event_log_cancel.cancel();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, event_log_handle).await.is_err() {
        tracing::warn!("Board event log did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Connect, check, and migrate the database. Panics on failure so a
/// misconfigured deployment never starts serving.
async fn connect_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = boardwalk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    boardwalk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    boardwalk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    pool
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
