use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courier_chat::{
    api::{create_router, AppState},
    config::Config,
    crypto::{HashingParams, TokenSigner},
    error::AppError,
    service::{IdentityService, MessageService},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,courier_chat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Courier Chat server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Setup database with proper connection pooling
    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Database connected: {}", config.database_url);

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    tracing::info!("✅ Database migrations completed");

    // Session tokens are signed with the configured secret, nothing persisted
    let signer = TokenSigner::new(&config.secret_key);
    tracing::info!("✅ Session token signer initialized");

    let hashing = HashingParams {
        memory_kib: config.argon2_m_cost_kib,
        iterations: config.argon2_t_cost,
        parallelism: config.argon2_p_cost,
    };

    // Create shared application state
    let state = AppState {
        identity: IdentityService::new(db.clone(), signer, hashing),
        messages: MessageService::new(db),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  POST /api/auth/register         - Register new user");
    tracing::info!("  POST /api/auth/login            - Login with username/password");
    tracing::info!("  GET  /api/users                 - List users (requires auth)");
    tracing::info!("  GET  /api/users/{{username}}      - Get user details (requires auth)");
    tracing::info!("  GET  /api/users/{{username}}/to   - Messages received (requires auth)");
    tracing::info!("  GET  /api/users/{{username}}/from - Messages sent (requires auth)");
    tracing::info!("  POST /api/messages              - Send message (requires auth)");
    tracing::info!("  GET  /api/messages/{{id}}         - Get message (requires auth)");
    tracing::info!("  POST /api/messages/{{id}}/read    - Mark message read (requires auth)");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
