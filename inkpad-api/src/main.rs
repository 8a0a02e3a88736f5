//! inkpad API Server Entry Point
//!
//! Loads configuration, opens the configured store, and serves the Axum
//! application until Ctrl-C.

use std::sync::Arc;

use inkpad_api::telemetry::{init_tracer, TelemetryConfig};
use inkpad_api::{
    create_app, load_dotenv, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, DbClient,
    DbConfig, HasherConfig, PasswordHasher, StoreBackend,
};
use inkpad_storage::{MemoryStore, Store};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let dotenv = load_dotenv();

    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to parse .env file"),
    }

    let api_config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;
    auth_config.validate_for_production()?;

    let hasher = PasswordHasher::new(HasherConfig::from_env());
    let store = open_store(api_config.store_backend).await?;

    let state = AppState::new(store, hasher, auth_config);
    let app = create_app(state, &api_config);

    let addr = api_config.bind_addr;
    tracing::info!(
        %addr,
        service = %telemetry_config.service_name,
        version = %telemetry_config.service_version,
        "Starting inkpad API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn open_store(backend: StoreBackend) -> ApiResult<Arc<dyn Store>> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db_config = DbConfig::from_env();
            let db = DbClient::from_config(&db_config)?;
            db.migrate().await?;
            tracing::info!(pool_size = db.pool_size(), "Connected to PostgreSQL");
            Ok(Arc::new(db))
        }
    }
}
