//! AuthForge Auth Server
//!
//! Production server for the authentication APIs:
//! - Auth APIs: login, client-credential exchange, refresh, revoke
//! - User APIs: create user, lookup, role assignment
//! - Monitoring: health, readiness
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AF_API_PORT` | `8080` | HTTP API port |
//! | `AF_STORE` | `mongo` | Persistence backend: `mongo` or `memory` |
//! | `AF_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `AF_MONGO_DB` | `authforge` | MongoDB database name |
//! | `AF_TOKEN_ISSUER` | `authforge` | `iss` claim on issued tokens |
//! | `AF_TOKEN_AUDIENCES` | `authforge` | Comma-separated `aud` values for user tokens |
//! | `AF_TOKEN_SECURITY_KEY` | - | HMAC-SHA256 signing secret, min 32 bytes (required) |
//! | `AF_ACCESS_TOKEN_MINUTES` | `5` | Access-token lifetime |
//! | `AF_REFRESH_TOKEN_MINUTES` | `600` | Refresh-token lifetime |
//! | `AF_CLOCK_SKEW_SECONDS` | `0` | Tolerance subtracted from `nbf` |
//! | `AF_CLIENTS_FILE` | - | Path to the JSON client registry |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use af_platform::api::{auth_router, users_router, ApiDoc, AuthApiState, UsersApiState};
use af_platform::config::{ClientRegistry, TokenOptions};
use af_platform::repository::{
    InMemoryRefreshTokenStore, InMemoryUserDirectory, MongoRefreshTokenStore, MongoUserDirectory,
    RefreshTokenStore, UserDirectory,
};
use af_platform::service::{AuthenticationService, PasswordService, TokenService};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn token_options_from_env() -> Result<TokenOptions> {
    let security_key =
        std::env::var("AF_TOKEN_SECURITY_KEY").context("AF_TOKEN_SECURITY_KEY must be set")?;

    Ok(TokenOptions {
        issuer: env_or("AF_TOKEN_ISSUER", "authforge"),
        audiences: env_or("AF_TOKEN_AUDIENCES", "authforge")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        security_key,
        access_token_expiration_minutes: env_or_parse("AF_ACCESS_TOKEN_MINUTES", 5),
        refresh_token_expiration_minutes: env_or_parse("AF_REFRESH_TOKEN_MINUTES", 600),
        clock_skew_seconds: env_or_parse("AF_CLOCK_SKEW_SECONDS", 0),
    })
}

fn client_registry_from_env() -> Result<ClientRegistry> {
    match std::env::var("AF_CLIENTS_FILE") {
        Ok(path) => {
            let registry = ClientRegistry::from_json_file(&path)?;
            info!(clients = registry.len(), "Client registry loaded from {}", path);
            Ok(registry)
        }
        Err(_) => {
            info!("AF_CLIENTS_FILE not set, client-credential exchange disabled");
            Ok(ClientRegistry::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting AuthForge Auth Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("AF_API_PORT", 8080);
    let store_kind = env_or("AF_STORE", "mongo");
    let token_options = token_options_from_env()?;
    let registry = Arc::new(client_registry_from_env()?);

    let password_service = Arc::new(PasswordService::new());
    // Client tokens carry the client's own audiences, so the verifier must
    // accept those too.
    let token_service = Arc::new(
        TokenService::new(token_options)?.with_accepted_audiences(registry.audiences()),
    );

    // Persistence ports
    let (directory, refresh_tokens): (Arc<dyn UserDirectory>, Arc<dyn RefreshTokenStore>) =
        if store_kind == "memory" {
            info!("Using in-memory persistence (data is lost on restart)");
            (
                Arc::new(InMemoryUserDirectory::new(password_service)),
                Arc::new(InMemoryRefreshTokenStore::new()),
            )
        } else {
            let mongo_url = env_or("AF_MONGO_URL", "mongodb://localhost:27017");
            let mongo_db = env_or("AF_MONGO_DB", "authforge");
            info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);

            let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
            let db = mongo_client.database(&mongo_db);

            let directory = MongoUserDirectory::new(&db, password_service);
            directory.ensure_indexes().await?;
            let store = MongoRefreshTokenStore::new(&db);
            store.ensure_indexes().await?;
            info!("Repositories initialized");

            (Arc::new(directory), Arc::new(store))
        };

    let auth_service = Arc::new(AuthenticationService::new(
        directory.clone(),
        token_service,
        refresh_tokens,
        registry,
    ));

    let auth_state = AuthApiState {
        auth_service: auth_service.clone(),
    };
    let users_state = UsersApiState { directory };

    let app = Router::new()
        .nest("/auth", auth_router(auth_state))
        .nest("/users", users_router(users_state))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AuthForge Auth Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
