//! Collections Compliance Server
//!
//! HTTP front end for the compliance rule engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 COLLECTIONS COMPLIANCE                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Batch Evaluation       │ │
//! │  │  Gateway  │  │  (static  │  │  (rayon, blocking pool) │ │
//! │  │  (Axum)   │  │  pair+JWT)│  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │                ┌─────────────┐                             │
//! │                │ Rule Engine │                             │
//! │                └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod middleware;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
    middleware as axum_middleware,
};
use compliance_core::EngineConfig;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "compliance_server=debug,compliance_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Collections Compliance Server starting...");
    tracing::info!(
        "Rules {} | preset {:?} | calling window {} - {} | auth {}",
        compliance_core::RULES_VERSION,
        config.engine_preset,
        config.calling_window.start.format("%H:%M"),
        config.calling_window.end.format("%H:%M"),
        if config.auth_enabled() { "enabled" } else { "disabled" },
    );
    if config.is_production() && !config.auth_enabled() {
        tracing::warn!("Running in production without ADMIN_USER/ADMIN_PASSWORD");
    }

    // Build application state
    let state = AppState::new(config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineConfig>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            engine: Arc::new(config.engine_config()),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/health", get(handlers::health::check))
        .route("/auth/login", post(handlers::auth::login));

    // Compliance routes (guarded when a credential pair is configured)
    let compliance_routes = Router::new()
        .route("/compliance/check", post(handlers::compliance::check))
        .route("/compliance/batch", post(handlers::compliance::batch))
        .route("/compliance/batch-messages", post(handlers::compliance::batch_messages))
        .route("/compliance/recommendations", post(handlers::compliance::recommendations))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(compliance_routes)
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            })
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
