/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::memory::MemoryTaskStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryTaskStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskboard_shared::{
    auth::{
        identity::{IdentityProvider, JwtIdentityProvider, SessionSettings},
        middleware::session_auth_middleware,
    },
    store::TaskStore,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Task persistence
    pub store: Arc<dyn TaskStore>,

    /// Resolves request credentials to a user
    pub identity: Arc<dyn IdentityProvider>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state with the built-in session provider
    pub fn new(store: Arc<dyn TaskStore>, config: Config) -> Self {
        let identity = Arc::new(JwtIdentityProvider::new(
            config.session.jwt_secret.clone(),
            session_settings(&config),
        ));

        Self::with_identity(store, identity, config)
    }

    /// Creates state with a custom identity provider
    pub fn with_identity(
        store: Arc<dyn TaskStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Config,
    ) -> Self {
        Self {
            store,
            identity,
            config: Arc::new(config),
        }
    }
}

/// Session settings derived from configuration
pub fn session_settings(config: &Config) -> SessionSettings {
    SessionSettings {
        cookie_name: config.session.cookie_name.clone(),
        ttl: Duration::seconds(config.session.ttl_secs),
        refresh_window: Duration::seconds(config.session.refresh_secs),
        secure: config.api.production,
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check (public)
/// └── /api/
///     ├── GET  /config             # Public client config (public)
///     └── /tasks/                  # Authenticated
///         ├── GET    /             # List
///         ├── POST   /             # Create
///         ├── POST   /positions    # Batch reposition
///         ├── PUT    /:id          # Update
///         └── DELETE /:id          # Delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. Response compression (gzip/brotli)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
///
/// Task routes additionally run the session authentication middleware.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/config", get(routes::config::public_config));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/positions", post(routes::tasks::reposition_tasks))
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.identity.clone(),
            session_auth_middleware,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .nest("/api/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Session cookies need credentialed requests
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
