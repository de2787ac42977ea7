//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use easel_api::{app::{build_router, AppState}, config::Config};
//! use easel_shared::{db::Database, storage::MemoryBlobStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let state = AppState::new(Database::unavailable(), config, Arc::new(MemoryBlobStore::new()));
//! let app = build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::{security_headers, SecurityHeaders},
};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use easel_shared::{auth::middleware::authenticate, db::Database, storage::BlobStore};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (may have no pool configured)
    pub db: Database,

    /// Application configuration
    pub config: Arc<Config>,

    /// Blob storage for uploaded images
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: Database, config: Config, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            blobs,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// └── /v1/
///     ├── /auth/          register, login, refresh, me (public); logout
///     ├── /users/me/      type, photo
///     ├── /categories     list, by slug (public); create (admin)
///     ├── /artists        list, search, by id (public); create, me
///     ├── /bookings       create, mine, status
///     ├── /reviews        create; by artist (public)
///     └── /portfolio      upload, delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Authentication (per-route, JWT bearer)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let upload_limit = DefaultBodyLimit::max(state.config.api.max_upload_bytes);

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/me", get(routes::auth::me))
        .route("/categories", get(routes::categories::list_categories))
        .route("/categories/:slug", get(routes::categories::get_category))
        .route("/artists", get(routes::artists::list_artists))
        .route("/artists/search", get(routes::artists::search_artists))
        .route("/artists/:id", get(routes::artists::get_artist))
        .route(
            "/reviews/artist/:artist_id",
            get(routes::reviews::list_artist_reviews),
        );

    // Authenticated routes (JWT required)
    let protected_routes = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/users/me/type", put(routes::users::update_user_type))
        .route(
            "/users/me/photo",
            post(routes::users::upload_profile_photo)
                .delete(routes::users::delete_profile_photo)
                .layer(upload_limit.clone()),
        )
        .route("/categories", post(routes::categories::create_category))
        .route("/artists", post(routes::artists::create_artist_profile))
        .route(
            "/artists/me",
            get(routes::artists::get_my_profile).patch(routes::artists::update_my_profile),
        )
        .route("/bookings", post(routes::bookings::create_booking))
        .route("/bookings/mine", get(routes::bookings::list_my_bookings))
        .route(
            "/bookings/:id/status",
            post(routes::bookings::update_booking_status),
        )
        .route("/reviews", post(routes::reviews::create_review))
        .route(
            "/portfolio",
            post(routes::portfolio::upload_image)
                .delete(routes::portfolio::delete_image)
                .layer(upload_limit),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = public_routes.merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(SecurityHeaders::from_config(&state.config)),
            security_headers,
        ))
        .with_state(state)
}

/// CORS: permissive when `*` is configured, otherwise the listed origins
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
