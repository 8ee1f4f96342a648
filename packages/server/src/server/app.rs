//! Application setup and router configuration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domains::auth::JwtService;
use crate::kernel::ServerDeps;
use crate::server::middleware::{jwt_auth_middleware, require_service_token};
use crate::server::routes::{
    delete_fairytale_handler, generate_fairytale_handler, generate_sample_fairytale_handler,
    get_fairytale_handler, get_fairytale_status_handler, health_handler,
    list_my_fairytales_handler, notify_fairytale_completion_handler, rename_fairytale_handler,
    update_fairytale_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
    pub jwt_service: Arc<JwtService>,
    /// Token the generation worker must present on callbacks
    pub worker_accept_token: Arc<str>,
}

/// Router options that are not needed by handlers
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    /// Local blob directory served under `/uploads`
    pub uploads_dir: Option<PathBuf>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
pub fn build_app(state: AppState, options: AppOptions) -> Router {
    let jwt_service = state.jwt_service.clone();
    let accept_token = state.worker_accept_token.clone();

    let user_routes = Router::new()
        .route("/api/fairytales/generate", post(generate_fairytale_handler))
        .route(
            "/api/fairytales/generate-test-fairytale",
            post(generate_sample_fairytale_handler),
        )
        .route("/api/fairytales/my", get(list_my_fairytales_handler))
        .route(
            "/api/fairytales/:id",
            get(get_fairytale_handler)
                .patch(rename_fairytale_handler)
                .delete(delete_fairytale_handler),
        )
        .route(
            "/api/fairytales/:id/status",
            get(get_fairytale_status_handler),
        );

    // Called by the generation worker, not by users
    let worker_routes = Router::new()
        .route(
            "/api/fairytales/:id/status",
            patch(update_fairytale_status_handler),
        )
        .route(
            "/api/fairytales/notify",
            post(notify_fairytale_completion_handler),
        )
        .route_layer(middleware::from_fn(move |req, next| {
            require_service_token(accept_token.clone(), req, next)
        }));

    let mut router = Router::new()
        .merge(user_routes)
        .merge(worker_routes)
        .route("/health", get(health_handler));

    if let Some(dir) = options.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
