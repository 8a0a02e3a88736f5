//! REST API Routes Module
//!
//! Route handlers grouped by resource, plus the application router:
//! - Account routes (register, login, delete_user)
//! - Activity lookup (bearer token)
//! - Note CRUD scoped by owner
//! - Health checks, Prometheus metrics, OpenAPI document
//! - CORS, panic recovery, timeouts, and request instrumentation

pub mod activity;
pub mod health;
pub mod note;
pub mod user;

use std::time::Duration;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

// Re-export route creation functions for convenience
pub use activity::create_router as activity_router;
pub use health::create_router as health_router;
pub use note::create_router as note_router;
pub use user::create_router as user_router;

// ============================================================================
// FALLBACKS
// ============================================================================

/// Answer for any path or method that matches no route.
pub async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

/// Turn a handler panic into a generic error body.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::internal_error("Internal server error").into_response()
}

// ============================================================================
// REQUEST TIMEOUT
// ============================================================================

/// Give the bare 408 from the timeout layer the usual error body.
async fn timeout_body(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out");
        return ApiError::request_timeout().into_response();
    }
    response
}

fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(from_fn(timeout_body))
}

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed. Otherwise origins go
/// through [`ApiConfig::is_origin_allowed`], which understands `*.domain`
/// wildcards.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        return cors.allow_origin(Any).allow_headers(Any);
    }

    tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
    let allowed = config.clone();
    let cors = cors
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|origin| allowed.is_origin_allowed(origin))
                    .unwrap_or(false)
            },
        ));

    if config.cors_allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}

// ============================================================================
// APPLICATION ROUTER
// ============================================================================

/// Build the complete application router.
///
/// Layers, outermost first: CORS, observability, timeout, panic recovery.
pub fn create_app(state: AppState, config: &ApiConfig) -> Router {
    let router = Router::new()
        .merge(user::create_router())
        .merge(activity::create_router())
        .merge(note::create_router())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler));

    #[cfg(feature = "openapi")]
    let router = router.route("/openapi.json", get(openapi_json));

    let router = router
        .fallback(route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic));

    with_request_timeout(router, config.request_timeout)
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(config))
}
