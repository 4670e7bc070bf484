//! # Turnstile Server
//!
//! HTTP surface for PIN-based subscription access.
//!
//! ## Overview
//!
//! - **PIN redemption**: `POST /api/v1/users/authenticate-with-pin` trades an
//!   active PIN for a fresh session token.
//! - **Identity**: every API request passes through
//!   [`handlers::users::auth::identity_middleware`], which runs the
//!   authentication resolver in PIN mode or token mode.
//! - **Administration**: bulk PIN generation, the PIN holder listing and the
//!   active/expired report, restricted to administrators and API keys.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for persistent storage (in-memory stores in dev mode)
//! - `turnstile-core` for the domain logic
//! - `turnstile-config` for layered configuration

pub mod handlers;
pub mod infra;
pub mod routes;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use turnstile_config::Config;
use turnstile_model::routes::headers;

pub use infra::app_state::AppState;

/// Full application: API routes wrapped in CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    routes::create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Permissive in dev mode, allow-list otherwise.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let has_origins = !origins.is_empty();
    let allow_origin = if has_origins {
        AllowOrigin::list(origins)
    } else {
        AllowOrigin::any()
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-emby-authorization"),
            HeaderName::from_static(headers::EMBY_TOKEN),
            HeaderName::from_static(headers::PIN),
            HeaderName::from_static(headers::PIN_AUTH_MARKER),
        ]);

    // Credentials cannot be combined with a wildcard origin.
    if config.cors.allow_credentials && has_origins {
        layer = layer.allow_credentials(true);
    }

    layer
}
