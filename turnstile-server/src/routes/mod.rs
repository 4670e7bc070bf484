pub mod v1;

use axum::{Router, middleware, routing::get};
use turnstile_model::routes::HEALTH;

use crate::handlers::{health::health_handler, users::auth::identity_middleware};
use crate::infra::app_state::AppState;

/// Every route, with identity resolution applied to the versioned API.
/// The health check stays outside it so a bad credential cannot fail it.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(v1::create_v1_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .route(HEALTH, get(health_handler))
        .with_state(state)
}
