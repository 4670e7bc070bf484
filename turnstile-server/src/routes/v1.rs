use axum::{
    Router, middleware,
    routing::{get, post},
};
use turnstile_model::routes::v1;

use crate::handlers::{
    admin::{generate_pins, list_pin_users, pin_report},
    users::{auth::admin_middleware, authenticate_with_pin, current_user},
};
use crate::infra::app_state::AppState;

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(v1::users::AUTHENTICATE_WITH_PIN, post(authenticate_with_pin))
        .route(v1::users::CURRENT, get(current_user))
        .merge(create_admin_routes())
}

/// Routes restricted to administrators and API keys.
fn create_admin_routes() -> Router<AppState> {
    Router::new()
        .route(v1::admin::pins::GENERATE, post(generate_pins))
        .route(v1::admin::pins::USERS, get(list_pin_users))
        .route(v1::admin::pins::REPORT, get(pin_report))
        .route_layer(middleware::from_fn(admin_middleware))
}
