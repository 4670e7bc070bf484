use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::infra::app_state::AppState;

/// `GET /health`: pings the user store.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    match state.users().ping().await {
        Ok(_) => {
            health_status["checks"]["store"] = json!({
                "status": "healthy",
                "backend": state.backend.as_str(),
            });
            Json(health_status).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            health_status["status"] = json!("unhealthy");
            health_status["checks"]["store"] = json!({
                "status": "unhealthy",
                "backend": state.backend.as_str(),
                "error": err.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(health_status)).into_response()
        }
    }
}
