use axum::Json;
use turnstile_core::domain::auth::Principal;
use turnstile_model::{ApiResponse, AuthenticatedUser, PinAuthenticationResult};

use super::auth::CurrentPrincipal;
use crate::infra::errors::{AppError, AppResult};

/// `POST /api/v1/users/authenticate-with-pin`
///
/// The identity middleware has already redeemed the PIN; an invalid or
/// expired PIN never reaches this handler.
pub async fn authenticate_with_pin(
    principal: Option<CurrentPrincipal>,
) -> AppResult<Json<ApiResponse<PinAuthenticationResult>>> {
    let Some(CurrentPrincipal(principal)) = principal else {
        return Err(AppError::unauthorized("A PIN is required"));
    };

    if !principal.is_pin_session {
        return Err(AppError::unauthorized("A PIN is required"));
    }

    tracing::info!(username = %principal.username, "PIN session started");

    let user = authenticated_user(&principal);
    Ok(Json(ApiResponse::success(PinAuthenticationResult {
        access_token: principal.token,
        user,
    })))
}

/// `GET /api/v1/users/me`
pub async fn current_user(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(authenticated_user(&principal)))
}

fn authenticated_user(principal: &Principal) -> AuthenticatedUser {
    AuthenticatedUser {
        id: principal.user_id,
        name: principal.username.clone(),
        role: principal.role.as_str().to_string(),
        is_pin_session: principal.is_pin_session,
        is_api_key: principal.is_api_key,
    }
}
