use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use turnstile_model::{
    ApiResponse, GeneratePinsRequest, PinReport, PinUserSummary, StatusFilter,
    SubscriptionType,
};

use crate::handlers::users::auth::CurrentPrincipal;
use crate::infra::{app_state::AppState, errors::AppResult};

/// Query string of the PIN directory listing. Values are parsed by hand so
/// tiers may be given by name or by number.
#[derive(Debug, Default, Deserialize)]
pub struct PinUsersQuery {
    pub status: Option<String>,
    #[serde(rename = "subscriptionType")]
    pub subscription_type: Option<String>,
}

impl PinUsersQuery {
    fn status(&self) -> AppResult<StatusFilter> {
        match non_blank(self.status.as_deref()) {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(StatusFilter::default()),
        }
    }

    fn tier(&self) -> AppResult<Option<SubscriptionType>> {
        match non_blank(self.subscription_type.as_deref()) {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// `POST /api/v1/admin/pins/generate`
pub async fn generate_pins(
    State(state): State<AppState>,
    CurrentPrincipal(admin): CurrentPrincipal,
    Json(request): Json<GeneratePinsRequest>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let codes = state
        .generator()
        .generate(request.count, request.subscription_type)
        .await?;

    tracing::info!(
        admin = %admin.username,
        count = codes.len(),
        tier = %request.subscription_type,
        "generated PIN batch"
    );

    Ok(Json(ApiResponse::success(codes)))
}

/// `GET /api/v1/admin/pins/users?status=&subscriptionType=`
pub async fn list_pin_users(
    State(state): State<AppState>,
    Query(query): Query<PinUsersQuery>,
) -> AppResult<Json<ApiResponse<Vec<PinUserSummary>>>> {
    let status = query.status()?;
    let tier = query.tier()?;

    let users = state.directory().list(status, tier).await?;
    let summaries = users.iter().map(|user| user.summary()).collect();

    Ok(Json(ApiResponse::success(summaries)))
}

/// `GET /api/v1/admin/pins/report`
pub async fn pin_report(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PinReport>>> {
    let report = state.directory().report().await?;
    Ok(Json(ApiResponse::success(report)))
}
