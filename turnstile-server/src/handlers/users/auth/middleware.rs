use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use turnstile_core::domain::auth::{
    AuthFailure, AuthRequest, IdentityResult, Principal,
};
use turnstile_model::{ApiResponse, AuthenticatePinRequest};

use crate::infra::{app_state::AppState, errors::AppError};

/// Largest PIN request body the identity layer will buffer.
const MAX_PIN_BODY_BYTES: usize = 16 * 1024;

/// Resolves the caller's identity for every request.
///
/// On success the [`Principal`] is attached as a request extension. A
/// `NoResult` lets the request continue anonymously; a `Fail` ends it here.
pub async fn identity_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let mut auth_request = auth_request_from_parts(&parts);

    let body = if state.resolver().is_pin_endpoint(parts.uri.path()) {
        let bytes = match axum::body::to_bytes(body, MAX_PIN_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return AppError::bad_request("request body too large")
                    .into_response();
            }
        };
        let pin_field = &state.resolver().settings().pin_field;
        for (name, value) in pin_body_fields(&parts.headers, &bytes, pin_field) {
            auth_request = auth_request.with_form_field(name, value);
        }
        Body::from(bytes)
    } else {
        body
    };

    let mut request = axum::http::Request::from_parts(parts, body);

    match state.resolver().resolve(&auth_request).await {
        IdentityResult::Success(principal) => {
            request.extensions_mut().insert(principal);
        }
        IdentityResult::NoResult => {}
        IdentityResult::Fail(failure) => return failure_response(&failure),
    }

    next.run(request).await
}

pub async fn admin_middleware(request: Request, next: Next) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return AppError::unauthorized("Authentication required").into_response();
    };

    if !principal.is_administrator() {
        tracing::debug!(username = %principal.username, "admin access denied");
        return AppError::forbidden("Admin access required").into_response();
    }

    next.run(request).await
}

/// Extractor for the principal attached by [`identity_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().map(CurrentPrincipal))
    }
}

fn failure_response(failure: &AuthFailure) -> Response {
    let status = if failure.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::UNAUTHORIZED
    };

    (
        status,
        axum::Json(ApiResponse::<()>::error(failure.message().to_string())),
    )
        .into_response()
}

fn auth_request_from_parts(parts: &Parts) -> AuthRequest {
    let mut auth_request = AuthRequest::new(parts.uri.path());

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            auth_request = auth_request.with_header(name.as_str(), value);
        }
    }

    if let Some(query) = parts.uri.query() {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            auth_request = auth_request.with_query_param(name, value);
        }
    }

    auth_request
}

/// Fields of a form-encoded body, or the PIN of a JSON
/// [`AuthenticatePinRequest`] filed under `pin_field`.
fn pin_body_fields(
    headers: &HeaderMap,
    body: &Bytes,
    pin_field: &str,
) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<AuthenticatePinRequest>(body) {
            Ok(request) => vec![(pin_field.to_string(), request.pin)],
            Err(_) => Vec::new(),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        url::form_urlencoded::parse(body)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).unwrap(),
        );
        headers
    }

    #[test]
    fn reads_form_and_json_bodies() {
        let form = pin_body_fields(
            &headers("application/x-www-form-urlencoded"),
            &Bytes::from_static(b"Pin=12%2034&Other=x"),
            "Pin",
        );
        assert!(form.contains(&("Pin".to_string(), "12 34".to_string())));

        let json = pin_body_fields(
            &headers("application/json; charset=utf-8"),
            &Bytes::from_static(br#"{"Pin":"123456","Count":3}"#),
            "Pin",
        );
        assert_eq!(json, vec![("Pin".to_string(), "123456".to_string())]);
    }

    #[test]
    fn json_without_a_string_pin_yields_nothing() {
        for body in [
            &br#"{"Count":3}"#[..],
            &br#"{"Pin":123456}"#[..],
            &b"[1,2,3]"[..],
        ] {
            let fields = pin_body_fields(
                &headers("application/json"),
                &Bytes::copy_from_slice(body),
                "Pin",
            );
            assert!(fields.is_empty());
        }
    }

    #[test]
    fn ignores_unknown_content_types() {
        let fields = pin_body_fields(
            &headers("text/plain"),
            &Bytes::from_static(b"Pin=123456"),
            "Pin",
        );
        assert!(fields.is_empty());
    }

    #[test]
    fn unavailable_maps_to_503() {
        let response =
            failure_response(&AuthFailure::Unavailable("down".into()));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = failure_response(&AuthFailure::InvalidPin);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
