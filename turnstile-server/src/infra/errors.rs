use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use turnstile_core::domain::auth::AccessTokenError;
use turnstile_core::error::{GenerationError, StoreError};
use turnstile_model::ModelError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(source) => {
                tracing::error!(error = %source, "store operation failed");
                Self::service_unavailable("Storage is temporarily unavailable")
            }
            other => {
                tracing::error!(error = %other, "store rejected operation");
                Self::internal("Storage operation failed")
            }
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Store(store) => store.into(),
            err if err.is_validation() => Self::bad_request(err.to_string()),
            err => {
                tracing::error!(error = %err, "PIN generation failed");
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<AccessTokenError> for AppError {
    fn from(err: AccessTokenError) -> Self {
        match err {
            AccessTokenError::Store(store) => store.into(),
            AccessTokenError::Token(token) => Self::internal(token.to_string()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_model::SubscriptionType;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err: AppError = GenerationError::InvalidCount {
            count: 0,
            max: 1000,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: AppError =
            GenerationError::InvalidTier(SubscriptionType::None).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn exhaustion_is_internal_and_outage_is_unavailable() {
        let err: AppError = GenerationError::Exhausted {
            slot: 0,
            attempts: 17,
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = GenerationError::Store(StoreError::Unavailable(
            anyhow::anyhow!("down"),
        ))
        .into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
