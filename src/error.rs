use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::users::{model::ValidationError, StoreError};

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("invalid request body: {0}")]
    BadRequest(#[from] JsonRejection),

    #[error("email already registered")]
    DuplicateEmail,

    /// Unknown email and wrong password collapse into this one variant.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{context}: {cause}")]
    Dependency {
        context: &'static str,
        cause: anyhow::Error,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn dependency(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Dependency {
            context,
            cause: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::Validation(_)
            | ApiError::BadRequest(_)
            | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Dependency { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(_) => ApiError::DuplicateEmail,
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::MissingField(msg) | ApiError::Unauthorized(msg) => ErrorBody {
                error: msg.to_string(),
                details: None,
            },
            ApiError::Validation(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            ApiError::BadRequest(rejection) => ErrorBody {
                error: "Invalid request body".into(),
                details: Some(rejection.body_text()),
            },
            ApiError::DuplicateEmail => ErrorBody {
                error: "User registration failed".into(),
                details: Some("Email already registered".into()),
            },
            ApiError::InvalidCredentials => ErrorBody {
                error: "Invalid email or password".into(),
                details: None,
            },
            ApiError::Dependency { context, cause } => {
                error!(error = %cause, context, "dependency failure");
                ErrorBody {
                    error: context.to_string(),
                    details: Some(cause.to_string()),
                }
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                ErrorBody {
                    error: "Internal server error".into(),
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn duplicate_email_is_400_with_details() {
        let (status, json) = render(StoreError::DuplicateKey("a@x.com".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "User registration failed");
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn invalid_credentials_is_generic_401() {
        let (status, json) = render(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, serde_json::json!({ "error": "Invalid email or password" }));
    }

    #[tokio::test]
    async fn database_failures_hide_details() {
        let (status, json) = render(StoreError::Database(sqlx::Error::PoolTimedOut).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn dependency_failures_carry_details() {
        let err = ApiError::dependency("Failed to fetch courses", anyhow::anyhow!("boom"));
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to fetch courses");
        assert_eq!(json["details"], "boom");
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err: ApiError = ValidationError { field: "username" }.into();
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "username is required");
    }
}
