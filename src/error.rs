use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;

const GENERIC_SERVER_ERROR: &str = "Something went wrong, Contact with system admin";

/// Every failure a handler can return. Rendered as `{message, error}` JSON.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "validation failed: {}", _0)]
    Validation(String),
    #[display(fmt = "upload rejected: {}", _0)]
    PayloadRejected(String),
    #[display(fmt = "employee id '{}' already exists", _0)]
    DuplicateKey(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "invalid credentials")]
    InvalidCredentials,
    #[display(fmt = "storage error: {}", _0)]
    Storage(String),
    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for ApiError {}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Employee not found")]
    pub message: String,
    #[schema(example = "Not Found")]
    pub error: String,
}

impl ApiError {
    fn body(&self) -> ErrorBody {
        let (message, error) = match self {
            ApiError::Validation(detail) => ("Invalid request".to_string(), detail.clone()),
            ApiError::PayloadRejected(detail) => ("Upload rejected".to_string(), detail.clone()),
            ApiError::DuplicateKey(emp_id) => (
                "Employee already exists".to_string(),
                format!("Employee ID '{emp_id}' is already registered"),
            ),
            ApiError::NotFound(what) => (what.clone(), "Not Found".to_string()),
            ApiError::InvalidCredentials => {
                ("Invalid password".to_string(), "Invalid credentials".to_string())
            }
            ApiError::Storage(_) | ApiError::Internal(_) => (
                "Internal Server Error".to_string(),
                GENERIC_SERVER_ERROR.to_string(),
            ),
        };

        ErrorBody { message, error }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::PayloadRejected(_)
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::DuplicateKey(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            // detail stays in the log, the client gets the generic body
            error!(error = %self, "Request failed");
        }

        HttpResponse::build(status).json(self.body())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(emp_id) => ApiError::DuplicateKey(emp_id),
            StoreError::Password(e) => ApiError::Internal(e.to_string()),
            StoreError::Storage(detail) => ApiError::Storage(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadRejected("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateKey("E1".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn server_errors_hide_detail() {
        let resp = ApiError::Storage("connection refused at 10.0.0.3".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = std::str::from_utf8(&body).unwrap();

        assert!(!text.contains("10.0.0.3"));
        assert!(text.contains(GENERIC_SERVER_ERROR));
    }

    #[test]
    fn store_errors_convert() {
        let dup: ApiError = StoreError::DuplicateKey("E1".into()).into();
        assert!(matches!(dup, ApiError::DuplicateKey(ref id) if id == "E1"));

        let storage: ApiError = StoreError::Storage("boom".into()).into();
        assert!(matches!(storage, ApiError::Storage(_)));
    }
}
