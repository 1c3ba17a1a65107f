//! Maps every failure to exactly one status and a JSON body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid payload")]
    InvalidPayload(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Unauthorized(_)
                | DomainError::NoSession
                | DomainError::NoSuchUser(_)
                | DomainError::BadPassword => StatusCode::UNAUTHORIZED,
                DomainError::PostNotFound(_) | DomainError::CommentNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
                DomainError::IdGeneration(_) | DomainError::Storage(_) | DomainError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::InvalidPayload(rejection) => {
                warn!(reason = %rejection.body_text(), "rejected request body");
                json!({ "message": "invalid payload" })
            }
            ApiError::Domain(DomainError::AlreadyExists(username)) => json!({
                "errors": [{
                    "location": "body",
                    "param": "username",
                    "value": username,
                    "msg": "already exists",
                }]
            }),
            ApiError::Domain(err) if err.is_internal() => {
                error!(error = %err, "request failed");
                json!({ "message": "internal server error" })
            }
            ApiError::Domain(DomainError::NoSuchUser(_)) => json!({ "message": "user not found" }),
            ApiError::Domain(DomainError::BadPassword) => json!({ "message": "invalid password" }),
            ApiError::Domain(err) => json!({ "message": err.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[test]
    fn each_domain_error_has_one_status() {
        assert_eq!(status_of(DomainError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::NoSession), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::BadPassword), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::NoSuchUser("a".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::PostNotFound("p".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::CommentNotFound("c".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::AlreadyExists("a".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::Storage("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
