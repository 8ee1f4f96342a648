//! HTTP error mapping. Every error body is `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domains::fairytales::FairytaleError;

const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    /// Malformed request (bad JSON, bad query string)
    BadRequest(String),
    Fairytale(FairytaleError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Fairytale(e) => match e {
                FairytaleError::StoryNotFound | FairytaleError::FairytaleNotFound => {
                    StatusCode::NOT_FOUND
                }
                FairytaleError::Validation(_) | FairytaleError::FairytaleHasPosts => {
                    StatusCode::BAD_REQUEST
                }
                FairytaleError::CannotReachGenerationService
                | FairytaleError::UploadFailed
                | FairytaleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<FairytaleError> for ApiError {
    fn from(e: FairytaleError) -> Self {
        Self::Fairytale(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg,
            Self::Fairytale(FairytaleError::Internal(e)) => {
                error!(error = ?e, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
            Self::Fairytale(e) => e.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (FairytaleError::StoryNotFound, StatusCode::NOT_FOUND),
            (FairytaleError::FairytaleNotFound, StatusCode::NOT_FOUND),
            (FairytaleError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (FairytaleError::FairytaleHasPosts, StatusCode::BAD_REQUEST),
            (
                FairytaleError::CannotReachGenerationService,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (FairytaleError::UploadFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (
                FairytaleError::Internal(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let response =
            ApiError::from(FairytaleError::Internal(anyhow::anyhow!("password=hunter2")))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
