use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linkhub_core::HubError;
use serde_json::json;
use tracing::error;

/// `HubError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub HubError);

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            HubError::Validation(_) => StatusCode::BAD_REQUEST,
            HubError::Unauthorized | HubError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            HubError::Validation(details) => {
                json!({"error": self.0.to_string(), "details": details})
            }
            HubError::Storage { source, .. } => {
                error!(error = %source, "storage failure");
                json!({"error": self.0.to_string()})
            }
            other => json!({"error": other.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

/// 400 for a request body that could not be read as a form.
pub fn bad_form(err: impl std::fmt::Display) -> Response {
    tracing::debug!(error = %err, "rejected malformed form");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Invalid form data."})),
    )
        .into_response()
}
