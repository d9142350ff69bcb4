//! Maps `ChatError` onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use chat_types::{ChatError, api::ErrorBody};

#[derive(Debug)]
pub struct ApiError(pub ChatError);

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Validation and config messages go out
    /// verbatim; the rest carry the error kind as `details`.
    pub fn body(&self) -> ErrorBody {
        match &self.0 {
            ChatError::Validation(msg) | ChatError::Config(msg) | ChatError::Other(msg) => {
                ErrorBody::new(msg.as_str())
            }
            ChatError::Upstream(msg) => ErrorBody {
                error: msg.clone(),
                details: Some("upstream".to_string()),
            },
            other => ErrorBody {
                error: "An error occurred during API request".to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Error in chat API: {}", self.0);
        }
        (status, Json(self.body())).into_response()
    }
}
