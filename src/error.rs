use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ApiResponse;

/// Errors raised while authenticating and parsing an update request,
/// before any provider call has been made.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// No address could be determined and the proxy did not supply one.
    #[error("no address given and {0} header not set")]
    MissingAddress(String),
}

impl UpdateError {
    pub fn status(&self) -> StatusCode {
        match self {
            UpdateError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            UpdateError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            UpdateError::MissingAddress(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ApiResponse::failure(self.to_string()));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, r#"Basic realm="ddns""#)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
