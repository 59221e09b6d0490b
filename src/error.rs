use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::render;

/// Errors raised while parsing a form submission. Upstream failures are not
/// errors at this level; they are rendered outcomes (see `relay` and `render`).
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Missing document in request")]
    MissingDocument,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("Unknown enhancement: {0}")]
    UnknownEnhancement(String),
}

impl IntoResponse for HarnessError {
    fn into_response(self) -> Response {
        let body = Html(render::error_page(&self.to_string()));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
