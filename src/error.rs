//! Errors raised around the engine: by the page renderer and the HTTP front end.
//!
//! The extraction engine itself cannot fail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failure to produce a rendered page.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("navigation timed out after {0}ms")]
    Timeout(u64),

    #[error("could not read page content: {0}")]
    Content(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors returned by the `/products` endpoint.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid url")]
    InvalidUrl(String),

    #[error("Scrape failed")]
    Render(#[from] RenderError),

    #[error("Scrape failed")]
    Extraction(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidUrl(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            ApiError::Render(cause) => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": self.to_string(), "details": cause.to_string() }),
            ),
            ApiError::Extraction(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string(), "details": cause }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failures_map_to_bad_gateway() {
        let response = ApiError::from(RenderError::Timeout(45_000)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_url_maps_to_bad_request() {
        let response = ApiError::InvalidUrl("https://elsewhere.test/".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_message_names_the_budget() {
        assert_eq!(
            RenderError::Timeout(45_000).to_string(),
            "navigation timed out after 45000ms"
        );
    }
}
