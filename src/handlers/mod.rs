//! HTTP surface for the advisory service.

pub mod advisory;
pub mod chat;
pub mod sessions;

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use serde_json::json;

use crate::engine::AdvisoryEngine;
use crate::error::AdvisorError;

pub type AppState = Arc<AdvisoryEngine>;

pub fn router(engine: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/sessions", post(sessions::create))
        .route("/api/sessions/:id", get(sessions::show))
        .route("/api/sessions/:id/profile", put(sessions::update_profile))
        .route("/api/sessions/:id/history", delete(sessions::clear_history))
        .route("/api/sessions/:id/chat", post(chat::chat))
        .route("/api/weather", get(advisory::weather))
        .route("/api/crops/recommend", get(advisory::recommend))
        .route("/api/market/:crop", get(advisory::market))
        .route("/api/diseases/detect", post(advisory::detect_disease))
        .route("/api/diseases/:name", get(advisory::disease))
        .route("/api/reference/:table", get(advisory::reference))
        .with_state(engine)
}

impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdvisorError::EmptyQuery | AdvisorError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AdvisorError::SessionNotFound(_) | AdvisorError::UnknownReference { .. } => {
                StatusCode::NOT_FOUND
            }
            AdvisorError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            AdvisorError::Http(_)
            | AdvisorError::UpstreamStatus { .. }
            | AdvisorError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            AdvisorError::Serialization(_) | AdvisorError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (AdvisorError::EmptyQuery, StatusCode::BAD_REQUEST),
            (
                AdvisorError::SessionNotFound(uuid::Uuid::new_v4()),
                StatusCode::NOT_FOUND,
            ),
            (
                AdvisorError::unknown_reference("crop", "saffron"),
                StatusCode::NOT_FOUND,
            ),
            (
                AdvisorError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
