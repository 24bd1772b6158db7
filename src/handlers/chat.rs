//! The chat endpoint: one full pipeline turn per request.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::Result;
use crate::models::ChatOutcome;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub async fn chat(
    State(engine): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>> {
    let outcome = engine.chat(id, &request.message).await?;
    Ok(Json(outcome))
}
