//! Session lifecycle handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use super::AppState;
use crate::error::Result;
use crate::session::{ProfileUpdate, Session};

pub async fn create(
    State(engine): State<AppState>,
    profile: Option<Json<ProfileUpdate>>,
) -> (StatusCode, Json<Session>) {
    let profile = profile.map(|Json(p)| p).unwrap_or_default();
    let session = engine.sessions().create(profile).await;
    (StatusCode::CREATED, Json(session))
}

pub async fn show(
    State(engine): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>> {
    Ok(Json(engine.sessions().get(id).await?))
}

pub async fn update_profile(
    State(engine): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<ProfileUpdate>,
) -> Result<Json<Session>> {
    Ok(Json(engine.sessions().update_profile(id, profile).await?))
}

pub async fn clear_history(
    State(engine): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    engine.sessions().clear_history(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
