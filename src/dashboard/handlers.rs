use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::services::AuthUser;
use crate::dashboard::repo::Bookmark;
use crate::error::ApiError;
use crate::events::repo::Event;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub saved: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(list_bookmarks))
        .route(
            "/dashboard/:event_id",
            put(save_bookmark).get(check_bookmark).delete(remove_bookmark),
        )
}

/// Any authenticated user may save any event at any lifecycle stage; the
/// bookmark is a copy taken now, not a reference.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn save_bookmark(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Bookmark>, ApiError> {
    let event = Event::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

    let bookmark = Bookmark::save(&state.db, claims.sub, &event).await?;
    info!(event_id = %event_id, "event saved to dashboard");
    Ok(Json(bookmark))
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn remove_bookmark(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    // Absent bookmark is still a success: removal is idempotent.
    let removed = Bookmark::remove(&state.db, claims.sub, event_id).await?;
    if removed {
        info!(event_id = %event_id, "event removed from dashboard");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = Bookmark::list_for_user(&state.db, claims.sub).await?;
    Ok(Json(bookmarks))
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn check_bookmark(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let saved = Bookmark::exists(&state.db, claims.sub, event_id).await?;
    Ok(Json(MembershipResponse { saved }))
}
