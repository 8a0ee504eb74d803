use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::services::{AuthUser, Claims};
use crate::countdown;
use crate::error::ApiError;
use crate::events::dto::{EventResponse, FeedItem, ListEventsQuery};
use crate::events::repo::Event;
use crate::events::services::{
    build_content, log_orphaned_upload, resolve_image_url, validate_draft, EventDraft,
    UploadedImage,
};
use crate::events::status::{EventStatus, ModerationAction};
use crate::mailer::send_best_effort;
use crate::profiles;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/feed", get(public_feed))
}

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(submit_event).get(list_all_events))
        .route("/events/mine", get(list_my_events))
        .route("/events/pending", get(list_pending_events))
        .route("/events/:id", put(edit_event).delete(delete_event))
        .route("/events/:id/head-approve", post(head_approve))
        .route("/events/:id/head-reject", post(head_reject))
        .route("/events/:id/approve", post(admin_approve))
        .route("/events/:id/reject", post(admin_reject))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, one image
}

// --- submission and editing ---

async fn parse_submission(
    mut mp: Multipart,
) -> Result<(EventDraft, Option<UploadedImage>), ApiError> {
    let mut draft = EventDraft::default();
    let mut image = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Could not read image: {e}")))?;
            if !body.is_empty() {
                image = Some(UploadedImage { body, content_type });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("Could not read field {name}: {e}")))?;
        match name.as_str() {
            "title" => draft.title = value,
            "event_name" => draft.event_name = value,
            "description" => draft.description = value,
            "location" => draft.location = value,
            "event_type" => draft.event_type = value,
            "date" => draft.date = value,
            "time" => draft.time = value,
            _ => {} // unknown fields are ignored
        }
    }

    Ok((draft, image))
}

#[instrument(skip(state, claims, mp), fields(user_id = %claims.sub))]
pub async fn submit_event(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<EventResponse>), ApiError> {
    let identity = profiles::resolve(&state, claims).await;
    if !identity.can_submit() {
        return Err(ApiError::Forbidden(
            "Worker or head role required to submit events".into(),
        ));
    }

    let (draft, image) = parse_submission(mp).await?;
    let (event_type, full_date) =
        validate_draft(&draft, OffsetDateTime::now_utc()).map_err(ApiError::Validation)?;

    // Two-phase save: image first, then the event row. An upload failure
    // aborts here; a row failure below leaves the upload orphaned.
    let image_url = resolve_image_url(&state, image).await?;
    let content = build_content(&draft, event_type, full_date, image_url);

    let event = match Event::insert(&state.db, &content, &claims.email, claims.sub).await {
        Ok(e) => e,
        Err(e) => {
            log_orphaned_upload(&content.image_url);
            return Err(ApiError::Store(e));
        }
    };

    info!(event_id = %event.id, title = %event.title, "event submitted");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/events/{}", event.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(event.into())))
}

#[instrument(skip(state, claims, mp), fields(user_id = %claims.sub))]
pub async fn edit_event(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<EventResponse>, ApiError> {
    let existing = Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    if existing.proposed_by_id != claims.sub {
        return Err(ApiError::Forbidden(
            "Only the proposer may edit this event".into(),
        ));
    }

    let (draft, image) = parse_submission(mp).await?;
    let (event_type, full_date) =
        validate_draft(&draft, OffsetDateTime::now_utc()).map_err(ApiError::Validation)?;

    let image_url = resolve_image_url(&state, image).await?;
    let content = build_content(&draft, event_type, full_date, image_url);

    if let Err(e) = Event::update_content(&state.db, id, &content)
        .await
        .and_then(|updated| {
            anyhow::ensure!(updated, "event row vanished");
            Ok(())
        })
    {
        log_orphaned_upload(&content.image_url);
        return Err(ApiError::Store(e));
    }

    let event = Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    info!(event_id = %id, "event edited");
    Ok(Json(event.into()))
}

// --- moderation ---

async fn moderate(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
    action: ModerationAction,
) -> Result<Event, ApiError> {
    let identity = profiles::resolve(state, claims).await;
    let allowed = match action {
        ModerationAction::HeadApprove | ModerationAction::HeadReject => identity.is_head,
        ModerationAction::AdminApprove | ModerationAction::AdminReject => identity.is_admin,
    };
    if !allowed {
        return Err(ApiError::Forbidden("Role not allowed to moderate".into()));
    }

    Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

    let applied = Event::apply_transition(&state.db, id, action).await?;
    if !applied {
        return Err(ApiError::Conflict(format!(
            "Event is no longer {}",
            action.expected_from().as_str()
        )));
    }

    let event = Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    info!(event_id = %id, status = %event.status, "event transitioned");
    Ok(event)
}

#[instrument(skip(state, claims))]
pub async fn head_approve(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = moderate(&state, claims, id, ModerationAction::HeadApprove).await?;
    Ok(Json(event.into()))
}

#[instrument(skip(state, claims))]
pub async fn head_reject(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = moderate(&state, claims, id, ModerationAction::HeadReject).await?;
    Ok(Json(event.into()))
}

#[instrument(skip(state, claims))]
pub async fn admin_approve(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = moderate(&state, claims, id, ModerationAction::AdminApprove).await?;
    send_best_effort(
        state.mailer.as_ref(),
        &event.proposed_by,
        "Your event was approved",
        &format!("\"{}\" is now published on MINT Events.", event.title),
    )
    .await;
    Ok(Json(event.into()))
}

#[instrument(skip(state, claims))]
pub async fn admin_reject(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = moderate(&state, claims, id, ModerationAction::AdminReject).await?;
    send_best_effort(
        state.mailer.as_ref(),
        &event.proposed_by,
        "Your event was rejected",
        &format!("\"{}\" was not approved for publication.", event.title),
    )
    .await;
    Ok(Json(event.into()))
}

#[instrument(skip(state, claims))]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let event = Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

    let identity = profiles::resolve(&state, claims).await;
    if !identity.is_admin && event.proposed_by_id != claims.sub {
        return Err(ApiError::Forbidden(
            "Only an admin or the proposer may delete this event".into(),
        ));
    }

    // Removal never cascades to saved dashboard copies.
    Event::delete(&state.db, id).await?;
    info!(event_id = %id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- queries ---

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn list_my_events(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = Event::list_by_proposer(&state.db, claims.sub).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, claims))]
pub async fn list_pending_events(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let identity = profiles::resolve(&state, claims).await;
    if !identity.is_head {
        return Err(ApiError::Forbidden("Head role required".into()));
    }
    let events = Event::list_by_status(&state.db, EventStatus::PendingHead).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, claims))]
pub async fn list_all_events(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Query(q): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    profiles::handlers::require_admin(&state, claims).await?;

    let events = match q.status.as_deref() {
        None => Event::list_all(&state.db).await?,
        Some(raw) => {
            let status = EventStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status: {raw}")))?;
            Event::list_by_status(&state.db, status).await?
        }
    };
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Public feed: no auth, approved upcoming events soonest-first, each with a
/// countdown computed at response time.
#[instrument(skip(state))]
pub async fn public_feed(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedItem>>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let events = Event::feed(&state.db, now).await?;
    let items = events
        .into_iter()
        .map(|e| FeedItem {
            id: e.id,
            title: e.title,
            event_name: e.event_name,
            description: e.description,
            location: e.location,
            event_type: e.event_type,
            full_date: e.full_date,
            image_url: e.image_url,
            countdown: countdown::remaining(e.full_date, now),
        })
        .collect();
    Ok(Json(items))
}
