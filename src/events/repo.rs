use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::events::status::{EventStatus, ModerationAction};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
    pub full_date: OffsetDateTime,
    pub image_url: Option<String>,
    pub proposed_by: String,
    pub proposed_by_id: Uuid,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub head_approved_at: Option<OffsetDateTime>,
    pub head_rejected_at: Option<OffsetDateTime>,
}

/// Content fields of a new or edited event, already validated.
#[derive(Debug, Clone)]
pub struct EventContent {
    pub title: String,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
    pub full_date: OffsetDateTime,
    pub image_url: Option<String>,
}

const EVENT_COLS: &str = "id, title, event_name, description, location, event_type, \
     date, time, full_date, image_url, proposed_by, proposed_by_id, status, \
     created_at, updated_at, head_approved_at, head_rejected_at";

impl Event {
    pub async fn insert(
        db: &PgPool,
        content: &EventContent,
        proposed_by: &str,
        proposed_by_id: Uuid,
    ) -> anyhow::Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, event_name, description, location, event_type,
                                date, time, full_date, image_url,
                                proposed_by, proposed_by_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLS}
            "#
        ))
        .bind(&content.title)
        .bind(&content.event_name)
        .bind(&content.description)
        .bind(&content.location)
        .bind(&content.event_type)
        .bind(&content.date)
        .bind(&content.time)
        .bind(content.full_date)
        .bind(&content.image_url)
        .bind(proposed_by)
        .bind(proposed_by_id)
        .bind(EventStatus::PendingHead.as_str())
        .fetch_one(db)
        .await?;
        Ok(event)
    }

    /// Overwrite content fields only; status and approval timestamps are
    /// untouched. A missing image means "keep the current one".
    pub async fn update_content(
        db: &PgPool,
        id: Uuid,
        content: &EventContent,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE events
               SET title = $2, event_name = $3, description = $4, location = $5,
                   event_type = $6, date = $7, time = $8, full_date = $9,
                   image_url = COALESCE($10, image_url),
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&content.title)
        .bind(&content.event_name)
        .bind(&content.description)
        .bind(&content.location)
        .bind(&content.event_type)
        .bind(&content.date)
        .bind(&content.time)
        .bind(content.full_date)
        .bind(&content.image_url)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Guarded status transition: only applies when the stored status still
    /// matches the action's expected source state. Returns false on a lost
    /// race (or an event already past this stage).
    pub async fn apply_transition(
        db: &PgPool,
        id: Uuid,
        action: ModerationAction,
    ) -> anyhow::Result<bool> {
        let stamp = match action {
            ModerationAction::HeadApprove => ", head_approved_at = now()",
            ModerationAction::HeadReject => ", head_rejected_at = now()",
            ModerationAction::AdminApprove | ModerationAction::AdminReject => "",
        };
        let res = sqlx::query(&format!(
            "UPDATE events SET status = $2, updated_at = now(){stamp} \
             WHERE id = $1 AND status = $3"
        ))
        .bind(id)
        .bind(action.target().as_str())
        .bind(action.expected_from().as_str())
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
        let event =
            sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLS} FROM events WHERE id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(event)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_by_proposer(db: &PgPool, proposer: Uuid) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLS} FROM events WHERE proposed_by_id = $1 ORDER BY created_at DESC"
        ))
        .bind(proposer)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_status(db: &PgPool, status: EventStatus) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLS} FROM events WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLS} FROM events ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Public feed: approved, not yet started, soonest first.
    pub async fn feed(db: &PgPool, now: OffsetDateTime) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLS} FROM events \
             WHERE status = $1 AND full_date >= $2 ORDER BY full_date ASC"
        ))
        .bind(EventStatus::Approved.as_str())
        .bind(now)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
