use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::events::repo::Event;

/// A user-owned snapshot of an event. Keyed by the source event id, so a user
/// can hold at most one copy per event; the copy never tracks the source.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub user_id: Uuid,
    pub event_id: Uuid,
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
    pub status: String,
    pub saved_at: OffsetDateTime,
}

const BOOKMARK_COLS: &str = "user_id, event_id, title, event_name, description, location, \
     event_type, date, time, full_date, image_url, proposed_by, status, saved_at";

impl Bookmark {
    /// Upsert the snapshot: saving an already-saved event refreshes the copy
    /// and its `saved_at`.
    pub async fn save(db: &PgPool, user_id: Uuid, event: &Event) -> anyhow::Result<Bookmark> {
        let bookmark = sqlx::query_as::<_, Bookmark>(&format!(
            r#"
            INSERT INTO bookmarks (user_id, event_id, title, event_name, description,
                                   location, event_type, date, time, full_date,
                                   image_url, proposed_by, status, saved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now())
            ON CONFLICT (user_id, event_id) DO UPDATE SET
                title = EXCLUDED.title,
                event_name = EXCLUDED.event_name,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                event_type = EXCLUDED.event_type,
                date = EXCLUDED.date,
                time = EXCLUDED.time,
                full_date = EXCLUDED.full_date,
                image_url = EXCLUDED.image_url,
                proposed_by = EXCLUDED.proposed_by,
                status = EXCLUDED.status,
                saved_at = now()
            RETURNING {BOOKMARK_COLS}
            "#
        ))
        .bind(user_id)
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.event_name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.event_type)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.full_date)
        .bind(&event.image_url)
        .bind(&event.proposed_by)
        .bind(&event.status)
        .fetch_one(db)
        .await?;
        Ok(bookmark)
    }

    /// Delete by id; deleting an absent bookmark is not an error.
    pub async fn remove(db: &PgPool, user_id: Uuid, event_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, Bookmark>(&format!(
            "SELECT {BOOKMARK_COLS} FROM bookmarks WHERE user_id = $1 ORDER BY saved_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn exists(db: &PgPool, user_id: Uuid, event_id: Uuid) -> anyhow::Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM bookmarks WHERE user_id = $1 AND event_id = $2",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }
}
