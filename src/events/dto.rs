use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::countdown::Countdown;
use crate::events::repo::Event;

#[derive(Debug, Serialize)]
pub struct EventResponse {
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

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        EventResponse {
            id: e.id,
            title: e.title,
            event_name: e.event_name,
            description: e.description,
            location: e.location,
            event_type: e.event_type,
            date: e.date,
            time: e.time,
            full_date: e.full_date,
            image_url: e.image_url,
            proposed_by: e.proposed_by,
            proposed_by_id: e.proposed_by_id,
            status: e.status,
            created_at: e.created_at,
            updated_at: e.updated_at,
            head_approved_at: e.head_approved_at,
            head_rejected_at: e.head_rejected_at,
        }
    }
}

/// Public feed item: the event plus its countdown at response time.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub event_type: String,
    pub full_date: OffsetDateTime,
    pub image_url: Option<String>,
    pub countdown: Countdown,
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<String>,
}
