use bytes::Bytes;
use time::{macros::format_description, Date, OffsetDateTime, PrimitiveDateTime, Time};
use tracing::warn;

use crate::error::ApiError;
use crate::events::repo::EventContent;
use crate::events::status::EventType;
use crate::state::AppState;

/// Raw submission fields as they arrive from the form, before validation.
#[derive(Debug, Default, Clone)]
pub struct EventDraft {
    pub title: String,
    pub event_name: String,
    pub description: String,
    pub location: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
}

pub struct UploadedImage {
    pub body: Bytes,
    pub content_type: String,
}

/// Combine the calendar date and local time fields into the single instant
/// that is stored as `full_date`. Computed once at submission; never
/// recomputed afterwards.
pub fn combine_date_time(date: &str, time: &str) -> Result<OffsetDateTime, String> {
    let date = Date::parse(date, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| "Date must be formatted YYYY-MM-DD".to_string())?;
    let time = Time::parse(time, &format_description!("[hour]:[minute]"))
        .or_else(|_| Time::parse(time, &format_description!("[hour]:[minute]:[second]")))
        .map_err(|_| "Time must be formatted HH:MM".to_string())?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Field and date validation, performed before any upload or store call.
pub fn validate_draft(
    draft: &EventDraft,
    now: OffsetDateTime,
) -> Result<(EventType, OffsetDateTime), String> {
    let required = [
        ("title", &draft.title),
        ("event_name", &draft.event_name),
        ("description", &draft.description),
        ("location", &draft.location),
        ("event_type", &draft.event_type),
        ("date", &draft.date),
        ("time", &draft.time),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(format!("Missing required field: {name}"));
        }
    }

    let event_type = EventType::parse(&draft.event_type)
        .ok_or_else(|| format!("Unknown event type: {}", draft.event_type))?;

    let full_date = combine_date_time(&draft.date, &draft.time)?;
    if full_date <= now {
        return Err("Event must be in the future".to_string());
    }

    Ok((event_type, full_date))
}

/// First phase of the two-phase save: push the attached image to the host and
/// get back its public URL. A failure here aborts the whole operation before
/// anything is written; a store failure afterwards leaves the upload
/// orphaned, which is logged by the caller.
pub async fn resolve_image_url(
    state: &AppState,
    image: Option<UploadedImage>,
) -> Result<Option<String>, ApiError> {
    match image {
        None => Ok(None),
        Some(img) => {
            if !crate::images::is_supported_image(&img.content_type) {
                return Err(ApiError::Validation(format!(
                    "Unsupported image type: {}",
                    img.content_type
                )));
            }
            let url = state
                .images
                .upload(img.body, &img.content_type)
                .await
                .map_err(ApiError::Upload)?;
            Ok(Some(url))
        }
    }
}

pub fn build_content(
    draft: &EventDraft,
    event_type: EventType,
    full_date: OffsetDateTime,
    image_url: Option<String>,
) -> EventContent {
    EventContent {
        title: draft.title.trim().to_string(),
        event_name: draft.event_name.trim().to_string(),
        description: draft.description.trim().to_string(),
        location: draft.location.trim().to_string(),
        event_type: event_type.as_str().to_string(),
        date: draft.date.trim().to_string(),
        time: draft.time.trim().to_string(),
        full_date,
        image_url,
    }
}

pub fn log_orphaned_upload(image_url: &Option<String>) {
    if let Some(url) = image_url {
        warn!(%url, "event write failed after image upload; upload is orphaned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn draft_for(date: &str, time: &str) -> EventDraft {
        EventDraft {
            title: "MINT Expo".into(),
            event_name: "Innovation Expo 2026".into(),
            description: "Annual technology exposition".into(),
            location: "Addis Ababa".into(),
            event_type: "expo".into(),
            date: date.into(),
            time: time.into(),
        }
    }

    fn now() -> OffsetDateTime {
        // 2026-01-01T00:00:00Z
        OffsetDateTime::from_unix_timestamp(1_767_225_600).unwrap()
    }

    #[test]
    fn combine_parses_date_and_time() {
        let dt = combine_date_time("2026-06-15", "09:30").unwrap();
        assert_eq!(dt.year(), 2026);
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.minute(), 30);

        let with_seconds = combine_date_time("2026-06-15", "09:30:45").unwrap();
        assert_eq!(with_seconds.second(), 45);
    }

    #[test]
    fn combine_rejects_malformed_input() {
        assert!(combine_date_time("15/06/2026", "09:30").is_err());
        assert!(combine_date_time("2026-06-15", "930").is_err());
        assert!(combine_date_time("2026-13-01", "09:30").is_err());
    }

    #[test]
    fn valid_draft_passes() {
        let (ty, full_date) = validate_draft(&draft_for("2026-06-15", "09:30"), now()).unwrap();
        assert_eq!(ty, EventType::Expo);
        assert!(full_date > now());
    }

    #[test]
    fn each_missing_field_is_reported() {
        let fields: [fn(&mut EventDraft); 7] = [
            |d| d.title.clear(),
            |d| d.event_name.clear(),
            |d| d.description.clear(),
            |d| d.location.clear(),
            |d| d.event_type.clear(),
            |d| d.date.clear(),
            |d| d.time.clear(),
        ];
        for clear in fields {
            let mut d = draft_for("2026-06-15", "09:30");
            clear(&mut d);
            let err = validate_draft(&d, now()).unwrap_err();
            assert!(err.starts_with("Missing required field"), "{err}");
        }
    }

    #[test]
    fn past_dates_are_rejected_before_any_write() {
        let err = validate_draft(&draft_for("2025-06-15", "09:30"), now()).unwrap_err();
        assert_eq!(err, "Event must be in the future");
    }

    #[test]
    fn the_exact_current_instant_is_not_future() {
        let now = combine_date_time("2026-06-15", "09:30").unwrap();
        let err = validate_draft(&draft_for("2026-06-15", "09:30"), now).unwrap_err();
        assert_eq!(err, "Event must be in the future");
    }

    #[test]
    fn one_second_ahead_is_future() {
        let now = combine_date_time("2026-06-15", "09:30").unwrap() - Duration::seconds(1);
        assert!(validate_draft(&draft_for("2026-06-15", "09:30"), now).is_ok());
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let mut d = draft_for("2026-06-15", "09:30");
        d.event_type = "concert".into();
        let err = validate_draft(&d, now()).unwrap_err();
        assert!(err.starts_with("Unknown event type"));
    }

    #[tokio::test]
    async fn upload_resolves_through_the_image_host() {
        let state = crate::state::AppState::fake();
        let url = resolve_image_url(
            &state,
            Some(UploadedImage {
                body: Bytes::from_static(b"png-bytes"),
                content_type: "image/png".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(url.as_deref(), Some("https://fake.local/image.png"));
    }

    #[tokio::test]
    async fn no_image_means_no_url() {
        let state = crate::state::AppState::fake();
        let url = resolve_image_url(&state, None).await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn unsupported_image_type_is_a_validation_error() {
        let state = crate::state::AppState::fake();
        let err = resolve_image_url(
            &state,
            Some(UploadedImage {
                body: Bytes::from_static(b"zip"),
                content_type: "application/zip".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
