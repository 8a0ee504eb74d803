use serde::{Deserialize, Serialize};

/// Lifecycle stage of an event. Stored as text; only these five values ever
/// reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    PendingHead,
    PendingAdmin,
    Approved,
    RejectedByHead,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::PendingHead => "pending_head",
            EventStatus::PendingAdmin => "pending_admin",
            EventStatus::Approved => "approved",
            EventStatus::RejectedByHead => "rejected_by_head",
            EventStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<EventStatus> {
        match raw {
            "pending_head" => Some(EventStatus::PendingHead),
            "pending_admin" => Some(EventStatus::PendingAdmin),
            "approved" => Some(EventStatus::Approved),
            "rejected_by_head" => Some(EventStatus::RejectedByHead),
            "rejected" => Some(EventStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventStatus::Approved | EventStatus::RejectedByHead | EventStatus::Rejected
        )
    }
}

/// Moderation actions and the single edge each one is allowed to take.
/// Transitions are guarded in the store with the expected source status, so a
/// lost race surfaces as a conflict instead of a silent overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    HeadApprove,
    HeadReject,
    AdminApprove,
    AdminReject,
}

impl ModerationAction {
    pub fn expected_from(&self) -> EventStatus {
        match self {
            ModerationAction::HeadApprove | ModerationAction::HeadReject => {
                EventStatus::PendingHead
            }
            ModerationAction::AdminApprove | ModerationAction::AdminReject => {
                EventStatus::PendingAdmin
            }
        }
    }

    pub fn target(&self) -> EventStatus {
        match self {
            ModerationAction::HeadApprove => EventStatus::PendingAdmin,
            ModerationAction::HeadReject => EventStatus::RejectedByHead,
            ModerationAction::AdminApprove => EventStatus::Approved,
            ModerationAction::AdminReject => EventStatus::Rejected,
        }
    }
}

/// Type of occurrence being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Expo,
    Forum,
    Hackathon,
    Workshop,
    Conference,
    Meeting,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Expo => "expo",
            EventType::Forum => "forum",
            EventType::Hackathon => "hackathon",
            EventType::Workshop => "workshop",
            EventType::Conference => "conference",
            EventType::Meeting => "meeting",
            EventType::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<EventType> {
        match raw.trim().to_lowercase().as_str() {
            "expo" => Some(EventType::Expo),
            "forum" => Some(EventType::Forum),
            "hackathon" => Some(EventType::Hackathon),
            "workshop" => Some(EventType::Workshop),
            "conference" => Some(EventType::Conference),
            "meeting" => Some(EventType::Meeting),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in [
            EventStatus::PendingHead,
            EventStatus::PendingAdmin,
            EventStatus::Approved,
            EventStatus::RejectedByHead,
            EventStatus::Rejected,
        ] {
            assert_eq!(EventStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(EventStatus::parse("draft"), None);
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use ModerationAction::*;
        assert_eq!(HeadApprove.expected_from(), EventStatus::PendingHead);
        assert_eq!(HeadApprove.target(), EventStatus::PendingAdmin);
        assert_eq!(HeadReject.expected_from(), EventStatus::PendingHead);
        assert_eq!(HeadReject.target(), EventStatus::RejectedByHead);
        assert_eq!(AdminApprove.expected_from(), EventStatus::PendingAdmin);
        assert_eq!(AdminApprove.target(), EventStatus::Approved);
        assert_eq!(AdminReject.expected_from(), EventStatus::PendingAdmin);
        assert_eq!(AdminReject.target(), EventStatus::Rejected);
    }

    #[test]
    fn approval_cannot_skip_the_head_stage() {
        // The only action producing Approved starts from PendingAdmin, and
        // the only action producing PendingAdmin starts from PendingHead.
        let to_approved: Vec<_> = [
            ModerationAction::HeadApprove,
            ModerationAction::HeadReject,
            ModerationAction::AdminApprove,
            ModerationAction::AdminReject,
        ]
        .into_iter()
        .filter(|a| a.target() == EventStatus::Approved)
        .collect();
        assert_eq!(to_approved, vec![ModerationAction::AdminApprove]);
        assert_eq!(
            ModerationAction::AdminApprove.expected_from(),
            EventStatus::PendingAdmin
        );
        assert_eq!(
            ModerationAction::HeadApprove.target(),
            EventStatus::PendingAdmin
        );
    }

    #[test]
    fn rejections_are_terminal() {
        assert!(EventStatus::RejectedByHead.is_terminal());
        assert!(EventStatus::Rejected.is_terminal());
        assert!(EventStatus::Approved.is_terminal());
        assert!(!EventStatus::PendingHead.is_terminal());
        assert!(!EventStatus::PendingAdmin.is_terminal());
    }

    #[test]
    fn event_type_parses_known_values_only() {
        assert_eq!(EventType::parse("expo"), Some(EventType::Expo));
        assert_eq!(EventType::parse(" Conference "), Some(EventType::Conference));
        assert_eq!(EventType::parse("OTHER"), Some(EventType::Other));
        assert_eq!(EventType::parse("concert"), None);
        assert_eq!(EventType::parse(""), None);
    }
}
