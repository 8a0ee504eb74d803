use serde::Serialize;
use time::OffsetDateTime;

/// Time left until an event, decomposed for display. Negative remaining time
/// clamps to all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

pub fn remaining(full_date: OffsetDateTime, now: OffsetDateTime) -> Countdown {
    let diff = (full_date - now).whole_seconds().max(0);
    Countdown {
        days: diff / 86_400,
        hours: (diff / 3_600) % 24,
        minutes: (diff / 60) % 60,
        seconds: diff % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn at(now: OffsetDateTime, ahead: Duration) -> Countdown {
        remaining(now + ahead, now)
    }

    #[test]
    fn decomposes_units_modulo_parent() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let c = at(
            now,
            Duration::days(2) + Duration::hours(3) + Duration::minutes(4) + Duration::seconds(5),
        );
        assert_eq!(
            c,
            Countdown {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
    }

    #[test]
    fn rolls_over_at_unit_boundaries() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let c = at(now, Duration::hours(25));
        assert_eq!(c.days, 1);
        assert_eq!(c.hours, 1);
        assert_eq!(c.minutes, 0);

        let c = at(now, Duration::seconds(3_600));
        assert_eq!(c.hours, 1);
        assert_eq!(c.seconds, 0);
    }

    #[test]
    fn past_events_clamp_to_zero() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let c = remaining(now - Duration::days(3), now);
        assert_eq!(
            c,
            Countdown {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn exact_instant_is_zero() {
        let now = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(remaining(now, now).seconds, 0);
    }
}
