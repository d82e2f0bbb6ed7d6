use chrono::{DateTime, Days, Duration, TimeZone, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooldownStatus {
    pub eligible: bool,
    pub remaining: Duration,
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl CooldownStatus {
    fn ready() -> Self {
        Self {
            eligible: true,
            remaining: Duration::zero(),
            next_eligible_at: None,
        }
    }

    /// Whole seconds left, rounded up so an ineligible user never sees zero.
    pub fn remaining_seconds(&self) -> i64 {
        (self.remaining.num_milliseconds().max(0) + 999) / 1000
    }

    /// `HH:MM:SS` label for a live countdown.
    pub fn countdown(&self) -> String {
        let total_seconds = self.remaining_seconds();

        format!(
            "{:02}:{:02}:{:02}",
            total_seconds / 3600,
            (total_seconds / 60) % 60,
            total_seconds % 60
        )
    }
}

/// One calendar day after `last_attempt`, computed on the local date in `Tz`.
///
/// When the shifted local time does not exist (or is ambiguous) in `Tz`, falls
/// back to 24 elapsed hours.
pub fn next_eligible_at<Tz: TimeZone>(last_attempt: &DateTime<Tz>) -> DateTime<Tz> {
    last_attempt
        .clone()
        .checked_add_days(Days::new(1))
        .or_else(|| last_attempt.clone().checked_add_signed(Duration::days(1)))
        // Only reachable at the edge of the representable range.
        .unwrap_or_else(|| last_attempt.clone())
}

/// Decides whether a new gated attempt may start at `now`.
///
/// Pure: evaluating it never touches stored state, so a presentation layer may
/// poll it on a timer.
pub fn check_cooldown<Tz: TimeZone>(
    last_attempt: Option<DateTime<Tz>>,
    now: DateTime<Tz>,
) -> CooldownStatus {
    let Some(last_attempt) = last_attempt else {
        return CooldownStatus::ready();
    };

    let next = next_eligible_at(&last_attempt);
    let remaining = next
        .clone()
        .signed_duration_since(now)
        .max(Duration::zero());

    CooldownStatus {
        eligible: remaining == Duration::zero(),
        remaining,
        next_eligible_at: Some(next.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn no_previous_attempt_is_always_eligible() {
        let status = check_cooldown(None, at("2024-03-10T12:00:00Z"));

        assert!(status.eligible);
        assert_eq!(status.remaining, Duration::zero());
        assert!(status.next_eligible_at.is_none());
        assert_eq!(status.countdown(), "00:00:00");
    }

    #[test]
    fn exactly_one_day_later_is_eligible_with_nothing_remaining() {
        let last = at("2024-03-10T12:00:00Z");

        let status = check_cooldown(Some(last), last + Duration::hours(24));

        assert!(status.eligible);
        assert_eq!(status.remaining, Duration::zero());
        assert_eq!(status.next_eligible_at, Some(at("2024-03-11T12:00:00Z")));
    }

    #[test]
    fn one_minute_short_is_not_eligible() {
        let last = at("2024-03-10T12:00:00Z");

        let status = check_cooldown(
            Some(last),
            last + Duration::hours(23) + Duration::minutes(59),
        );

        assert!(!status.eligible);
        assert_eq!(status.remaining, Duration::minutes(1));
        assert_eq!(status.countdown(), "00:01:00");
    }

    #[test]
    fn attempt_twenty_five_hours_ago_is_eligible() {
        let now = at("2024-03-10T12:00:00Z");

        let status = check_cooldown(Some(now - Duration::hours(25)), now);

        assert!(status.eligible);
        assert_eq!(status.remaining, Duration::zero());
    }

    #[test]
    fn calendar_day_add_crosses_month_and_year_boundaries() {
        assert_eq!(
            next_eligible_at(&at("2024-01-31T23:30:00Z")),
            at("2024-02-01T23:30:00Z")
        );
        assert_eq!(
            next_eligible_at(&at("2024-02-28T08:00:00Z")),
            at("2024-02-29T08:00:00Z")
        );
        assert_eq!(
            next_eligible_at(&at("2023-12-31T10:00:00Z")),
            at("2024-01-01T10:00:00Z")
        );
    }

    #[test]
    fn works_in_a_fixed_offset_zone() {
        let zone = FixedOffset::east_opt(5 * 3600).unwrap();
        let last = zone.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap();
        let now = zone.with_ymd_and_hms(2024, 7, 1, 20, 0, 0).unwrap();

        let status = check_cooldown(Some(last), now);

        assert!(!status.eligible);
        assert_eq!(status.remaining, Duration::hours(3));
        assert_eq!(status.countdown(), "03:00:00");
    }

    #[test]
    fn countdown_rounds_partial_seconds_up() {
        let last = at("2024-03-10T12:00:00Z");
        let now = last + Duration::hours(24) - Duration::milliseconds(400);

        let status = check_cooldown(Some(last), now);

        assert!(!status.eligible);
        assert_eq!(status.countdown(), "00:00:01");
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let last = at("2024-03-10T12:00:00Z");
        let now = last + Duration::hours(3);

        let first = check_cooldown(Some(last), now);
        let second = check_cooldown(Some(last), now);

        assert_eq!(first, second);
        assert_eq!(first.remaining, Duration::hours(21));
    }
}
