//! Cadence due-ness.

use chrono::{DateTime, Duration, Utc};
use pulsecheck_core::Cadence;

/// Whether a subscription is due to run at `now`.
///
/// A subscription that has never run is due immediately. Otherwise it is due
/// once the cadence interval has fully elapsed; exactly on the boundary
/// counts.
#[must_use]
pub fn is_due(cadence: Cadence, last_run_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_run_at {
        None => true,
        Some(last) => now - last >= Duration::hours(cadence.interval_hours()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_run_is_due() {
        assert!(is_due(Cadence::Daily, None, Utc::now()));
    }

    #[test]
    fn daily_not_due_after_twenty_three_hours() {
        let now = Utc::now();
        assert!(!is_due(Cadence::Daily, Some(now - Duration::hours(23)), now));
    }

    #[test]
    fn daily_due_exactly_at_twenty_four_hours() {
        let now = Utc::now();
        assert!(is_due(Cadence::Daily, Some(now - Duration::hours(24)), now));
    }

    #[test]
    fn weekly_due_after_a_week() {
        let now = Utc::now();
        assert!(!is_due(Cadence::Weekly, Some(now - Duration::hours(167)), now));
        assert!(is_due(Cadence::Weekly, Some(now - Duration::hours(168)), now));
    }

    #[test]
    fn monthly_due_after_thirty_days() {
        let now = Utc::now();
        assert!(!is_due(Cadence::Monthly, Some(now - Duration::hours(719)), now));
        assert!(is_due(Cadence::Monthly, Some(now - Duration::hours(720)), now));
    }
}
