//! Deadline arithmetic for configured waits.

use std::time::{Duration, Instant};

/// Longest wait ever scheduled. Longer requests are clamped to it.
pub(crate) const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `now + after`, clamped so that an absurd duration cannot overflow the
/// platform's `Instant`.
pub(crate) fn deadline(now: Instant, after: Duration) -> Instant {
    now.checked_add(after.min(MAX_WAIT)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_durations_are_exact() {
        let now = Instant::now();
        assert_eq!(deadline(now, Duration::from_secs(5)), now + Duration::from_secs(5));
    }

    #[test]
    fn huge_durations_are_clamped() {
        let now = Instant::now();
        let due = deadline(now, Duration::MAX);
        assert!(due > now);
        assert!(due <= now + MAX_WAIT);
    }
}
