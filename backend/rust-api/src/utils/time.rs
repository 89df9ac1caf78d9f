use chrono::{DateTime, Utc};

/// Milliseconds elapsed since `started_at`. Negative if the clock stepped back.
pub fn elapsed_ms(now: DateTime<Utc>, started_at: DateTime<Utc>) -> i64 {
    (now - started_at).num_milliseconds()
}

pub fn duration_ms(duration_seconds: u32) -> i64 {
    i64::from(duration_seconds) * 1000
}

/// The window is `[started_at, started_at + duration)`: reaching the
/// duration exactly already counts as closed.
pub fn window_closed(now: DateTime<Utc>, started_at: DateTime<Utc>, duration_seconds: u32) -> bool {
    elapsed_ms(now, started_at) >= duration_ms(duration_seconds)
}

/// `max(duration - (now - started_at), 0)` in milliseconds.
pub fn remaining_ms(now: DateTime<Utc>, started_at: DateTime<Utc>, duration_seconds: u32) -> i64 {
    (duration_ms(duration_seconds) - elapsed_ms(now, started_at)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn boundary_counts_as_closed() {
        assert!(!window_closed(t0() + Duration::milliseconds(9_999), t0(), 10));
        assert!(window_closed(t0() + Duration::seconds(10), t0(), 10));
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_ms(t0() + Duration::seconds(4), t0(), 10), 6_000);
        assert_eq!(remaining_ms(t0() + Duration::seconds(40), t0(), 10), 0);
        assert_eq!(remaining_ms(t0() - Duration::seconds(1), t0(), 10), 11_000);
    }
}
