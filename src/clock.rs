//! Time source and midnight arithmetic.
//!
//! The refresher never asks the OS for the time directly. It goes through a
//! [`Clock`], so tests can pin "now" to a specific instant and step it
//! forward across day boundaries.
//!
//! ## DST
//!
//! The wait until the next refresh is always recomputed from a fresh "now"
//! and the next local midnight, never by adding 24h to the previous wake-up.
//! On transition days that wait is 23h or 25h. In zones where a transition
//! skips midnight itself, the next refresh happens at the first local time
//! that exists on the new day.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Mutex;
use std::time::Duration;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Current calendar date in `tz`.
pub fn today(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    clock.now().with_timezone(&tz).date_naive()
}

/// The first instant of the local day after `now`.
pub fn next_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    let local = now.with_timezone(&tz);
    let tomorrow = local
        .date_naive()
        .succ_opt()
        .unwrap_or_else(|| local.date_naive());
    let midnight = tomorrow.and_time(chrono::NaiveTime::MIN);

    // A transition can skip local midnight; walk forward to the first
    // wall-clock time that exists on that day.
    (0..=24 * 4)
        .map(|quarter| midnight + ChronoDuration::minutes(15 * quarter))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| (now + ChronoDuration::days(1)).with_timezone(&tz))
}

/// How long to sleep from `now` until the next local midnight in `tz`.
pub fn until_next_midnight(now: DateTime<Utc>, tz: Tz) -> Duration {
    let target = next_midnight(now, tz).with_timezone(&Utc);
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    const HOUR: u64 = 3600;

    #[test]
    fn today_uses_configured_timezone() {
        // 23:30 UTC is already the next day in Berlin
        let clock = FixedClock::new(utc("2024-01-01T23:30:00Z"));
        assert_eq!(
            today(&clock, chrono_tz::Europe::Berlin),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(
            today(&clock, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn ordinary_day_is_remainder_of_day() {
        let now = utc("2024-01-15T18:00:00Z");
        assert_eq!(
            until_next_midnight(now, chrono_tz::UTC),
            Duration::from_secs(6 * HOUR)
        );
    }

    #[test]
    fn exactly_midnight_waits_a_full_day() {
        let now = utc("2024-01-15T00:00:00Z");
        assert_eq!(
            until_next_midnight(now, chrono_tz::UTC),
            Duration::from_secs(24 * HOUR)
        );
    }

    #[test]
    fn spring_forward_day_is_23_hours() {
        // Berlin local midnight, 2024-03-31 (CET, +01:00)
        let now = utc("2024-03-30T23:00:00Z");
        assert_eq!(
            until_next_midnight(now, chrono_tz::Europe::Berlin),
            Duration::from_secs(23 * HOUR)
        );
    }

    #[test]
    fn fall_back_day_is_25_hours() {
        // Berlin local midnight, 2024-10-27 (CEST, +02:00)
        let now = utc("2024-10-26T22:00:00Z");
        assert_eq!(
            until_next_midnight(now, chrono_tz::Europe::Berlin),
            Duration::from_secs(25 * HOUR)
        );
    }

    #[test]
    fn skipped_midnight_lands_on_first_valid_time() {
        // Sao Paulo jumped from 00:00 to 01:00 on 2018-11-04
        let now = utc("2018-11-03T15:00:00Z");
        let next = next_midnight(now, chrono_tz::America::Sao_Paulo);
        assert_eq!(next.with_timezone(&Utc), utc("2018-11-04T03:00:00Z"));
        assert_eq!(
            next.date_naive(),
            NaiveDate::from_ymd_opt(2018, 11, 4).unwrap()
        );
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(utc("2024-01-01T00:00:00Z"));
        clock.advance(ChronoDuration::hours(25));
        assert_eq!(clock.now(), utc("2024-01-02T01:00:00Z"));
        clock.set(utc("2030-05-05T05:05:05Z"));
        assert_eq!(clock.now(), utc("2030-05-05T05:05:05Z"));
    }
}
