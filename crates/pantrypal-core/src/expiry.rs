use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Items expiring within this many days are alert-worthy.
pub const CRITICAL_WINDOW_DAYS: i64 = 3;

/// Urgency bucket for an item's expiry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Zero or fewer days left.
    Expired,
    /// One to three days left.
    Critical,
    /// More than three days left; not alert-worthy.
    Normal,
}

impl Severity {
    pub fn from_days(days_until_expiry: i64) -> Self {
        if days_until_expiry <= 0 {
            Severity::Expired
        } else if days_until_expiry <= CRITICAL_WINDOW_DAYS {
            Severity::Critical
        } else {
            Severity::Normal
        }
    }

    /// Expired and Critical items show up in the alert list; Normal ones
    /// don't.
    pub fn is_alert(&self) -> bool {
        !matches!(self, Severity::Normal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Expired => "Expired",
            Severity::Critical => "Critical",
            Severity::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of classifying one expiry date against a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub days_until_expiry: i64,
    pub severity: Severity,
}

/// Classify an expiry date against `now`.
///
/// Day counting is calendar-granular: the distance to the expiry date's
/// midnight is divided into whole days and any remaining partial day rounds
/// up toward the later boundary. An item expiring today therefore lands on
/// zero days (already Expired), and one expiring tomorrow on one day, no
/// matter what time of day it is.
pub fn classify(expiry: NaiveDate, now: DateTime<Utc>) -> Classification {
    let expiry_midnight = expiry.and_time(NaiveTime::MIN).and_utc();
    let secs = (expiry_midnight - now).num_seconds();

    // Ceiling division that behaves for negative distances too.
    let days_until_expiry = secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) > 0);

    Classification {
        days_until_expiry,
        severity: Severity::from_days(days_until_expiry),
    }
}

/// Parse-then-classify front door for raw `YYYY-MM-DD` strings coming off
/// the wire or user input.
pub fn classify_str(raw: &str, now: DateTime<Utc>) -> Result<Classification> {
    let expiry = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_string()))?;
    Ok(classify(expiry, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn noon(s: &str) -> DateTime<Utc> {
        let d = date(s);
        Utc.from_utc_datetime(&d.and_hms_opt(12, 0, 0).unwrap())
    }

    #[test]
    fn expiry_today_is_zero_days_and_expired() {
        let c = classify(date("2026-08-27"), noon("2026-08-27"));
        assert_eq!(c.days_until_expiry, 0);
        assert_eq!(c.severity, Severity::Expired);
    }

    #[test]
    fn partial_day_rounds_up_to_tomorrow() {
        let c = classify(date("2026-08-28"), noon("2026-08-27"));
        assert_eq!(c.days_until_expiry, 1);
        assert_eq!(c.severity, Severity::Critical);
    }

    #[test]
    fn exactly_midnight_does_not_round() {
        let now = Utc.from_utc_datetime(&date("2026-08-27").and_hms_opt(0, 0, 0).unwrap());
        let c = classify(date("2026-08-30"), now);
        assert_eq!(c.days_until_expiry, 3);
        assert_eq!(c.severity, Severity::Critical);
    }

    #[test]
    fn three_day_window_is_critical_four_is_normal() {
        assert_eq!(
            classify(date("2026-08-30"), noon("2026-08-27")).severity,
            Severity::Critical
        );
        assert_eq!(
            classify(date("2026-08-31"), noon("2026-08-27")).severity,
            Severity::Normal
        );
    }

    #[test]
    fn past_dates_go_negative_and_expired() {
        let c = classify(date("2026-08-20"), noon("2026-08-27"));
        assert_eq!(c.days_until_expiry, -7);
        assert_eq!(c.severity, Severity::Expired);
    }

    #[test]
    fn expired_iff_days_at_most_zero() {
        // Sweep a month around "now" and check the biconditional from both
        // sides.
        let now = noon("2026-08-27");
        for offset in -15i64..=15 {
            let d = date("2026-08-27") + chrono::Duration::days(offset);
            let c = classify(d, now);
            assert_eq!(
                c.severity == Severity::Expired,
                c.days_until_expiry <= 0,
                "offset {}",
                offset
            );
        }
    }

    #[test]
    fn classify_str_rejects_garbage() {
        assert!(matches!(
            classify_str("soonish", noon("2026-08-27")),
            Err(Error::InvalidDate(_))
        ));
        assert!(classify_str("2026-09-01", noon("2026-08-27")).is_ok());
    }

    #[test]
    fn severity_alert_flag() {
        assert!(Severity::Expired.is_alert());
        assert!(Severity::Critical.is_alert());
        assert!(!Severity::Normal.is_alert());
    }
}
