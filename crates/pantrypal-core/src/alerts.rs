// Alert ranking - the one computation every page used to redo by hand
use chrono::{DateTime, Utc};

use crate::expiry::classify;
use crate::models::{AlertEntry, PantryItem};

/// Build the expiry-alert list for the given items.
///
/// Keeps only Expired and Critical entries (at most three days left),
/// ordered most-urgent-first with item name as the deterministic
/// tie-break. Pure and recomputed per call; callers pick their own refresh
/// cadence.
pub fn build_alerts(items: &[PantryItem], now: DateTime<Utc>) -> Vec<AlertEntry> {
    let mut alerts: Vec<AlertEntry> = items
        .iter()
        .filter_map(|item| {
            let expiry = item.expiry_date.as_date()?;
            let c = classify(expiry, now);
            c.severity.is_alert().then(|| AlertEntry {
                item: item.clone(),
                days_until_expiry: c.days_until_expiry,
                severity: c.severity,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.days_until_expiry
            .cmp(&b.days_until_expiry)
            .then_with(|| a.item.name.cmp(&b.item.name))
    });

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::Severity;
    use crate::models::{Category, ExpiryDate, Unit};
    use chrono::{NaiveDate, TimeZone};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.from_utc_datetime(&date("2026-08-27").and_hms_opt(12, 0, 0).unwrap())
    }

    fn item(name: &str, expiry: &str) -> PantryItem {
        PantryItem {
            id: name.to_lowercase(),
            name: name.into(),
            quantity: 1.0,
            unit: Unit::Pieces,
            category: Category::General,
            expiry_date: ExpiryDate::Date(date(expiry)),
            added_date: date("2026-08-20"),
            notes: None,
        }
    }

    #[test]
    fn keeps_only_items_within_the_window() {
        let items = vec![item("Milk", "2026-08-28"), item("Rice", "2026-09-06")];
        let alerts = build_alerts(&items, now());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].item.name, "Milk");
        assert_eq!(alerts[0].days_until_expiry, 1);
    }

    #[test]
    fn sorted_most_urgent_first() {
        let items = vec![
            item("Bread", "2026-08-29"),
            item("Yogurt", "2026-08-25"),
            item("Cheese", "2026-08-28"),
        ];
        let alerts = build_alerts(&items, now());

        let names: Vec<&str> = alerts.iter().map(|a| a.item.name.as_str()).collect();
        assert_eq!(names, vec!["Yogurt", "Cheese", "Bread"]);
        assert!(alerts.windows(2).all(|w| w[0].days_until_expiry <= w[1].days_until_expiry));
        assert!(alerts.iter().all(|a| a.days_until_expiry <= 3));
    }

    #[test]
    fn ties_break_on_name() {
        let items = vec![
            item("Zucchini", "2026-08-28"),
            item("Apple", "2026-08-28"),
            item("Mango", "2026-08-28"),
        ];
        let alerts = build_alerts(&items, now());

        let names: Vec<&str> = alerts.iter().map(|a| a.item.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Mango", "Zucchini"]);
    }

    #[test]
    fn expired_items_carry_expired_severity() {
        let items = vec![item("Old Milk", "2026-08-20")];
        let alerts = build_alerts(&items, now());

        assert_eq!(alerts[0].severity, Severity::Expired);
        assert_eq!(alerts[0].days_until_expiry, -7);
    }

    #[test]
    fn unresolved_auto_items_are_skipped() {
        let mut pending = item("Mystery", "2026-08-27");
        pending.expiry_date = ExpiryDate::Auto;
        let alerts = build_alerts(&[pending], now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn empty_pantry_means_no_alerts() {
        assert!(build_alerts(&[], now()).is_empty());
    }
}
