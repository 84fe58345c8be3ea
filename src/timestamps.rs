use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bangladesh Standard Time, UTC+06:00 with no daylight saving.
const BST_OFFSET_SECS: i32 = 6 * 3600;

// e.g. "Last update on: Sun Oct 19, 2025 11:32 AM"
static PORTAL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z]{3}\s+([a-z]{3})\s+(\d{1,2}),\s*(\d{4})\s+(\d{1,2}:\d{2})\s*([ap]m)")
        .unwrap()
});

/// Epoch milliseconds as RFC 3339 UTC with a trailing `Z`. Fractional
/// seconds appear only when non-zero.
pub fn from_epoch_millis(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}

/// Normalize a scraped timestamp to UTC RFC 3339, or empty when the input
/// has no recognizable shape. Zone-less inputs are read as Dhaka local time.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return to_utc_string(dt);
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return from_dhaka_local(naive);
        }
    }

    if let Some(caps) = PORTAL_DATE_RE.captures(raw) {
        let cleaned = format!(
            "{} {} {} {} {}",
            &caps[1], &caps[2], &caps[3], &caps[4], &caps[5].to_uppercase()
        );
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, "%b %d %Y %I:%M %p") {
            return from_dhaka_local(naive);
        }
    }

    String::new()
}

fn from_dhaka_local(naive: NaiveDateTime) -> String {
    FixedOffset::east_opt(BST_OFFSET_SECS)
        .and_then(|tz| tz.from_local_datetime(&naive).single())
        .map(to_utc_string)
        .unwrap_or_default()
}

fn to_utc_string(dt: DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis_to_utc() {
        assert_eq!(from_epoch_millis(1_700_000_000_000), "2023-11-14T22:13:20Z");
        assert_eq!(from_epoch_millis(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_epoch_millis_keeps_fraction() {
        assert_eq!(from_epoch_millis(1_700_000_000_250), "2023-11-14T22:13:20.250Z");
    }

    #[test]
    fn test_rfc3339_is_converted_to_utc() {
        assert_eq!(normalize("2025-10-19T10:30:00+06:00"), "2025-10-19T04:30:00Z");
        assert_eq!(normalize("2025-10-19T04:30:00Z"), "2025-10-19T04:30:00Z");
    }

    #[test]
    fn test_plain_datetime_is_dhaka_time() {
        assert_eq!(normalize("2025-10-19 10:30:00"), "2025-10-19T04:30:00Z");
    }

    #[test]
    fn test_portal_style_date() {
        assert_eq!(
            normalize("Last update on: Sun Oct 19, 2025 11:32 AM"),
            "2025-10-19T05:32:00Z"
        );
        assert_eq!(normalize("Sun Oct 19, 2025 01:05 am"), "2025-10-18T19:05:00Z");
    }

    #[test]
    fn test_unknown_shapes_are_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("2 hours ago"), "");
    }
}
