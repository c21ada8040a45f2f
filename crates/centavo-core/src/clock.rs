//! Timezone-aware time handling for period calculations.
//!
//! All "today" / "this week" / "this month" boundaries are computed in the
//! timezone named by the settings overlay (IANA name, e.g.
//! "America/Bogota"). Unknown names fall back to UTC rather than erroring.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve an IANA timezone name, falling back to UTC for unknown names.
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// The current instant, localized.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Parse a stored record timestamp.
///
/// Records carry RFC 3339 timestamps with an offset; naive timestamps (from
/// hand-edited or legacy files) are interpreted in the configured timezone.
pub fn parse_stored(s: &str, tz: Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&tz));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    tz.from_local_datetime(&naive).earliest()
}

/// `2025-11-12`-style key for day grouping.
pub fn day_key(dt: &DateTime<Tz>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `2025-11`-style key for month grouping.
pub fn month_key(dt: &DateTime<Tz>) -> String {
    dt.format("%Y-%m").to_string()
}

/// Whether `input` is a valid `YYYY-MM` month key.
pub fn is_month_key(input: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d").is_ok()
}

/// Monday 00:00 of the week containing `now`, in `now`'s timezone.
pub fn start_of_week(now: DateTime<Tz>) -> DateTime<Tz> {
    let days_from_monday = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - Duration::days(days_from_monday);
    let midnight = monday.and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(dt) => dt,
        // Midnight does not exist locally (DST gap): degrade to now
        None => now,
    }
}

/// Parse a user-entered due date: `YYYY-MM-DD` or the keywords
/// `hoy` / `ayer` / `mañana`.
pub fn parse_due_date(input: &str, tz: Tz) -> Option<NaiveDate> {
    let today = now_in(tz).date_naive();
    match input.trim().to_lowercase().as_str() {
        "hoy" => Some(today),
        "ayer" => Some(today - Duration::days(1)),
        "mañana" | "manana" => Some(today + Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    }
}
