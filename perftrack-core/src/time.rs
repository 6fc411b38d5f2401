//! Time utilities: lenient timestamp parsing and timezone-aware "today".

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar date of `now` in an IANA tz like "America/Chicago".
pub fn today_in(tz: &str, now: DateTime<Utc>) -> Result<NaiveDate> {
    let tz = parse_tz(tz)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Parse the timestamp spellings seen in task exports.
///
/// Accepts RFC3339 (`2026-02-20T10:00:00.000Z`), a naive datetime
/// (`2026-02-20T10:00:00`, read as UTC) and a bare date (`2026-02-20`,
/// midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN).and_utc());
    }
    anyhow::bail!("invalid timestamp '{s}'")
}

/// Normalize any accepted timestamp to its UTC calendar date.
pub fn normalize_date(s: &str) -> Result<NaiveDate> {
    Ok(parse_timestamp(s)?.date_naive())
}
