use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Strict clock-time pattern tried before any generic parsing.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Date attached to bare clock times so they can live on a datetime axis.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

// ── Clock time ────────────────────────────────────────────────────────────────

/// Parse `s` against [`CLOCK_FORMAT`] only.
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), CLOCK_FORMAT).ok()
}

/// Attach a bare clock time to [`base_date`].
pub fn on_base_date(time: NaiveTime) -> NaiveDateTime {
    base_date().and_time(time)
}

/// Best-effort parse of a date and/or time string.
///
/// Accepts ISO 8601 / RFC 3339 timestamps, day-first dates as written in
/// Brazilian spreadsheets, and bare clock times with optional fractional
/// seconds or AM/PM. Bare times land on [`base_date`], bare dates at midnight.
pub fn parse_datetime_generic(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    const DATETIME_FMTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S%.f",
        "%d/%m/%Y %H:%M:%S%.f",
        "%d/%m/%Y %H:%M",
        "%d-%m-%Y %H:%M:%S%.f",
    ];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    const TIME_FMTS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];
    for fmt in TIME_FMTS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(on_base_date(t));
        }
    }

    const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

// ── Elapsed durations ─────────────────────────────────────────────────────────

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(-)?\s*(?:(\d+)\s*days?,?\s*)?(?:\+?(\d+):(\d{1,2}):(\d{1,2}(?:\.\d+)?))?\s*$",
        )
        .expect("duration pattern is valid")
    })
}

/// Parse an elapsed duration (`HH:MM:SS`, `D days HH:MM:SS[.f]`, `D days`)
/// into total minutes. Hours may exceed 23.
pub fn parse_elapsed_minutes(s: &str) -> Option<f64> {
    let caps = duration_regex().captures(s)?;
    let days = caps.get(2);
    let clock = caps.get(3);
    if days.is_none() && clock.is_none() {
        return None;
    }

    let num = |i: usize| -> f64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    let minutes = num(2) * 1440.0 + num(3) * 60.0 + num(4) + num(5) / 60.0;
    Some(if caps.get(1).is_some() {
        -minutes
    } else {
        minutes
    })
}

/// `D days HH:MM:SS`, the textual form elapsed-duration parsing accepts back.
pub fn format_duration(d: TimeDelta) -> String {
    let negative = d < TimeDelta::zero();
    let total = d.num_seconds().abs();
    let days = total / 86_400;
    let rem = total % 86_400;
    let text = format!(
        "{} days {:02}:{:02}:{:02}",
        days,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    );
    if negative {
        format!("-{}", text)
    } else {
        text
    }
}

// ── Axis coordinates ──────────────────────────────────────────────────────────

/// Plot coordinate of an absolute timestamp: seconds since the Unix epoch.
pub fn datetime_to_axis(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64 / 1000.0
}

/// Inverse of [`datetime_to_axis`].
pub fn axis_to_datetime(x: f64) -> Option<NaiveDateTime> {
    if !x.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((x * 1000.0).round() as i64).map(|d| d.naive_utc())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
