/// Formatting helpers shared by anything that renders backend payloads for humans
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Compact counts: 950, 1.2K, 3.4M
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Interactions per impression, as a percentage. Zero when there were no impressions.
pub fn engagement_rate(likes: u64, comments: u64, shares: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    (likes + comments + shares) as f64 / impressions as f64 * 100.0
}

/// Cuts to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// "Mar 01, 2024 10:00" style rendering of an RFC 3339 timestamp; falls back to the input.
pub fn format_date_time(ts: &str) -> String {
    let parsed = match OffsetDateTime::parse(ts, &Rfc3339) {
        Ok(t) => t,
        Err(_) => return ts.to_string(),
    };
    let fmt = match time::format_description::parse(
        "[month repr:short] [day], [year] [hour]:[minute]",
    ) {
        Ok(f) => f,
        Err(_) => return ts.to_string(),
    };
    parsed.format(&fmt).unwrap_or_else(|_| ts.to_string())
}

/// Human distance between `ts` and `now`, eg "5 minutes ago" or "in about 2 hours".
///
/// Returns `None` if `ts` isn't RFC 3339.
pub fn relative_time(ts: &str, now: OffsetDateTime) -> Option<String> {
    let then = OffsetDateTime::parse(ts, &Rfc3339).ok()?;
    let secs = (now - then).whole_seconds();
    let distance = describe_distance(secs.unsigned_abs());
    if secs >= 0 {
        Some(format!("{distance} ago"))
    } else {
        Some(format!("in {distance}"))
    }
}

pub fn relative_time_now(ts: &str) -> Option<String> {
    relative_time(ts, OffsetDateTime::now_utc())
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn describe_distance(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    match secs {
        s if s < 45 => "less than a minute".to_string(),
        s if s < 90 => "1 minute".to_string(),
        s if s < 45 * MINUTE => plural((s + MINUTE / 2) / MINUTE, "minute"),
        s if s < 90 * MINUTE => "about 1 hour".to_string(),
        s if s < DAY => format!("about {}", plural((s + HOUR / 2) / HOUR, "hour")),
        s if s < 42 * HOUR => "1 day".to_string(),
        s if s < MONTH => plural((s + DAY / 2) / DAY, "day"),
        s if s < 45 * DAY => "about 1 month".to_string(),
        s if s < YEAR => plural((s + MONTH / 2) / MONTH, "month"),
        s => format!("about {}", plural(s / YEAR, "year")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1.0K");
        assert_eq!(format_number(1_240), "1.2K");
        assert_eq!(format_number(48_900), "48.9K");
        assert_eq!(format_number(3_400_000), "3.4M");
    }

    #[test]
    fn engagement() {
        assert_eq!(engagement_rate(10, 5, 5, 0), 0.0);
        assert!((engagement_rate(30, 10, 10, 1000) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("a longer sentence", 8), "a longer...");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn date_time() {
        assert_eq!(format_date_time("2024-03-01T10:05:00Z"), "Mar 01, 2024 10:05");
        assert_eq!(format_date_time("yesterday"), "yesterday");
    }

    #[test]
    fn relative() {
        let now = OffsetDateTime::parse("2024-03-01T12:00:00Z", &Rfc3339).unwrap();
        let rel = |ts: &str| relative_time(ts, now).unwrap();
        assert_eq!(rel("2024-03-01T11:59:50Z"), "less than a minute ago");
        assert_eq!(rel("2024-03-01T11:55:00Z"), "5 minutes ago");
        assert_eq!(rel("2024-03-01T10:00:00Z"), "about 2 hours ago");
        assert_eq!(rel("2024-02-27T12:00:00Z"), "3 days ago");
        assert_eq!(rel("2024-03-01T12:30:00Z"), "in 30 minutes");
        assert_eq!(rel("2021-03-01T12:00:00Z"), "about 3 years ago");
        assert!(relative_time("soon", now).is_none());
    }
}
