use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Display format used throughout proposal documents: "Mon, Jun 02, 2025"
pub const DISPLAY_DATE_FORMAT: &str = "%a, %b %d, %Y";

/// Numeric date format used by diary exports: "06/02/2025"
pub const DIARY_DATE_FORMAT: &str = "%m/%d/%Y";

/// 12-hour clock format: "9:00 AM"
pub const CLOCK_FORMAT: &str = "%I:%M %p";

/// Outdoor spaces are only usable late May through early October,
/// inclusive on both ends as (month, day).
pub const OUTDOOR_SEASON: ((u32, u32), (u32, u32)) = ((5, 25), (10, 7));

/// Parses a "Mon, Jun 02, 2025" style date
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DISPLAY_DATE_FORMAT).ok()
}

/// Parses a "06/02/2025" style date
pub fn parse_diary_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DIARY_DATE_FORMAT).ok()
}

/// Parses an ISO "2025-06-02" date
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Parses a "9:00 AM" clock reading
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), CLOCK_FORMAT).ok()
}

/// Renders a date back in the proposal display style, without the
/// zero-padded day ("Mon, Jun 2, 2025")
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string().replace(" 0", " ")
}

/// Combines an ISO date with a "H:MM AM-H:MM PM" window into start/end
/// instants. A window that ends at or before its start wraps past midnight
/// into the next day. Returns None when either side fails to parse.
pub fn parse_time_bounds(
    date_iso: Option<&str>,
    time_range: &str,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let date = parse_iso_date(date_iso?)?;
    let parts: Vec<&str> = time_range.split('-').map(str::trim).collect();
    if parts.len() != 2 {
        return None;
    }
    let start_t = parse_clock(parts[0])?;
    let end_t = parse_clock(parts[1])?;
    let start = date.and_time(start_t);
    let mut end = date.and_time(end_t);
    if end <= start {
        end += Duration::days(1);
    }
    Some((start, end))
}

/// Half-open interval overlap: touching endpoints do not conflict
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether the given ISO date falls inside the outdoor event season.
/// Unparsable or missing dates are treated as out of season.
pub fn is_outdoor_season(date_iso: Option<&str>) -> bool {
    let Some(date) = date_iso.and_then(|d| parse_iso_date(d)) else {
        return false;
    };
    let month_day = (date.month(), date.day());
    month_day >= OUTDOOR_SEASON.0 && month_day <= OUTDOOR_SEASON.1
}
