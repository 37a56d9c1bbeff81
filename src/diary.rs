use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::{
    format_display_date, parse_clock, parse_diary_date, parse_display_date, parse_time_bounds,
};
use crate::pdf::extract_pdf_text;
use crate::rooms::RoomDirectory;
use crate::text::{clean_inline_whitespace, normalize};

pub const UNKNOWN_GROUP: &str = "Unknown Group";
pub const UNKNOWN_SALESPERSON: &str = "Unknown Salesperson";

/// One existing booking from the function-diary export. Rebuilt on every
/// upload, never persisted.
#[derive(Debug, Clone)]
pub struct DiaryEntry {
    pub room_name: String,
    pub date_iso: Option<String>,
    pub date_display: String,
    pub time_range: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub group_name: String,
    pub salesperson: String,
}

/// Column headers the tabular export must carry, lower-cased
const REQUIRED_DIARY_COLUMNS: &[&str] = &[
    "function room",
    "start date",
    "start time 12 hour",
    "end date",
    "end time 12 hour",
    "booking: owner name",
    "booking: booking post as",
];

static TABLE_ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr>(.*?)</tr>").unwrap());
static TH_CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<th[^>]*>(.*?)</th>").unwrap());
static TD_CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap());

static DIARY_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(Mon|Tue|Wed|Thu|Fri|Sat|Sun),\s+([A-Za-z]{3}\s+\d{1,2},\s+\d{4}).*?(\d{1,2}:\d{2}\s*[AP]M-\d{1,2}:\d{2}\s*[AP]M)",
    )
    .unwrap()
});
static GROUP_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Group Name|Group|Event Name|Account Name)\s*[:\-]?\s*(.+)").unwrap()
});
static SALES_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Salesperson|Sales Manager|Booked By|Catering Sales)\s*[:\-]?\s*(.+)").unwrap()
});

/// Normalizes an availability export into diary entries, sniffing the
/// format: an HTML table export takes the tabular strategy, a `.pdf` upload
/// is page-extracted first, anything else is scanned as columnar text.
/// A diary that defeats every strategy yields zero entries, never an error.
pub fn parse_diary_upload(
    diary_bytes: &[u8],
    filename: &str,
    rooms: &RoomDirectory,
) -> Vec<DiaryEntry> {
    // The "xls" diary export is really HTML table content
    let raw: String = diary_bytes.iter().map(|&b| b as char).collect();
    let lower = raw.to_lowercase();
    if lower.contains("<table")
        && lower.contains("booking event: name")
        && lower.contains("function room")
    {
        let entries = parse_diary_table(&raw, rooms);
        if !entries.is_empty() {
            return entries;
        }
    }
    if filename.to_lowercase().ends_with(".pdf") {
        return match extract_pdf_text(diary_bytes) {
            Ok(text) => parse_diary_text(&text, rooms),
            Err(err) => {
                log::warn!("diary page extraction failed, continuing without it: {}", err);
                Vec::new()
            }
        };
    }
    parse_diary_text(&raw, rooms)
}

fn cell_values(row_html: &str, cell_re: &Regex) -> Vec<String> {
    cell_re
        .captures_iter(row_html)
        .map(|caps| normalize(&caps[1]))
        .collect()
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Tabular strategy: header cells locate the needed columns, then every row
/// becomes an entry. Rows whose room cannot be resolved are dropped; a
/// booking whose end does not follow its start crosses midnight and rolls
/// the end date forward a day.
pub fn parse_diary_table(raw: &str, rooms: &RoomDirectory) -> Vec<DiaryEntry> {
    let row_htmls: Vec<&str> = TABLE_ROW_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let Some((header_row, data_rows)) = row_htmls.split_first() else {
        return Vec::new();
    };

    let mut headers = cell_values(header_row, &TH_CELL_RE);
    if headers.is_empty() {
        headers = cell_values(header_row, &TD_CELL_RE);
    }
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect();
    if !REQUIRED_DIARY_COLUMNS.iter().all(|col| index.contains_key(*col)) {
        return Vec::new();
    }

    let mut entries = Vec::new();
    for row_html in data_rows {
        let cols = cell_values(row_html, &TD_CELL_RE);
        if cols.is_empty() {
            continue;
        }
        let get = |col: &str| -> String {
            index
                .get(col)
                .and_then(|&i| cols.get(i))
                .cloned()
                .unwrap_or_default()
        };

        let Some(room) = rooms.resolve(&get("function room")) else {
            continue;
        };

        let start_date = get("start date");
        let start_time = get("start time 12 hour").to_uppercase();
        let end_date = get("end date");
        let end_time = get("end time 12 hour").to_uppercase();
        let salesperson = or_default(get("booking: owner name"), UNKNOWN_SALESPERSON);
        let group_name = or_default(get("booking: booking post as"), UNKNOWN_GROUP);

        let parsed_start = parse_diary_date(&start_date);
        let date_iso = parsed_start.map(|d| d.to_string());
        let date_display = parsed_start
            .map(format_display_date)
            .unwrap_or_else(|| start_date.clone());

        let time_range = if !start_time.is_empty() && !end_time.is_empty() {
            format!("{}-{}", start_time, end_time)
        } else {
            String::new()
        };

        let exact_bounds = (|| {
            let sd = parse_diary_date(&start_date)?;
            let ed = parse_diary_date(&end_date)?;
            let st = parse_clock(&start_time)?;
            let et = parse_clock(&end_time)?;
            let start = sd.and_time(st);
            let mut end = ed.and_time(et);
            if end <= start {
                end += Duration::days(1);
            }
            Some((start, end))
        })();
        let bounds = exact_bounds.or_else(|| parse_time_bounds(date_iso.as_deref(), &time_range));

        entries.push(DiaryEntry {
            room_name: room.name.clone(),
            date_iso,
            date_display,
            time_range,
            start: bounds.map(|b| b.0),
            end: bounds.map(|b| b.1),
            group_name,
            salesperson,
        });
    }
    entries
}

fn title_case_weekday(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Freeform strategy for page-extracted or columnar diaries: group and
/// salesperson label lines update a running context that carries forward
/// over the date rows beneath them. A date row's room is read from the row
/// itself or, failing that, from the line right after it.
pub fn parse_diary_text(text: &str, rooms: &RoomDirectory) -> Vec<DiaryEntry> {
    let lines: Vec<String> = text
        .lines()
        .map(clean_inline_whitespace)
        .filter(|line| !line.is_empty())
        .collect();

    let mut entries = Vec::new();
    let mut current_group = String::new();
    let mut current_salesperson = String::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = GROUP_LABEL_RE.captures(line) {
            current_group = clean_inline_whitespace(&caps[2]);
        }
        if let Some(caps) = SALES_LABEL_RE.captures(line) {
            current_salesperson = clean_inline_whitespace(&caps[2]);
        }

        let Some(caps) = DIARY_ROW_RE.captures(line) else {
            continue;
        };
        let date_display = format!("{}, {}", title_case_weekday(&caps[1]), &caps[2]);
        let date_iso = parse_display_date(&date_display).map(|d| d.to_string());
        let time_range = caps[3].to_uppercase();

        let room = rooms
            .resolve(line)
            .or_else(|| lines.get(i + 1).and_then(|next| rooms.resolve(next)));
        let Some(room) = room else {
            continue;
        };

        let bounds = parse_time_bounds(date_iso.as_deref(), &time_range);
        entries.push(DiaryEntry {
            room_name: room.name.clone(),
            date_iso,
            date_display,
            time_range,
            start: bounds.map(|b| b.0),
            end: bounds.map(|b| b.1),
            group_name: or_default(current_group.clone(), UNKNOWN_GROUP),
            salesperson: or_default(current_salesperson.clone(), UNKNOWN_SALESPERSON),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::RoomRecord;

    fn catalog() -> RoomDirectory {
        let room = |name: &str, area: &str| RoomRecord {
            name: name.to_string(),
            area: area.to_string(),
            sq_ft: Some(1000),
            classroom: Some(60),
            theater: Some(100),
            conference: None,
            u_shape: None,
            hollow: None,
            reception: Some(120),
            banquet_10: Some(80),
        };
        RoomDirectory::from_records(vec![
            room("Santa Fe", "Indoor"),
            room("Homestead", "Indoor"),
            room("Generations Ballroom", "Indoor"),
        ])
    }

    fn table_export(rows: &str) -> String {
        format!(
            "<table><tr>\
             <th>Booking Event: Name</th><th>Function Room</th>\
             <th>Start Date</th><th>Start Time 12 Hour</th>\
             <th>End Date</th><th>End Time 12 Hour</th>\
             <th>Booking: Owner Name</th><th>Booking: Booking Post As</th>\
             </tr>{}</table>",
            rows
        )
    }

    #[test]
    fn tabular_rows_become_entries() {
        let html = table_export(
            "<tr><td>Kickoff</td><td>Santa Fe</td><td>06/02/2025</td><td>9:00 AM</td>\
             <td>06/02/2025</td><td>5:00 PM</td><td>Dana Reyes</td><td>Acme Corp</td></tr>",
        );
        let entries = parse_diary_table(&html, &catalog());
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.room_name, "Santa Fe");
        assert_eq!(entry.date_iso.as_deref(), Some("2025-06-02"));
        assert_eq!(entry.date_display, "Mon, Jun 2, 2025");
        assert_eq!(entry.time_range, "9:00 AM-5:00 PM");
        assert_eq!(entry.group_name, "Acme Corp");
        assert_eq!(entry.salesperson, "Dana Reyes");
        assert!(entry.end.unwrap() > entry.start.unwrap());
    }

    #[test]
    fn tabular_unresolved_rooms_are_dropped_and_blanks_defaulted() {
        let html = table_export(
            "<tr><td>Gala</td><td>The Moon</td><td>06/02/2025</td><td>9:00 AM</td>\
             <td>06/02/2025</td><td>5:00 PM</td><td>Dana</td><td>Acme</td></tr>\
             <tr><td>Social</td><td>Homestead</td><td>06/03/2025</td><td>6:00 PM</td>\
             <td>06/03/2025</td><td>9:00 PM</td><td></td><td></td></tr>",
        );
        let entries = parse_diary_table(&html, &catalog());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].room_name, "Homestead");
        assert_eq!(entries[0].group_name, UNKNOWN_GROUP);
        assert_eq!(entries[0].salesperson, UNKNOWN_SALESPERSON);
    }

    #[test]
    fn tabular_overnight_booking_rolls_end_forward() {
        let html = table_export(
            "<tr><td>Late Party</td><td>Generations Ballroom</td><td>06/02/2025</td><td>10:00 PM</td>\
             <td>06/02/2025</td><td>1:00 AM</td><td>Dana</td><td>Acme</td></tr>",
        );
        let entries = parse_diary_table(&html, &catalog());
        let entry = &entries[0];
        let start = entry.start.unwrap();
        let end = entry.end.unwrap();
        assert!(end > start);
        assert_eq!(end.date(), start.date().succ_opt().unwrap());
    }

    #[test]
    fn tabular_requires_every_needed_column() {
        let html = "<table><tr><th>Function Room</th><th>Start Date</th></tr>\
                    <tr><td>Santa Fe</td><td>06/02/2025</td></tr></table>";
        assert!(parse_diary_table(html, &catalog()).is_empty());
    }

    #[test]
    fn freeform_context_carries_until_overridden() {
        let text = "\
Group Name: Acme Corp
Salesperson: Dana Reyes
Mon, Jun 2, 2025  Santa Fe  9:00 AM-5:00 PM
Tue, Jun 3, 2025  Homestead  8:00 AM-11:00 AM
Group Name: Borealis Club
Tue, Jun 3, 2025  Santa Fe  1:00 PM-4:00 PM
";
        let entries = parse_diary_text(text, &catalog());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].group_name, "Acme Corp");
        assert_eq!(entries[1].group_name, "Acme Corp");
        assert_eq!(entries[1].salesperson, "Dana Reyes");
        assert_eq!(entries[2].group_name, "Borealis Club");
        assert_eq!(entries[0].date_iso.as_deref(), Some("2025-06-02"));
        assert!(entries[0].start.is_some());
    }

    #[test]
    fn freeform_room_may_sit_on_the_following_line() {
        let text = "\
Event Name: Annual Gala
Sat, Jun 7, 2025  6:00 PM-11:00 PM
Generations Ballroom
Sun, Jun 8, 2025  9:00 AM-10:00 AM
No such space here
";
        let entries = parse_diary_text(text, &catalog());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].room_name, "Generations Ballroom");
        assert_eq!(entries[0].salesperson, UNKNOWN_SALESPERSON);
    }

    #[test]
    fn upload_sniffing_picks_the_table_strategy() {
        let html = table_export(
            "<tr><td>Kickoff</td><td>Santa Fe</td><td>06/02/2025</td><td>9:00 AM</td>\
             <td>06/02/2025</td><td>5:00 PM</td><td>Dana</td><td>Acme</td></tr>",
        );
        let entries = parse_diary_upload(html.as_bytes(), "diary.xls", &catalog());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].room_name, "Santa Fe");
    }

    #[test]
    fn upload_with_empty_table_falls_through_to_freeform() {
        let text = "<table></table> booking event: name function room\n\
                    Group: Acme\nMon, Jun 2, 2025  Santa Fe  9:00 AM-5:00 PM\n";
        let entries = parse_diary_upload(text.as_bytes(), "diary.html", &catalog());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].group_name, "Acme");
    }

    #[test]
    fn unreadable_pdf_diary_yields_no_entries() {
        let entries = parse_diary_upload(b"garbage", "diary.pdf", &catalog());
        assert!(entries.is_empty());
    }
}
