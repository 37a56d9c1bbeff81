use serde::Serialize;

use crate::dates::{overlaps, parse_time_bounds};
use crate::diary::DiaryEntry;
use crate::rfp::MeetingRequirement;

/// A diary booking that collides with a requirement at one room, kept for
/// user-facing explanation
#[derive(Debug, Clone, Serialize)]
pub struct ConflictRecord {
    pub room_name: String,
    pub group_name: String,
    pub salesperson: String,
    pub time_range: String,
    pub date_display: String,
}

impl ConflictRecord {
    pub fn from_entry(room_name: &str, entry: &DiaryEntry) -> ConflictRecord {
        let date_display = if entry.date_display.is_empty() {
            entry.date_iso.clone().unwrap_or_default()
        } else {
            entry.date_display.clone()
        };
        ConflictRecord {
            room_name: room_name.to_string(),
            group_name: entry.group_name.clone(),
            salesperson: entry.salesperson.clone(),
            time_range: entry.time_range.clone(),
            date_display,
        }
    }
}

/// Finds the first diary booking that collides with the requirement at the
/// given room. Time intervals are compared half-open when both sides have
/// parseable bounds; otherwise a same-date booking counts as a conflict.
/// Only existence matters, so the scan stops at the first hit.
pub fn find_room_conflict<'a>(
    room_name: &str,
    requirement: &MeetingRequirement,
    entries: &'a [DiaryEntry],
) -> Option<&'a DiaryEntry> {
    let req_date = requirement.event_date_iso.as_deref();
    let req_bounds = parse_time_bounds(req_date, &requirement.time_range);

    for entry in entries {
        if !entry.room_name.eq_ignore_ascii_case(room_name) {
            continue;
        }
        if let (Some(req_d), Some(entry_d)) = (req_date, entry.date_iso.as_deref()) {
            if req_d != entry_d {
                continue;
            }
        }
        if let (Some((req_start, req_end)), Some(start), Some(end)) =
            (req_bounds, entry.start, entry.end)
        {
            if overlaps(req_start, req_end, start, end) {
                return Some(entry);
            }
        } else if req_date == entry.date_iso.as_deref() {
            // Date-only resolution when either side lacks usable times
            return Some(entry);
        }
    }
    None
}
