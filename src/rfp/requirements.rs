use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dates::parse_display_date;
use crate::rfp::header::{extract_line_value, ProposalHeader};
use crate::rooms::CapacityKey;
use crate::text::clean_inline_whitespace;

/// Inferred purpose category of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Purpose {
    Breakfast,
    Lunch,
    Dinner,
    Reception,
    #[serde(rename = "Breakout Session")]
    BreakoutSession,
    Meeting,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Breakfast => "Breakfast",
            Purpose::Lunch => "Lunch",
            Purpose::Dinner => "Dinner",
            Purpose::Reception => "Reception",
            Purpose::BreakoutSession => "Breakout Session",
            Purpose::Meeting => "Meeting",
        }
    }

    /// Breakfast/Lunch/Dinner/Reception: drives F&B estimates and the
    /// document-level attendee fallback
    pub fn is_meal_or_reception(&self) -> bool {
        matches!(
            self,
            Purpose::Breakfast | Purpose::Lunch | Purpose::Dinner | Purpose::Reception
        )
    }

    /// Meeting or Breakout Session: working sessions never go outdoors
    pub fn is_working_session(&self) -> bool {
        matches!(self, Purpose::Meeting | Purpose::BreakoutSession)
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed session requirement from the meeting-requirements section
#[derive(Debug, Clone, Serialize)]
pub struct MeetingRequirement {
    pub purpose: Purpose,
    pub agenda_item: String,
    pub setup_requested: String,
    pub setup_type: String,
    pub attendees: u32,
    pub recommended_capacity_need: u32,
    pub capacity_key: CapacityKey,
    pub event_date_iso: Option<String>,
    pub event_date_display: String,
    pub time_range: String,
    pub day_number: Option<u32>,
    pub day_label: String,
    pub av_buffer_pct: u32,
    pub notes_or_exceptions: String,
}

/// Agenda-line keywords mapped to purposes, checked in order
const PURPOSE_KEYWORDS: &[(&str, Purpose)] = &[
    ("breakout", Purpose::BreakoutSession),
    ("breakfast", Purpose::Breakfast),
    ("lunch", Purpose::Lunch),
    ("reception", Purpose::Reception),
    ("dinner", Purpose::Dinner),
];

/// Setup vocabulary mapped to capacity-lookup categories, checked in order.
/// The first vocabulary word contained in a raw setup string wins.
const SETUP_CAPACITY_TABLE: &[(&str, CapacityKey)] = &[
    ("classroom", CapacityKey::Classroom),
    ("theater", CapacityKey::Theater),
    ("conference", CapacityKey::Conference),
    ("u-shape", CapacityKey::UShape),
    ("u shape", CapacityKey::UShape),
    ("ushape", CapacityKey::UShape),
    ("hollow", CapacityKey::Hollow),
    ("reception", CapacityKey::Reception),
    ("crescent", CapacityKey::Banquet10),
    ("rounds", CapacityKey::Banquet10),
    ("buffet", CapacityKey::Banquet10),
    ("banquet", CapacityKey::Banquet10),
];

const DEFAULT_SETUP_TYPE: &str = "rounds";

/// Document-wide tokens that signal a full audio-visual production
const AV_GLOBAL_TOKENS: &[&str] = &["av requirements", "audio visual", " a/v "];
/// Note tokens that signal staging/entertainment footprint
const STAGING_TOKENS: &[&str] = &["stage", "band", "dj", "entertainment"];

const AV_GLOBAL_BUFFER: f64 = 0.15;
const AV_DEFAULT_BUFFER: f64 = 0.10;
const STAGING_BUFFER: f64 = 0.20;

const SECTION_START_MARKER: &str = "Meeting Room Requirements";
const SECTION_END_MARKERS: &[&str] = &["AV Requirements", "Additional Questions"];
const MEETING_ROOM_SUFFIX: &str = "(Meeting Room Required)";

static AGENDA_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(Mon|Tue|Wed|Thu|Fri|Sat|Sun),\s+([A-Za-z]{3}\s+\d{1,2},\s+\d{4})\s+(\d{1,2}:\d{2}\s*[AP]M-\d{1,2}:\d{2}\s*[AP]M)\s+(.+)$",
    )
    .unwrap()
});
static SETUP_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(Crescent rounds|Classroom|Reception|Rounds for 8|Rounds|Buffet|Theater|U-Shape|U Shape|Conference|Hollow)$",
    )
    .unwrap()
});
static PEOPLE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,4})(?:\s*-\s*(\d{1,4}))?\s*people$").unwrap());
static PEOPLE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,4})\s*-\s*(\d{1,4})\s*people").unwrap());
static PEOPLE_SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,4})\s*people").unwrap());
static FIRST_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Raw state accumulated per agenda block before post-processing
#[derive(Debug, Clone)]
struct AgendaBlock {
    date_display: String,
    date_iso: Option<String>,
    time_range: String,
    agenda_item: String,
    setup_requested: String,
    attendees: Option<u32>,
    notes: String,
}

/// Slices the text between the requirements marker and the next section
/// marker; absent either marker the slice extends to the document end
fn requirements_section(text: &str) -> &str {
    let Some(start) = text.find(SECTION_START_MARKER) else {
        return text;
    };
    let section = &text[start..];
    for marker in SECTION_END_MARKERS {
        if let Some(end) = section.find(marker) {
            return &section[..end];
        }
    }
    section
}

/// Scans free text for "<N> people" or "<N>-<M> people"; a range resolves
/// to its larger bound
fn infer_attendees_from_text(raw: &str) -> Option<u32> {
    if let Some(caps) = PEOPLE_RANGE_RE.captures(raw) {
        let lo: u32 = caps[1].parse().ok()?;
        let hi: u32 = caps[2].parse().ok()?;
        return Some(lo.max(hi));
    }
    let caps = PEOPLE_SINGLE_RE.captures(raw)?;
    caps[1].parse().ok()
}

/// Infers the purpose category from the agenda label plus setup text
pub fn infer_purpose(agenda_item: &str, setup_requested: &str) -> Purpose {
    let base = format!("{} {}", agenda_item, setup_requested).to_lowercase();
    for (keyword, purpose) in PURPOSE_KEYWORDS {
        if base.contains(keyword) {
            return *purpose;
        }
    }
    Purpose::Meeting
}

/// Maps raw setup text to its vocabulary word ("classroom", "u-shape", ...)
fn infer_setup_type(raw_setup: &str) -> &'static str {
    let lowered = raw_setup.to_lowercase();
    SETUP_CAPACITY_TABLE
        .iter()
        .find(|(vocab, _)| lowered.contains(vocab))
        .map(|(vocab, _)| *vocab)
        .unwrap_or(DEFAULT_SETUP_TYPE)
}

/// Maps a vocabulary word to its capacity-lookup category
fn setup_capacity_key(setup_type: &str) -> CapacityKey {
    let lowered = setup_type.to_lowercase();
    SETUP_CAPACITY_TABLE
        .iter()
        .find(|(vocab, _)| *vocab == lowered)
        .map(|(_, key)| *key)
        .unwrap_or(CapacityKey::Banquet10)
}

/// Setup assigned when a block never names one
fn default_setup_for(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::Reception => "Reception",
        Purpose::Breakfast | Purpose::Lunch | Purpose::Dinner => "Rounds",
        Purpose::BreakoutSession => "Classroom",
        Purpose::Meeting => "Classroom",
    }
}

/// Line-oriented state machine over the requirements section: an agenda row
/// opens a block; setup, attendee, and notes lines fill the open block;
/// anything else is ignored unless a notes run is being collected
fn parse_agenda_blocks(text: &str) -> Vec<AgendaBlock> {
    let section = requirements_section(text);
    let lines: Vec<String> = section
        .lines()
        .map(clean_inline_whitespace)
        .filter(|line| !line.is_empty())
        .collect();

    let mut blocks: Vec<AgendaBlock> = Vec::new();
    let mut current: Option<AgendaBlock> = None;
    let mut collecting_notes = false;

    for line in &lines {
        if let Some(caps) = AGENDA_ROW_RE.captures(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            let date_display = format!("{}, {}", &caps[1], &caps[2]);
            current = Some(AgendaBlock {
                date_iso: parse_display_date(&date_display).map(|d| d.to_string()),
                date_display,
                time_range: caps[3].to_string(),
                agenda_item: caps[4].trim().to_string(),
                setup_requested: String::new(),
                attendees: None,
                notes: String::new(),
            });
            collecting_notes = false;
            continue;
        }
        let Some(block) = current.as_mut() else {
            continue;
        };

        if line.to_lowercase().starts_with("notes or exceptions:") {
            let note = line.splitn(2, ':').nth(1).unwrap_or("").trim();
            if !note.is_empty() {
                if !block.notes.is_empty() {
                    block.notes.push(' ');
                }
                block.notes.push_str(note);
            }
            collecting_notes = true;
            continue;
        }

        let without_suffix = line.replace(MEETING_ROOM_SUFFIX, "");
        let stripped = without_suffix.trim();
        if let Some(caps) = SETUP_LINE_RE.captures(stripped) {
            block.setup_requested = caps[1].to_string();
            collecting_notes = false;
            continue;
        }

        if line.contains(MEETING_ROOM_SUFFIX) {
            let setup_text = clean_inline_whitespace(
                line.split(MEETING_ROOM_SUFFIX).next().unwrap_or(""),
            );
            if !setup_text.is_empty() {
                block.setup_requested = setup_text;
            }
            collecting_notes = false;
            continue;
        }

        if let Some(caps) = PEOPLE_LINE_RE.captures(line) {
            let low: Option<u32> = caps[1].parse().ok();
            let high: Option<u32> = caps.get(2).and_then(|m| m.as_str().parse().ok());
            block.attendees = high.or(low);
            collecting_notes = false;
            continue;
        }

        if collecting_notes {
            if !block.notes.is_empty() {
                block.notes.push(' ');
            }
            block.notes.push_str(line);
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Removes exact-duplicate requirements, keeping the first occurrence.
/// Applying this twice yields the same list as applying it once.
fn dedup_requirements(requirements: Vec<MeetingRequirement>) -> Vec<MeetingRequirement> {
    let mut seen: HashSet<(String, String, String, u32, Option<String>, String)> = HashSet::new();
    let mut deduped = Vec::with_capacity(requirements.len());
    for req in requirements {
        let key = (
            req.purpose.as_str().to_string(),
            req.agenda_item.clone(),
            req.setup_requested.to_lowercase(),
            req.attendees,
            req.event_date_iso.clone(),
            req.time_range.clone(),
        );
        if seen.insert(key) {
            deduped.push(req);
        }
    }
    deduped
}

/// Turns the raw agenda blocks into normalized requirements: attendee
/// fallbacks, setup defaults, AV capacity buffer, day numbering, dedup.
/// Blocks that never yield a positive attendee count are dropped.
pub fn parse_meeting_requirements(text: &str, header: &ProposalHeader) -> Vec<MeetingRequirement> {
    let blocks = parse_agenda_blocks(text);
    let text_lower = text.to_lowercase();
    let av_global = AV_GLOBAL_TOKENS.iter().any(|token| text_lower.contains(token));
    let total_attendees: u32 = extract_line_value(text, "Total Attendees")
        .and_then(|value| FIRST_INT_RE.find(&value).and_then(|m| m.as_str().parse().ok()))
        .unwrap_or(0);

    // Day numbers follow first appearance of each distinct date
    let mut event_days: HashMap<String, u32> = HashMap::new();
    for block in &blocks {
        if let Some(date) = &block.date_iso {
            if !event_days.contains_key(date) {
                let next = event_days.len() as u32 + 1;
                event_days.insert(date.clone(), next);
            }
        }
    }

    let mut requirements = Vec::new();
    for block in blocks {
        let mut setup_requested = block.setup_requested.trim().to_string();
        let notes = block.notes.clone();

        let mut attendees = block.attendees;
        if attendees.is_none() {
            attendees = infer_attendees_from_text(&notes);
        }
        let preview_setup = if setup_requested.is_empty() {
            block.agenda_item.clone()
        } else {
            setup_requested.clone()
        };
        let purpose_preview = infer_purpose(&block.agenda_item, &preview_setup);
        if attendees.is_none() && purpose_preview.is_meal_or_reception() && total_attendees > 0 {
            attendees = Some(total_attendees);
        }
        if attendees.is_none() {
            attendees = infer_attendees_from_text(&block.agenda_item);
        }
        let attendees = attendees.unwrap_or(0);
        if attendees == 0 {
            continue;
        }

        if setup_requested.is_empty() {
            setup_requested = default_setup_for(purpose_preview).to_string();
        }

        let purpose = infer_purpose(&block.agenda_item, &setup_requested);
        let setup_type = infer_setup_type(&setup_requested);
        let event_date_iso = block.date_iso.clone().or_else(|| header.arrival_date.clone());

        let mut av_buffer = if av_global {
            AV_GLOBAL_BUFFER
        } else if matches!(
            purpose,
            Purpose::Meeting | Purpose::BreakoutSession | Purpose::Dinner
        ) {
            AV_DEFAULT_BUFFER
        } else {
            0.0
        };
        let notes_lower = notes.to_lowercase();
        if STAGING_TOKENS.iter().any(|token| notes_lower.contains(token)) {
            av_buffer = av_buffer.max(STAGING_BUFFER);
        }
        let recommended_capacity_need = (attendees as f64 * (1.0 + av_buffer)).ceil() as u32;

        let day_number = event_date_iso
            .as_ref()
            .and_then(|date| event_days.get(date))
            .copied();
        let day_label = day_number
            .map(|n| format!("Day {}", n))
            .unwrap_or_else(|| "Day ?".to_string());

        requirements.push(MeetingRequirement {
            purpose,
            agenda_item: block.agenda_item,
            setup_requested,
            setup_type: setup_type.to_string(),
            attendees,
            recommended_capacity_need,
            capacity_key: setup_capacity_key(setup_type),
            event_date_iso,
            event_date_display: block.date_display,
            time_range: block.time_range,
            day_number,
            day_label,
            av_buffer_pct: (av_buffer * 100.0) as u32,
            notes_or_exceptions: notes,
        });
    }

    dedup_requirements(requirements)
}
