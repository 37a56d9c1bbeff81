use serde::{Deserialize, Serialize};

use crate::text::clean_inline_whitespace;

/// Normalized setup-style categories used for capacity lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityKey {
    #[serde(rename = "classroom")]
    Classroom,
    #[serde(rename = "theater")]
    Theater,
    #[serde(rename = "conference")]
    Conference,
    #[serde(rename = "u_shape")]
    UShape,
    #[serde(rename = "hollow")]
    Hollow,
    #[serde(rename = "reception")]
    Reception,
    #[serde(rename = "banquet_10")]
    Banquet10,
}

/// One venue space from the capacity chart. A missing capacity value means
/// the room does not support that setup style at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRecord {
    pub name: String,
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sq_ft: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classroom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theater: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_shape: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hollow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reception: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banquet_10: Option<u32>,
}

impl RoomRecord {
    pub fn capacity_for(&self, key: CapacityKey) -> Option<u32> {
        match key {
            CapacityKey::Classroom => self.classroom,
            CapacityKey::Theater => self.theater,
            CapacityKey::Conference => self.conference,
            CapacityKey::UShape => self.u_shape,
            CapacityKey::Hollow => self.hollow,
            CapacityKey::Reception => self.reception,
            CapacityKey::Banquet10 => self.banquet_10,
        }
    }

    pub fn is_outdoor(&self) -> bool {
        self.area.eq_ignore_ascii_case("outdoor")
    }
}

/// Aggregate/overflow rows in the capacity chart that are not bookable spaces
const EXCLUDED_NAME_TOKENS: &[&str] = &["pre-function", "total indoor space"];

/// Known spellings of multi-room combinations and composite names
const ROOM_ALIASES: &[(&str, &str)] = &[
    ("generations b & c", "generations bc"),
    ("generations c & b", "generations bc"),
    ("generations a & b", "generations ab"),
    ("generations b & a", "generations ab"),
    ("generations a & b & c", "generations ballroom"),
    ("eagles peak lawn", "eagles peak event lawn"),
];

/// Lower-cases, normalizes "&"/"and" conjunctions and whitespace, and folds
/// known combination-name variants to their catalog spelling
pub fn canonicalize_room_name(name: &str) -> String {
    let mut raw = clean_inline_whitespace(name).to_lowercase();
    raw = raw.replace("&amp;", "&");
    raw = raw.replace(" and ", " & ");
    let raw = clean_inline_whitespace(&raw);
    for (alias, canonical) in ROOM_ALIASES {
        if raw == *alias {
            return (*canonical).to_string();
        }
    }
    raw
}

/// The loaded, immutable catalog of venue spaces
#[derive(Debug, Clone)]
pub struct RoomDirectory {
    rooms: Vec<RoomRecord>,
    // Room indices ordered by name length, longest first, so containment
    // matching prefers the most specific name. Ties keep catalog order.
    by_length: Vec<usize>,
}

impl RoomDirectory {
    /// Loads the embedded capacity chart, dropping aggregate pseudo-rooms
    pub fn load() -> Result<RoomDirectory, serde_json::Error> {
        let records: Vec<RoomRecord> = serde_json::from_str(include_str!("../data/room_catalog.json"))?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<RoomRecord>) -> RoomDirectory {
        let rooms: Vec<RoomRecord> = records
            .into_iter()
            .filter(|r| {
                let name = r.name.to_lowercase();
                !EXCLUDED_NAME_TOKENS.iter().any(|token| name.contains(token))
            })
            .collect();
        let mut by_length: Vec<usize> = (0..rooms.len()).collect();
        by_length.sort_by_key(|&i| std::cmp::Reverse(rooms[i].name.len()));
        RoomDirectory { rooms, by_length }
    }

    pub fn rooms(&self) -> &[RoomRecord] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Resolves a raw room spelling to a catalog record: exact canonical
    /// match first, then containment against known names, longest first
    pub fn resolve(&self, raw_name: &str) -> Option<&RoomRecord> {
        let canonical = canonicalize_room_name(raw_name);
        self.rooms
            .iter()
            .find(|room| canonicalize_room_name(&room.name) == canonical)
            .or_else(|| self.detect_in_text(raw_name))
    }

    /// Finds the first catalog name contained in a line of text. Longest
    /// names are tried first; the first hit wins even when a shorter name
    /// would also match.
    pub fn detect_in_text(&self, line: &str) -> Option<&RoomRecord> {
        let line_lower = line.to_lowercase();
        self.by_length
            .iter()
            .map(|&i| &self.rooms[i])
            .find(|room| line_lower.contains(&room.name.to_lowercase()))
    }
}
