use serde::Serialize;

use crate::dates::is_outdoor_season;
use crate::diary::DiaryEntry;
use crate::recommend::conflict::{find_room_conflict, ConflictRecord};
use crate::rfp::MeetingRequirement;
use crate::rooms::{CapacityKey, RoomDirectory};

/// At most this many ranked rooms are kept per requirement
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Room-family preference penalties. Lower is better: the primary ballroom
/// family first, the named breakout rooms next, combinable ballroom
/// segments last among the named families.
const PRIMARY_FAMILY_TOKEN: &str = "constellation";
const PRIMARY_FAMILY_PENALTY: f64 = 0.0;
const BREAKOUT_ROOM_TOKENS: &[&str] =
    &["santa fe", "homestead", "skyline", "rock", "noctua", "sagitta"];
const BREAKOUT_ROOM_PENALTY: f64 = 16.0;
const SEGMENT_FAMILY_TOKEN: &str = "generations";
const SEGMENT_FAMILY_PENALTY: f64 = 34.0;
const DEFAULT_PENALTY: f64 = 20.0;

/// Score tiers for the display label; anything above the last bound is
/// "Limited"
const LABEL_TIERS: &[(f64, &str)] = &[(20.0, "Excellent"), (45.0, "Strong"), (75.0, "Fair")];

/// One ranked candidate room for a requirement
#[derive(Debug, Clone, Serialize)]
pub struct RankedRoom {
    pub room_name: String,
    pub area: String,
    pub capacity_key: CapacityKey,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sq_ft: Option<u32>,
    pub extra_capacity: u32,
    pub overall_score: f64,
    pub appropriateness_label: String,
}

pub fn room_preference_penalty(room_name: &str) -> f64 {
    let name = room_name.to_lowercase();
    if name.contains(PRIMARY_FAMILY_TOKEN) {
        return PRIMARY_FAMILY_PENALTY;
    }
    if BREAKOUT_ROOM_TOKENS.iter().any(|token| name.contains(token)) {
        return BREAKOUT_ROOM_PENALTY;
    }
    if name.contains(SEGMENT_FAMILY_TOKEN) {
        return SEGMENT_FAMILY_PENALTY;
    }
    DEFAULT_PENALTY
}

pub fn appropriateness_label(score: f64) -> &'static str {
    for (bound, label) in LABEL_TIERS {
        if score <= *bound {
            return label;
        }
    }
    "Limited"
}

/// Scores and orders candidate rooms for one requirement. Rooms without the
/// needed setup capacity, outdoor rooms out of season or hosting working
/// sessions, and undersized rooms are rejected outright; rooms with an
/// overlapping diary booking are recorded as conflicts instead. Survivors
/// are ordered by score, then spare capacity, then name, and cut to the
/// top three.
pub fn rank_rooms(
    requirement: &MeetingRequirement,
    rooms: &RoomDirectory,
    diary_entries: &[DiaryEntry],
) -> (Vec<RankedRoom>, Vec<ConflictRecord>) {
    let needed = requirement.recommended_capacity_need;
    let outdoor_ok = is_outdoor_season(requirement.event_date_iso.as_deref());

    let mut candidates: Vec<RankedRoom> = Vec::new();
    let mut conflicts: Vec<ConflictRecord> = Vec::new();
    for room in rooms.rooms() {
        let Some(capacity) = room.capacity_for(requirement.capacity_key) else {
            continue;
        };
        if room.name.to_lowercase().contains("pre-function") {
            continue;
        }
        if room.is_outdoor() && (!outdoor_ok || requirement.purpose.is_working_session()) {
            continue;
        }
        if capacity < needed {
            continue;
        }
        if let Some(entry) = find_room_conflict(&room.name, requirement, diary_entries) {
            conflicts.push(ConflictRecord::from_entry(&room.name, entry));
            continue;
        }

        let extra_capacity = capacity - needed;
        // Tight fits win: spare capacity as a share of the target, on the
        // same scale as the preference penalties
        let fit_penalty = (extra_capacity as f64 / needed.max(1) as f64) * 100.0;
        let score = room_preference_penalty(&room.name) + fit_penalty;
        candidates.push(RankedRoom {
            room_name: room.name.clone(),
            area: room.area.clone(),
            capacity_key: requirement.capacity_key,
            capacity,
            sq_ft: room.sq_ft,
            extra_capacity,
            overall_score: (score * 100.0).round() / 100.0,
            appropriateness_label: appropriateness_label(score).to_string(),
        });
    }

    candidates.sort_by(|a, b| {
        a.overall_score
            .total_cmp(&b.overall_score)
            .then(a.extra_capacity.cmp(&b.extra_capacity))
            .then(a.room_name.cmp(&b.room_name))
    });
    candidates.truncate(MAX_RECOMMENDATIONS);
    conflicts.sort_by(|a, b| a.room_name.cmp(&b.room_name));
    (candidates, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_time_bounds;
    use crate::rfp::requirements::Purpose;
    use crate::rooms::RoomRecord;

    fn room(name: &str, area: &str, classroom: Option<u32>, banquet: Option<u32>) -> RoomRecord {
        RoomRecord {
            name: name.to_string(),
            area: area.to_string(),
            sq_ft: Some(1200),
            classroom,
            theater: None,
            conference: None,
            u_shape: None,
            hollow: None,
            reception: banquet,
            banquet_10: banquet,
        }
    }

    fn requirement(
        purpose: Purpose,
        key: CapacityKey,
        needed: u32,
        date: Option<&str>,
    ) -> MeetingRequirement {
        MeetingRequirement {
            purpose,
            agenda_item: "Session".to_string(),
            setup_requested: "Classroom".to_string(),
            setup_type: "classroom".to_string(),
            attendees: needed,
            recommended_capacity_need: needed,
            capacity_key: key,
            event_date_iso: date.map(str::to_string),
            event_date_display: "Mon, Jun 2, 2025".to_string(),
            time_range: "9:00 AM-5:00 PM".to_string(),
            day_number: Some(1),
            day_label: "Day 1".to_string(),
            av_buffer_pct: 0,
            notes_or_exceptions: String::new(),
        }
    }

    #[test]
    fn tight_fit_beats_preferred_family_when_the_math_says_so() {
        let rooms = RoomDirectory::from_records(vec![
            room("Constellation Ballroom", "Indoor", Some(200), None),
            room("Santa Fe", "Indoor", Some(125), None),
        ]);
        let req = requirement(Purpose::Meeting, CapacityKey::Classroom, 120, Some("2025-06-02"));
        let (ranked, conflicts) = rank_rooms(&req, &rooms, &[]);
        assert!(conflicts.is_empty());
        // Santa Fe: 16 + (5/120)*100 = 20.17; Constellation: 0 + (80/120)*100 = 66.67
        assert_eq!(ranked[0].room_name, "Santa Fe");
        assert_eq!(ranked[0].overall_score, 20.17);
        assert_eq!(ranked[0].appropriateness_label, "Strong");
        assert_eq!(ranked[1].room_name, "Constellation Ballroom");
        assert_eq!(ranked[1].overall_score, 66.67);
        assert_eq!(ranked[1].appropriateness_label, "Fair");
    }

    #[test]
    fn exact_capacity_is_eligible_and_scores_best() {
        let rooms = RoomDirectory::from_records(vec![
            room("Constellation A", "Indoor", Some(165), None),
            room("Homestead", "Indoor", Some(164), None),
        ]);
        let req = requirement(Purpose::Meeting, CapacityKey::Classroom, 165, None);
        let (ranked, _) = rank_rooms(&req, &rooms, &[]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].room_name, "Constellation A");
        assert_eq!(ranked[0].extra_capacity, 0);
        assert_eq!(ranked[0].overall_score, 0.0);
        assert_eq!(ranked[0].appropriateness_label, "Excellent");
    }

    #[test]
    fn rooms_without_the_setup_capacity_are_rejected() {
        let rooms = RoomDirectory::from_records(vec![
            room("Polaris Boardroom", "Indoor", None, None),
            room("Santa Fe", "Indoor", Some(60), None),
        ]);
        let req = requirement(Purpose::Meeting, CapacityKey::Classroom, 40, None);
        let (ranked, _) = rank_rooms(&req, &rooms, &[]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].room_name, "Santa Fe");
    }

    #[test]
    fn outdoor_rooms_follow_season_and_purpose_gates() {
        let rooms = RoomDirectory::from_records(vec![
            room("Eagles Peak Event Lawn", "Outdoor", None, Some(600)),
            room("Generations Ballroom", "Indoor", None, Some(440)),
        ]);
        let in_season = requirement(
            Purpose::Dinner,
            CapacityKey::Banquet10,
            200,
            Some("2024-07-15"),
        );
        let (ranked, _) = rank_rooms(&in_season, &rooms, &[]);
        assert!(ranked.iter().any(|r| r.room_name == "Eagles Peak Event Lawn"));

        let off_season = requirement(
            Purpose::Dinner,
            CapacityKey::Banquet10,
            200,
            Some("2024-12-01"),
        );
        let (ranked, _) = rank_rooms(&off_season, &rooms, &[]);
        assert!(ranked.iter().all(|r| r.room_name != "Eagles Peak Event Lawn"));

        // Working sessions stay indoors even in season
        let meeting = requirement(
            Purpose::Meeting,
            CapacityKey::Banquet10,
            200,
            Some("2024-07-15"),
        );
        let (ranked, _) = rank_rooms(&meeting, &rooms, &[]);
        assert!(ranked.iter().all(|r| r.room_name != "Eagles Peak Event Lawn"));
    }

    #[test]
    fn ordering_is_score_then_spare_then_name_capped_at_three() {
        // Noctua and Sagitta tie on score and spare capacity; the
        // alphabetical tie-break must hold
        let rooms = RoomDirectory::from_records(vec![
            room("Sagitta", "Indoor", Some(60), None),
            room("Noctua", "Indoor", Some(60), None),
            room("Homestead", "Indoor", Some(55), None),
            room("Meridian", "Indoor", Some(50), None),
            room("Constellation C", "Indoor", Some(90), None),
        ]);
        let req = requirement(Purpose::Meeting, CapacityKey::Classroom, 50, None);
        let (ranked, _) = rank_rooms(&req, &rooms, &[]);
        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
        // Homestead 16+10=26, Noctua/Sagitta 16+20=36, Meridian 20+0=20,
        // Constellation C 0+80=80
        assert_eq!(ranked[0].room_name, "Meridian");
        assert_eq!(ranked[1].room_name, "Homestead");
        assert_eq!(ranked[2].room_name, "Noctua");
    }

    #[test]
    fn conflicted_rooms_move_to_the_conflict_list() {
        let rooms = RoomDirectory::from_records(vec![room(
            "Santa Fe",
            "Indoor",
            Some(80),
            None,
        )]);
        let req = requirement(Purpose::Meeting, CapacityKey::Classroom, 50, Some("2025-06-02"));
        let bounds = parse_time_bounds(Some("2025-06-02"), "10:00 AM-2:00 PM");
        let entry = DiaryEntry {
            room_name: "Santa Fe".to_string(),
            date_iso: Some("2025-06-02".to_string()),
            date_display: "Mon, Jun 2, 2025".to_string(),
            time_range: "10:00 AM-2:00 PM".to_string(),
            start: bounds.map(|b| b.0),
            end: bounds.map(|b| b.1),
            group_name: "Acme Corp".to_string(),
            salesperson: "Dana Reyes".to_string(),
        };
        let (ranked, conflicts) = rank_rooms(&req, &rooms, &[entry]);
        // The only qualifying room is booked: no rankings, one explanation
        assert!(ranked.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].room_name, "Santa Fe");
        assert_eq!(conflicts[0].group_name, "Acme Corp");
    }

    #[test]
    fn preference_penalties_by_family() {
        assert_eq!(room_preference_penalty("Constellation Ballroom"), 0.0);
        assert_eq!(room_preference_penalty("Santa Fe"), 16.0);
        assert_eq!(room_preference_penalty("Rock Island"), 16.0);
        assert_eq!(room_preference_penalty("Generations AB"), 34.0);
        assert_eq!(room_preference_penalty("Garden Terrace"), 20.0);
    }

    #[test]
    fn label_tiers() {
        assert_eq!(appropriateness_label(20.0), "Excellent");
        assert_eq!(appropriateness_label(20.01), "Strong");
        assert_eq!(appropriateness_label(45.0), "Strong");
        assert_eq!(appropriateness_label(75.0), "Fair");
        assert_eq!(appropriateness_label(75.01), "Limited");
    }
}
