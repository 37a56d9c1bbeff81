pub mod conflict;
pub mod fnb;
pub mod ranking;

use serde::Serialize;

pub use conflict::{find_room_conflict, ConflictRecord};
pub use fnb::{calculate_food_beverage, FoodBeverageSummary};
pub use ranking::{rank_rooms, RankedRoom, MAX_RECOMMENDATIONS};

use crate::dates::is_outdoor_season;
use crate::diary::DiaryEntry;
use crate::rfp::requirements::Purpose;
use crate::rfp::MeetingRequirement;
use crate::rooms::RoomDirectory;

/// At most this many conflicts are echoed into a requirement's notes
pub const MAX_CONFLICT_NOTES: usize = 3;

/// Outdoor space adjacent to each indoor room family, for warm-weather
/// meal suggestions
const ADJACENT_OUTDOOR_SPACES: &[(&str, &str)] = &[
    ("constellation", "Flat Iron Plaza"),
    ("generations", "Eagles Peak Event Lawn"),
    ("skyline", "Eagles Peak Event Lawn"),
];

/// Rankings, conflicts, and advisory notes for one requirement
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationItem {
    pub requirement: MeetingRequirement,
    pub recommendations: Vec<RankedRoom>,
    pub conflicts: Vec<ConflictRecord>,
    pub notes: Vec<String>,
}

fn adjacent_outdoor_option(room_name: &str) -> Option<&'static str> {
    let name = room_name.to_lowercase();
    ADJACENT_OUTDOOR_SPACES
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, space)| *space)
}

/// Ranks every requirement and attaches its advisory notes: stored
/// exceptions verbatim, the AV buffer disclosure, and up to three detected
/// conflicts, followed by a cross-requirement sequencing pass.
pub fn build_recommendations(
    requirements: &[MeetingRequirement],
    rooms: &RoomDirectory,
    diary_entries: &[DiaryEntry],
) -> Vec<RecommendationItem> {
    let mut items: Vec<RecommendationItem> = Vec::with_capacity(requirements.len());
    for req in requirements {
        let (recommendations, conflicts) = rank_rooms(req, rooms, diary_entries);
        let mut notes = Vec::new();
        if !req.notes_or_exceptions.is_empty() {
            notes.push(format!("Notes or Exceptions: {}", req.notes_or_exceptions));
        }
        if req.av_buffer_pct > 0 {
            notes.push(format!(
                "Capacity adjusted by {}% to account for potential AV/stage footprint.",
                req.av_buffer_pct
            ));
        }
        for conflict in conflicts.iter().take(MAX_CONFLICT_NOTES) {
            notes.push(format!(
                "Conflict: {} is booked by {} (Salesperson: {}) at {} {}.",
                conflict.room_name,
                conflict.group_name,
                conflict.salesperson,
                conflict.date_display,
                conflict.time_range
            ));
        }
        items.push(RecommendationItem {
            requirement: req.clone(),
            recommendations,
            conflicts,
            notes,
        });
    }
    add_sequence_suggestions(&mut items);
    items
}

/// For each breakfast/lunch, finds the next working session on the same
/// date and suggests reusing its top-ranked room to avoid resets; during
/// outdoor season an adjacent outdoor space is offered as well
fn add_sequence_suggestions(items: &mut [RecommendationItem]) {
    let mut additions: Vec<(usize, Vec<String>)> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let req = &item.requirement;
        if !matches!(req.purpose, Purpose::Breakfast | Purpose::Lunch) {
            continue;
        }
        let followup = items[i + 1..].iter().find(|candidate| {
            candidate.requirement.event_date_iso == req.event_date_iso
                && candidate.requirement.purpose.is_working_session()
        });
        let Some(followup) = followup else {
            continue;
        };
        let Some(top) = followup.recommendations.first() else {
            continue;
        };
        let mut notes = vec![format!(
            "Use {} for both {} and the following {} to reduce room resets.",
            top.room_name,
            req.purpose.as_str().to_lowercase(),
            followup.requirement.purpose.as_str().to_lowercase()
        )];
        if is_outdoor_season(req.event_date_iso.as_deref()) {
            if let Some(outdoor) = adjacent_outdoor_option(&top.room_name) {
                notes.push(format!(
                    "Warm-weather meal option: consider adjacent outdoor space at {}.",
                    outdoor
                ));
            }
        }
        additions.push((i, notes));
    }
    for (i, notes) in additions {
        items[i].notes.extend(notes);
    }
}
