use serde::Serialize;

use crate::rfp::requirements::Purpose;
use crate::rfp::MeetingRequirement;

/// Suggested per-person rates for catered purposes
pub const FNB_RATES: &[(Purpose, u32)] = &[
    (Purpose::Breakfast, 50),
    (Purpose::Lunch, 55),
    (Purpose::Dinner, 120),
    (Purpose::Reception, 70),
];

#[derive(Debug, Clone, Serialize)]
pub struct FoodBeverageEvent {
    pub purpose: Purpose,
    pub attendees: u32,
    pub rate_per_person: u32,
    pub estimated_total: u32,
    pub day_label: String,
    pub event_date_display: String,
    pub time_range: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FoodBeverageSummary {
    pub events: Vec<FoodBeverageEvent>,
    pub total_suggested_fnb_minimum: u32,
}

fn rate_for(purpose: Purpose) -> Option<u32> {
    FNB_RATES
        .iter()
        .find(|(p, _)| *p == purpose)
        .map(|(_, rate)| *rate)
}

/// Sums attendee count times the per-person rate across every catered
/// requirement
pub fn calculate_food_beverage(requirements: &[MeetingRequirement]) -> FoodBeverageSummary {
    let mut events = Vec::new();
    let mut total = 0;
    for req in requirements {
        let Some(rate) = rate_for(req.purpose) else {
            continue;
        };
        let amount = req.attendees * rate;
        total += amount;
        events.push(FoodBeverageEvent {
            purpose: req.purpose,
            attendees: req.attendees,
            rate_per_person: rate,
            estimated_total: amount,
            day_label: req.day_label.clone(),
            event_date_display: req.event_date_display.clone(),
            time_range: req.time_range.clone(),
        });
    }
    FoodBeverageSummary {
        events,
        total_suggested_fnb_minimum: total,
    }
}
