use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dates::parse_display_date;
use crate::text::clean_inline_whitespace;

/// Structural markers every supported proposal export carries
const REQUIRED_MARKERS: &[&str] = &[
    "request for proposal (rfp)",
    "rfp details",
    "meeting room requirements",
];

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z]{3},\s+[A-Za-z]{3}\s+\d{1,2},\s+\d{4})\s+-\s+([A-Za-z]{3},\s+[A-Za-z]{3}\s+\d{1,2},\s+\d{4})",
    )
    .unwrap()
});
static CONTACT_ANCHORED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Contact Name\s+(.+?)\s+Organization\s+(.+?)\s+Address").unwrap());
static CONTACT_LOOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Contact Name\s+(.+?)\s+Email Address").unwrap());
static ORG_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Organization\s+(.+?)\s+Address").unwrap());

/// Event-level metadata pulled from the top of the proposal
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProposalHeader {
    pub rfp_name: Option<String>,
    pub event_dates: Option<String>,
    pub response_due_date: Option<String>,
    pub rfp_type: Option<String>,
    pub key_contact_name: Option<String>,
    pub key_contact_organization: Option<String>,
    pub organization_name: Option<String>,
    pub total_room_nights: Option<String>,
    pub peak_room_nights: Option<String>,
    pub arrival_date: Option<String>,
    pub departure_date: Option<String>,
}

/// True when the decoded text carries the three structural markers of the
/// supported layout. A readable document failing this gate is rejected
/// input, not an extraction error.
pub fn looks_like_cvent_rfp(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REQUIRED_MARKERS.iter().all(|marker| lowered.contains(marker))
}

/// Finds the first line containing `label` followed by a value on the same
/// line, and returns the normalized remainder
pub fn extract_line_value(text: &str, label: &str) -> Option<String> {
    for line in text.lines() {
        if let Some(pos) = line.find(label) {
            let rest = &line[pos + label.len()..];
            if rest.starts_with(|c: char| c.is_whitespace()) {
                let value = clean_inline_whitespace(rest);
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Locates the "Weekday, Month Day, Year - Weekday, Month Day, Year" range
/// and converts both ends to ISO dates. If the fixed format fails to parse,
/// the raw matched tokens are kept so the report still shows the document's
/// own text.
fn parse_date_range(event_dates: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(caps) = event_dates.and_then(|text| DATE_RANGE_RE.captures(text)) else {
        return (None, None);
    };
    let raw_arrival = caps[1].to_string();
    let raw_departure = caps[2].to_string();
    match (parse_display_date(&raw_arrival), parse_display_date(&raw_departure)) {
        (Some(arrival), Some(departure)) => {
            (Some(arrival.to_string()), Some(departure.to_string()))
        }
        _ => (Some(raw_arrival), Some(raw_departure)),
    }
}

/// Pulls the proposal header fields via labeled-line lookups plus the
/// contact-line anchor cascade
pub fn parse_rfp_header(text: &str) -> ProposalHeader {
    let event_dates = extract_line_value(text, "Event Dates");
    let (arrival_date, departure_date) = parse_date_range(event_dates.as_deref());

    let mut key_contact_name = None;
    let mut key_contact_organization = None;
    let contact_line = text
        .lines()
        .find(|line| line.contains("Contact Name"))
        .map(clean_inline_whitespace);
    if let Some(line) = contact_line {
        if let Some(caps) = CONTACT_ANCHORED_RE.captures(&line) {
            key_contact_name = Some(clean_inline_whitespace(&caps[1]));
            key_contact_organization = Some(clean_inline_whitespace(&caps[2]));
        } else if let Some(caps) = CONTACT_LOOSE_RE.captures(&line) {
            key_contact_name = Some(clean_inline_whitespace(&caps[1]));
        }
    }
    if key_contact_organization.is_none() {
        if let Some(caps) = ORG_LINE_RE.captures(text) {
            key_contact_organization = Some(clean_inline_whitespace(&caps[1]));
        }
    }

    ProposalHeader {
        rfp_name: extract_line_value(text, "RFP Name"),
        event_dates,
        response_due_date: extract_line_value(text, "Response Due Date"),
        rfp_type: extract_line_value(text, "RFP Type"),
        key_contact_name,
        key_contact_organization,
        organization_name: extract_line_value(text, "Organization Name"),
        total_room_nights: extract_line_value(text, "Total Room Nights"),
        peak_room_nights: extract_line_value(text, "Peak Room Nights"),
        arrival_date,
        departure_date,
    }
}
