pub mod header;
pub mod requirements;

pub use header::{extract_line_value, looks_like_cvent_rfp, parse_rfp_header, ProposalHeader};
pub use requirements::{parse_meeting_requirements, MeetingRequirement, Purpose};
