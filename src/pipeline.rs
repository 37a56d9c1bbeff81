use crate::diary::{parse_diary_upload, DiaryEntry};
use crate::error::AnalysisError;
use crate::pdf::extract_pdf_text;
use crate::recommend::{build_recommendations, calculate_food_beverage};
use crate::report::Report;
use crate::rfp::{looks_like_cvent_rfp, parse_meeting_requirements, parse_rfp_header};
use crate::rooms::RoomDirectory;

/// Runs one submission through the whole chain: extract text, gate the
/// layout, parse the diary, extract header and requirements, cross-check
/// and rank, assemble the report. The diary is optional and best-effort; a
/// diary no strategy can read leaves the submission with zero entries
/// instead of failing it.
pub fn analyze_submission(
    rooms: &RoomDirectory,
    rfp_bytes: &[u8],
    diary: Option<(&[u8], &str)>,
) -> Result<Report, AnalysisError> {
    let text = extract_pdf_text(rfp_bytes)?;
    if !looks_like_cvent_rfp(&text) {
        return Err(AnalysisError::UnrecognizedFormat);
    }

    let diary_entries: Vec<DiaryEntry> = match diary {
        Some((bytes, filename)) if !bytes.is_empty() => {
            let entries = parse_diary_upload(bytes, filename, rooms);
            log::info!("parsed {} diary entries from {:?}", entries.len(), filename);
            entries
        }
        _ => Vec::new(),
    };

    let header = parse_rfp_header(&text);
    let requirements = parse_meeting_requirements(&text, &header);
    log::info!(
        "extracted {} meeting requirements for {:?}",
        requirements.len(),
        header.rfp_name.as_deref().unwrap_or("unnamed proposal")
    );
    let recommendations = build_recommendations(&requirements, rooms, &diary_entries);
    let food_beverage = calculate_food_beverage(&requirements);

    Ok(Report {
        header,
        requirements_count: requirements.len(),
        recommendations,
        food_beverage,
        diary_entries_parsed: diary_entries.len(),
    })
}
