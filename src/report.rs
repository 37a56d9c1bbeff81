use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::recommend::{FoodBeverageSummary, RecommendationItem};
use crate::rfp::ProposalHeader;

/// Conflicts shown per requirement in the rendered report
const REPORT_CONFLICT_LIMIT: usize = 5;
/// Print layout: US Letter, 11pt Helvetica, 48 lines per page
const PAGE_LINE_LIMIT: usize = 48;
const LINE_CHAR_LIMIT: usize = 120;

const REPORT_TITLE: &str = "Space Suggester - Recommendation Report";

/// The aggregate result of one submission, replaced wholesale each time
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub header: ProposalHeader,
    pub requirements_count: usize,
    pub recommendations: Vec<RecommendationItem>,
    pub food_beverage: FoodBeverageSummary,
    pub diary_entries_parsed: usize,
}

fn dollars(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

fn rank_label(rank: usize) -> String {
    match rank {
        1 => "Best Choice".to_string(),
        2 => "2nd Choice".to_string(),
        3 => "3rd Choice".to_string(),
        n => format!("{}th Choice", n),
    }
}

/// Flattens the report into the line-level summary shared by both export
/// encodings
pub fn build_report_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    let header = &report.header;
    lines.push(REPORT_TITLE.to_string());
    lines.push(String::new());
    lines.push(format!("RFP Name: {}", or_dash(header.rfp_name.as_deref())));
    lines.push(format!("Event Dates: {}", or_dash(header.event_dates.as_deref())));
    lines.push(format!(
        "Response Due Date: {}",
        or_dash(header.response_due_date.as_deref())
    ));
    lines.push(format!("RFP Type: {}", or_dash(header.rfp_type.as_deref())));
    lines.push(format!(
        "Key Contact Name: {}",
        or_dash(header.key_contact_name.as_deref())
    ));
    lines.push(format!(
        "Key Contact Organization: {}",
        or_dash(header.key_contact_organization.as_deref())
    ));
    lines.push(format!(
        "Organization Name: {}",
        or_dash(header.organization_name.as_deref())
    ));
    lines.push(format!(
        "Total Room Nights: {}",
        or_dash(header.total_room_nights.as_deref())
    ));
    lines.push(format!(
        "Peak Room Nights: {}",
        or_dash(header.peak_room_nights.as_deref())
    ));
    lines.push(String::new());

    let fnb = &report.food_beverage;
    if !fnb.events.is_empty() {
        lines.push("Food And Beverage Events".to_string());
        for event in &fnb.events {
            lines.push(format!(
                "  {} | {} | {} | {} | attendees {} | {}",
                event.day_label,
                event.event_date_display,
                event.time_range,
                event.purpose,
                event.attendees,
                dollars(event.estimated_total)
            ));
        }
        lines.push(format!(
            "Total Suggested Food And Beverage Minimum: {}",
            dollars(fnb.total_suggested_fnb_minimum)
        ));
        lines.push(String::new());
    }

    for item in &report.recommendations {
        let req = &item.requirement;
        let date = if req.event_date_display.is_empty() {
            or_dash(req.event_date_iso.as_deref()).to_string()
        } else {
            req.event_date_display.clone()
        };
        lines.push(format!(
            "{} | {} | {} | {}",
            req.day_label,
            date,
            or_dash(Some(req.time_range.as_str())),
            req.purpose
        ));
        lines.push(format!(
            "Requested Setup: {} | Attendees: {} | Capacity Target (w/ AV): {}",
            req.setup_requested, req.attendees, req.recommended_capacity_need
        ));
        for (rank, rec) in item.recommendations.iter().enumerate() {
            lines.push(format!(
                "  {}: {} ({}) - capacity {}",
                rank_label(rank + 1),
                rec.room_name,
                rec.area,
                rec.capacity
            ));
        }
        for conflict in item.conflicts.iter().take(REPORT_CONFLICT_LIMIT) {
            lines.push(format!(
                "  Conflict: {} booked by {} (Salesperson: {}) at {} {}",
                conflict.room_name,
                conflict.group_name,
                conflict.salesperson,
                conflict.date_display,
                conflict.time_range
            ));
        }
        for note in &item.notes {
            lines.push(format!("  Note: {}", note));
        }
        lines.push(String::new());
    }
    lines
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the report as a minimal HTML document served with a Word
/// content type
pub fn render_report_doc(report: &Report) -> Vec<u8> {
    let body: String = build_report_lines(report)
        .iter()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect();
    format!(
        "<html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        body
    )
    .into_bytes()
}

/// Renders the report as a minimal multi-page PDF
pub fn render_report_pdf(report: &Report) -> Result<Vec<u8>, AnalysisError> {
    let lines = build_report_lines(report);
    let mut pages: Vec<&[String]> = lines.chunks(PAGE_LINE_LIMIT).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("Td", vec![50.into(), 760.into()]),
            Operation::new("TL", vec![14.into()]),
        ];
        for line in page_lines.iter() {
            let truncated: String = line.chars().take(LINE_CHAR_LIMIT).collect();
            operations.push(Operation::new("Tj", vec![Object::string_literal(truncated)]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|err| AnalysisError::Render(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| AnalysisError::Render(err.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::fnb::{FoodBeverageEvent, FoodBeverageSummary};
    use crate::rfp::requirements::Purpose;

    fn sample_report() -> Report {
        Report {
            header: ProposalHeader {
                rfp_name: Some("Annual Summit".to_string()),
                event_dates: Some("Mon, Jun 02, 2025 - Wed, Jun 04, 2025".to_string()),
                ..ProposalHeader::default()
            },
            requirements_count: 0,
            recommendations: Vec::new(),
            food_beverage: FoodBeverageSummary {
                events: vec![FoodBeverageEvent {
                    purpose: Purpose::Dinner,
                    attendees: 80,
                    rate_per_person: 120,
                    estimated_total: 9_600,
                    day_label: "Day 1".to_string(),
                    event_date_display: "Mon, Jun 2, 2025".to_string(),
                    time_range: "7:00 PM-10:00 PM".to_string(),
                }],
                total_suggested_fnb_minimum: 9_600,
            },
            diary_entries_parsed: 0,
        }
    }

    #[test]
    fn dollars_grouping() {
        assert_eq!(dollars(0), "$0");
        assert_eq!(dollars(950), "$950");
        assert_eq!(dollars(9_600), "$9,600");
        assert_eq!(dollars(1_234_567), "$1,234,567");
    }

    #[test]
    fn report_lines_carry_header_and_fnb() {
        let lines = build_report_lines(&sample_report());
        assert_eq!(lines[0], REPORT_TITLE);
        assert!(lines.contains(&"RFP Name: Annual Summit".to_string()));
        assert!(lines.contains(&"Response Due Date: -".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.contains("Dinner") && l.contains("$9,600")));
        assert!(lines.contains(&"Total Suggested Food And Beverage Minimum: $9,600".to_string()));
    }

    #[test]
    fn doc_export_wraps_lines_in_paragraphs() {
        let bytes = render_report_doc(&sample_report());
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.starts_with("<html>"));
        assert!(html.contains("<p>RFP Name: Annual Summit</p>"));
    }

    #[test]
    fn pdf_export_produces_a_pdf_document() {
        let bytes = render_report_pdf(&sample_report()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.len() > 200);
    }

    #[test]
    fn long_reports_paginate() {
        let mut report = sample_report();
        // 120 F&B events force more than two 48-line pages
        report.food_beverage.events = (0u32..120)
            .map(|i| FoodBeverageEvent {
                purpose: Purpose::Lunch,
                attendees: i,
                rate_per_person: 55,
                estimated_total: 55 * i,
                day_label: "Day 1".to_string(),
                event_date_display: "Mon, Jun 2, 2025".to_string(),
                time_range: "12:00 PM-1:00 PM".to_string(),
            })
            .collect();
        let bytes = render_report_pdf(&report).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.matches("MediaBox").count() >= 3);
    }
}
