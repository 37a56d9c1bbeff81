use actix_files::Files;
use actix_multipart::form::bytes::Bytes as MultipartBytes;
use actix_multipart::form::MultipartForm;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use std::sync::Mutex;

use crate::error::AnalysisError;
use crate::pipeline::analyze_submission;
use crate::report::{render_report_doc, render_report_pdf, Report};
use crate::rooms::RoomDirectory;

/// Most recent reports kept for export, keyed by opaque token
const REPORT_CACHE_LIMIT: usize = 16;
const TOKEN_LENGTH: usize = 24;

/// In-memory state shared across requests. The room directory is read-only;
/// the pipeline owns no cross-request state, so the report map here is the
/// only thing behind a lock.
pub struct AppState {
    pub rooms: RoomDirectory,
    pub reports: Mutex<Vec<(String, Report)>>,
}

#[derive(MultipartForm)]
pub struct RfpUploadForm {
    pub rfp: MultipartBytes,
    pub diary: Option<MultipartBytes>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
    token: Option<String>,
}

fn new_report_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Stores a report for later export and returns its token. The oldest
/// reports are evicted once the cache is full.
fn store_report(reports: &Mutex<Vec<(String, Report)>>, report: Report) -> String {
    let token = new_report_token();
    let mut reports = reports.lock().unwrap();
    reports.push((token.clone(), report));
    while reports.len() > REPORT_CACHE_LIMIT {
        reports.remove(0);
    }
    token
}

// RFP upload + analysis endpoint
async fn parse_rfp(
    MultipartForm(form): MultipartForm<RfpUploadForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let rfp_bytes = &form.rfp.data;
    if rfp_bytes.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"error": "Uploaded file was empty"})));
    }
    let diary = form
        .diary
        .as_ref()
        .map(|d| (d.data.as_ref(), d.file_name.as_deref().unwrap_or("")));

    match analyze_submission(&state.rooms, rfp_bytes, diary) {
        Ok(report) => {
            let mut body = serde_json::to_value(&report)
                .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;
            let token = store_report(&state.reports, report);
            body["report_token"] = serde_json::Value::String(token);
            Ok(HttpResponse::Ok().json(body))
        }
        Err(AnalysisError::UnrecognizedFormat) => Ok(HttpResponse::BadRequest().json(
            serde_json::json!({
                "error": "This does not look like a Cvent RFP format. Only Cvent templates are supported."
            }),
        )),
        Err(err) => Ok(HttpResponse::InternalServerError()
            .json(serde_json::json!({"error": err.to_string()}))),
    }
}

// Report export endpoint (Word-compatible HTML or PDF). Without a token the
// most recent report is exported.
async fn export_report(
    query: web::Query<ExportQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let reports = state.reports.lock().unwrap();
    let report = match &query.token {
        Some(token) => reports.iter().find(|(t, _)| t == token).map(|(_, r)| r),
        None => reports.last().map(|(_, r)| r),
    };
    let Some(report) = report else {
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"error": "No analysis available yet. Upload an RFP first."})));
    };

    match query.format.as_deref().unwrap_or("word") {
        "word" => Ok(HttpResponse::Ok()
            .content_type("application/msword")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"space-suggester-recommendations.doc\"",
            ))
            .body(render_report_doc(report))),
        "pdf" => {
            let bytes = render_report_pdf(report)
                .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;
            Ok(HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header((
                    "Content-Disposition",
                    "attachment; filename=\"space-suggester-recommendations.pdf\"",
                ))
                .body(bytes))
        }
        _ => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"error": "Unsupported export format"}))),
    }
}

// Room catalog endpoint
async fn get_rooms(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"rooms": state.rooms.rooms()})))
}

// Upload page
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16) -> std::io::Result<()> {
    let rooms = RoomDirectory::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    log::info!("loaded {} venue spaces from the capacity chart", rooms.len());

    let app_state = web::Data::new(AppState {
        rooms,
        reports: Mutex::new(Vec::new()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/api/parse-rfp", web::post().to(parse_rfp))
            .route("/api/export", web::get().to(export_report))
            .route("/api/rooms", web::get().to(get_rooms))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
