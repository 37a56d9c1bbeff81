mod dates;
mod diary;
mod error;
mod pdf;
mod pipeline;
mod recommend;
mod report;
mod rfp;
mod rooms;
mod text;
mod web;

use report::build_report_lines;
use rooms::RoomDirectory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    // Web mode
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);
        web::start_server(port).await?;
        return Ok(());
    }

    // CLI mode: analyze a proposal file (plus optional diary) and print the report
    let Some(rfp_path) = args.get(1) else {
        eprintln!("Usage: space-suggester <rfp.pdf> [diary.pdf|diary.xls|diary.html]");
        eprintln!("       space-suggester web [port]");
        std::process::exit(2);
    };

    let rooms = RoomDirectory::load()?;
    println!("Loaded {} venue spaces from the capacity chart", rooms.len());

    let rfp_bytes = std::fs::read(rfp_path)?;
    let diary_bytes = match args.get(2) {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };
    let diary = diary_bytes
        .as_deref()
        .map(|bytes| (bytes, args.get(2).map(String::as_str).unwrap_or("")));

    let report = pipeline::analyze_submission(&rooms, &rfp_bytes, diary)?;
    for line in build_report_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}
