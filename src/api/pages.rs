use actix_web::{HttpResponse, web};
use askama::Template;
use tracing::warn;

use crate::config::Config;
use crate::error::AppError;
use crate::services::attendance::AttendanceService;
use crate::ui::chart::{CHART_TITLE, PieChart};
use crate::ui::csv::CSV_FILENAME;
use crate::ui::roster::{RosterState, StudentButton};
use crate::ui::table::RecordsTable;

#[derive(Template)]
#[template(path = "roster.html")]
struct RosterPage {
    buttons: Vec<StudentButton>,
    /// Initial entries the page script toggles and submits.
    roster_json: String,
    chart_title: &'static str,
}

#[derive(Template)]
#[template(path = "records.html")]
struct RecordsPage {
    table: RecordsTable,
    /// Chart.js config; empty when the summary could not be loaded.
    chart_json: String,
    csv_filename: &'static str,
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Roster page: one toggle per known student, all Absent on load.
pub async fn roster_page(config: web::Data<Config>) -> Result<HttpResponse, AppError> {
    let state = RosterState::new(&config.roster);
    let page = RosterPage {
        buttons: state.buttons(),
        roster_json: state.script_state().map_err(AppError::render)?,
        chart_title: CHART_TITLE,
    };
    Ok(html(page.render().map_err(AppError::render)?))
}

/// Records page. Store failures degrade to the placeholder row instead of an
/// error page.
pub async fn records_page(service: web::Data<AttendanceService>) -> Result<HttpResponse, AppError> {
    let table = match service.list_records().await {
        Ok(records) => RecordsTable::from_records(&records),
        Err(e) => {
            warn!(error = %e, "Rendering records page without data");
            RecordsTable::failed()
        }
    };

    let chart_json = match service.list_summary().await {
        Ok(summary) => PieChart::from_summary(&summary)
            .to_json()
            .map_err(AppError::render)?,
        Err(e) => {
            warn!(error = %e, "Rendering records page without chart");
            String::new()
        }
    };

    let page = RecordsPage {
        table,
        chart_json,
        csv_filename: CSV_FILENAME,
    };
    Ok(html(page.render().map_err(AppError::render)?))
}
