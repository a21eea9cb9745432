use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use serde_json::Value;

use crate::error::AppError;
use crate::services::attendance::AttendanceService;
use crate::ui::csv::{CSV_FILENAME, records_to_csv};

/// Submit one day's attendance
#[utoipa::path(
    post,
    path = "/submit-attendance",
    request_body(
        content = SubmitAttendance,
        description = "Every student's status for one date",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Attendance saved", body = SubmitOutcome),
        (status = 400, description = "Missing or invalid fields", body = Object, example = json!({
            "error": "attendance must not be empty"
        })),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Records store unavailable", body = Object, example = json!({
            "error": "Failed to save attendance",
            "message": "records store permission denied: The caller does not have permission",
            "code": "403"
        }))
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    service: web::Data<AttendanceService>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.submit(&payload).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Present/absent counts over all records
#[utoipa::path(
    get,
    path = "/attendance-data",
    responses(
        (status = 200, description = "Summary counts", body = AttendanceSummary),
        (status = 500, description = "Records store unavailable", body = Object, example = json!({
            "error": "Failed to fetch data"
        }))
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let summary = service.list_summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Every stored record, in store order
#[utoipa::path(
    get,
    path = "/all-attendance-records",
    responses(
        (status = 200, description = "All records", body = [AttendanceRecord]),
        (status = 500, description = "Records store unavailable", body = Object, example = json!({
            "error": "Failed to fetch data"
        }))
    ),
    tag = "Attendance"
)]
pub async fn all_attendance_records(
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let records = service.list_records().await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Download all records as CSV
#[utoipa::path(
    get,
    path = "/attendance_records.csv",
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 500, description = "Records store unavailable")
    ),
    tag = "Attendance"
)]
pub async fn download_csv(service: web::Data<AttendanceService>) -> Result<HttpResponse, AppError> {
    // fetched afresh, never shared with the table view
    let records = service.list_records().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(CSV_FILENAME.to_string())],
        })
        .body(records_to_csv(&records)))
}
