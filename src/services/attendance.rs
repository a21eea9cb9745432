use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, SubmitOutcome, normalize_status,
    normalize_student_id,
};
use crate::store::{RecordsStore, Row};

pub const SAVED_MESSAGE: &str = "Attendance saved successfully!";
const SAVE_FAILED: &str = "Failed to save attendance";
const FETCH_FAILED: &str = "Failed to fetch data";

const HEADER_ID_TOKENS: [&str; 3] = ["Student ID", "Student Number", "studentId"];

/// A validated submission, already in row form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub date: String,
    pub rows: Vec<Row>,
}

impl Submission {
    /// Presence checks only: `attendance` must be a non-empty array of objects
    /// carrying a `studentId`, and `date` a non-empty string.
    pub fn parse(payload: &Value) -> Result<Self, AppError> {
        let attendance = match payload.get("attendance") {
            None | Some(Value::Null) => {
                return Err(AppError::invalid_input("attendance is required"));
            }
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(AppError::invalid_input("attendance must be an array")),
        };

        if attendance.is_empty() {
            return Err(AppError::invalid_input("attendance must not be empty"));
        }

        let date = match payload.get("date") {
            Some(Value::String(date)) if !date.trim().is_empty() => date.clone(),
            None | Some(Value::Null) => return Err(AppError::invalid_input("date is required")),
            Some(_) => return Err(AppError::invalid_input("date must be a non-empty string")),
        };

        let rows = attendance
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let entry = entry.as_object().ok_or_else(|| {
                    AppError::invalid_input(format!("attendance[{index}] must be an object"))
                })?;
                let student_id = normalize_student_id(entry.get("studentId")).ok_or_else(|| {
                    AppError::invalid_input(format!("attendance[{index}].studentId is required"))
                })?;
                Ok(vec![student_id, date.clone(), normalize_status(entry.get("status"))])
            })
            .collect::<Result<Vec<Row>, AppError>>()?;

        Ok(Self { date, rows })
    }
}

/// Records service. Holds no state of its own beyond the store client.
pub struct AttendanceService {
    store: Arc<dyn RecordsStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordsStore>) -> Self {
        Self { store }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    /// Validate and append one day's roster. Nothing is written when
    /// validation fails; duplicate submissions append duplicate rows.
    #[instrument(skip(self, payload), fields(submission_id = %Uuid::new_v4()))]
    pub async fn submit(&self, payload: &Value) -> Result<SubmitOutcome, AppError> {
        let submission = Submission::parse(payload)?;
        info!(
            date = %submission.date,
            rows = submission.rows.len(),
            "Received attendance submission"
        );

        let outcome = self
            .store
            .append_rows(&submission.rows)
            .await
            .map_err(|e| {
                error!(error = %e, backend = self.store.backend_tag(), "Failed to append attendance rows");
                AppError::from_store(SAVE_FAILED, e)
            })?;

        info!(
            updated_range = outcome.updated_range.as_deref().unwrap_or("-"),
            "Attendance saved"
        );

        Ok(SubmitOutcome {
            message: SAVED_MESSAGE.to_string(),
            updated_range: outcome.updated_range,
            updated_rows: outcome.updated_rows,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_summary(&self) -> Result<AttendanceSummary, AppError> {
        let rows = self.scan().await?;
        Ok(summarize(&rows))
    }

    #[instrument(skip(self))]
    pub async fn list_records(&self) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = self.scan().await?;
        Ok(to_records(&rows))
    }

    async fn scan(&self) -> Result<Vec<Row>, AppError> {
        self.store.read_rows().await.map_err(|e| {
            error!(error = %e, backend = self.store.backend_tag(), "Failed to read attendance rows");
            AppError::from_store(FETCH_FAILED, e)
        })
    }
}

/// Token match on a would-be header row. A data row whose id cell happens to
/// read "Student ID" is misclassified; only the first row is ever checked.
pub fn is_header_row(row: &Row) -> bool {
    let first = row.first().map(|c| c.trim()).unwrap_or_default();
    if HEADER_ID_TOKENS.iter().any(|token| first.eq_ignore_ascii_case(token)) {
        return true;
    }
    matches!(
        (row.get(1).map(|c| c.trim()), row.get(2).map(|c| c.trim())),
        (Some("Date"), Some("Status"))
    )
}

/// Rows after the optional header.
pub fn data_rows(rows: &[Row]) -> &[Row] {
    match rows.first() {
        Some(first) if is_header_row(first) => &rows[1..],
        _ => rows,
    }
}

/// Exact "Present"/"Absent" counts; any other status value is ignored.
pub fn summarize(rows: &[Row]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for status in data_rows(rows)
        .iter()
        .filter_map(|row| row.get(2))
        .filter_map(|cell| AttendanceStatus::from_cell(cell))
    {
        summary.count(status);
    }
    summary
}

/// Every data row with at least three cells, in store order.
pub fn to_records(rows: &[Row]) -> Vec<AttendanceRecord> {
    data_rows(rows)
        .iter()
        .filter(|row| row.len() >= 3)
        .map(|row| AttendanceRecord {
            student_id: row[0].clone(),
            date: row[1].clone(),
            status: row[2].clone(),
        })
        .collect()
}
