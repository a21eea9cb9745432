use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use strum::{EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
}

impl AttendanceStatus {
    /// Exact, case-sensitive match on a stored status cell.
    pub fn from_cell(cell: &str) -> Option<Self> {
        cell.parse().ok()
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One stored row as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "studentId": "1",
    "date": "2024-01-01",
    "status": "Present"
}))]
pub struct AttendanceRecord {
    pub student_id: String,
    #[schema(example = "2024-01-01")]
    pub date: String,
    /// Whatever the store holds; usually `Present` or `Absent`.
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    #[serde(rename = "Present")]
    #[schema(example = 12)]
    pub present: u64,
    #[serde(rename = "Absent")]
    #[schema(example = 3)]
    pub absent: u64,
}

impl AttendanceSummary {
    pub fn count(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.present + self.absent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[schema(example = "1")]
    pub student_id: String,
    pub status: AttendanceStatus,
}

/// Request body of `POST /submit-attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "attendance": [
        { "studentId": 1, "status": "Present" },
        { "studentId": 2, "status": "Absent" }
    ],
    "date": "2024-01-01"
}))]
pub struct SubmitAttendance {
    pub attendance: Vec<AttendanceEntry>,
    #[schema(example = "2024-01-01")]
    pub date: String,
}

/// Response of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    #[schema(example = "Attendance saved successfully!")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Sheet1!A12:C21")]
    pub updated_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 10)]
    pub updated_rows: Option<u64>,
}

/// Submitted status as stored: missing or falsy (`null`, `false`, `0`, `""`)
/// means Absent, anything else is kept as its string form.
pub fn normalize_status(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            AttendanceStatus::Absent.as_str().to_string()
        }
        Some(Value::String(s)) if s.is_empty() => AttendanceStatus::Absent.as_str().to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            AttendanceStatus::Absent.as_str().to_string()
        }
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

/// String form of a submitted student id. Only non-empty strings and numbers
/// count as present.
pub fn normalize_student_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

// Integral floats print without the fraction, so `1.0` and `1` are one student.
fn number_text(n: &Number) -> String {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
            format!("{}", v as i64)
        }
        _ => n.to_string(),
    }
}
