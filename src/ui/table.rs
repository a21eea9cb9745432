use crate::model::attendance::AttendanceRecord;

pub const EMPTY_PLACEHOLDER: &str = "No attendance records found";
pub const FAILED_PLACEHOLDER: &str = "Failed to load attendance data";

pub fn student_label(student_id: &str) -> String {
    format!("Student {student_id}")
}

/// CSS class for a status cell.
pub fn status_class(status: &str) -> String {
    status.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub student: String,
    pub date: String,
    pub status: String,
    pub status_class: String,
}

/// Body of the records table: one row per record, or a single placeholder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsTable {
    pub rows: Vec<TableRow>,
    placeholder: &'static str,
}

impl RecordsTable {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let rows = records
            .iter()
            .map(|record| TableRow {
                student: student_label(&record.student_id),
                date: record.date.clone(),
                status: record.status.clone(),
                status_class: status_class(&record.status),
            })
            .collect();

        Self {
            rows,
            placeholder: EMPTY_PLACEHOLDER,
        }
    }

    pub fn failed() -> Self {
        Self {
            rows: Vec::new(),
            placeholder: FAILED_PLACEHOLDER,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder
    }
}
