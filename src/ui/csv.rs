use std::borrow::Cow;

use crate::model::attendance::AttendanceRecord;
use crate::ui::table::student_label;

pub const CSV_HEADER: [&str; 3] = ["Student Number", "Date", "Status"];
pub const CSV_FILENAME: &str = "attendance_records.csv";

/// Header line plus one line per record, joined with `\n`.
pub fn records_to_csv(records: &[AttendanceRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for record in records {
        let student = student_label(&record.student_id);
        lines.push(
            [student.as_str(), record.date.as_str(), record.status.as_str()]
                .iter()
                .map(|field| escape_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

/// RFC 4180 quoting, only where a field needs it.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
