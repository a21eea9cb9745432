use crate::model::attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, AttendanceSummary, SubmitAttendance,
    SubmitOutcome,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Monitor API",
        version = "0.1.0",
        description = r#"
## Classroom Attendance Monitor

Record one day's attendance for a class roster and read it back.

### Endpoints
- **Submit** a whole roster for a date; one row is appended per student
- **Summary** of Present/Absent counts across every stored row
- **Records** listing every stored row in append order, and a CSV export

### Notes
- Rows are append-only; submitting the same day twice stores it twice
- A missing or empty status is stored as `Absent`
- Only the exact values `Present` and `Absent` are counted in the summary

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit_attendance,
        crate::api::attendance::attendance_summary,
        crate::api::attendance::all_attendance_records,
        crate::api::attendance::download_csv,
    ),
    components(
        schemas(
            AttendanceStatus,
            AttendanceEntry,
            SubmitAttendance,
            SubmitOutcome,
            AttendanceRecord,
            AttendanceSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance submission and reporting APIs"),
    )
)]
pub struct ApiDoc;
