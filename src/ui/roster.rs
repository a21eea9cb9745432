use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::ui::table::student_label;

/// Roster page at load time. Every student starts Absent; toggling and the
/// submit guard live in the page script, which is seeded from `script_state`
/// and posts the entries back in this order.
#[derive(Debug, Clone)]
pub struct RosterState {
    entries: Vec<AttendanceEntry>,
}

/// One toggle button as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentButton {
    pub id: String,
    pub label: String,
    pub class: String,
}

impl RosterState {
    pub fn new(ids: &[String]) -> Self {
        let mut entries: Vec<AttendanceEntry> = Vec::with_capacity(ids.len());
        for id in ids {
            if !entries.iter().any(|e| &e.student_id == id) {
                entries.push(AttendanceEntry {
                    student_id: id.clone(),
                    status: AttendanceStatus::Absent,
                });
            }
        }
        Self { entries }
    }

    pub fn buttons(&self) -> Vec<StudentButton> {
        self.entries
            .iter()
            .map(|e| StudentButton {
                id: e.student_id.clone(),
                label: student_label(&e.student_id),
                class: e.status.as_str().to_lowercase(),
            })
            .collect()
    }

    /// The entries as a JSON array literal safe to inline in a `<script>`.
    pub fn script_state(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string(&self.entries)?.replace("</", "<\\/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> RosterState {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        RosterState::new(&ids)
    }

    #[test]
    fn everyone_starts_absent() {
        let state = roster(&["1", "2", "3"]);
        assert!(state.buttons().iter().all(|b| b.class == "absent"));
        assert_eq!(state.buttons()[2].label, "Student 3");
    }

    #[test]
    fn duplicates_keep_their_first_position() {
        let state = roster(&["3", "1", "2", "1"]);
        let ids: Vec<String> = state.buttons().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn script_state_seeds_the_submission_payload() {
        let state = roster(&["2", "1"]);
        let seeded: serde_json::Value =
            serde_json::from_str(&state.script_state().unwrap()).unwrap();
        assert_eq!(
            seeded,
            serde_json::json!([
                { "studentId": "2", "status": "Absent" },
                { "studentId": "1", "status": "Absent" }
            ])
        );
    }

    #[test]
    fn script_state_cannot_close_the_script_tag() {
        let state = roster(&["</script><b>"]);
        let inlined = state.script_state().unwrap();
        assert!(!inlined.contains("</script>"));

        let parsed: serde_json::Value = serde_json::from_str(&inlined).unwrap();
        assert_eq!(parsed[0]["studentId"], "</script><b>");
    }
}
