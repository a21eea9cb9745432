use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{AppendOutcome, RecordsStore, Row, StoreError};

/// Process-local store. Rows vanish on restart; outages can be switched on to
/// exercise the failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Row>>,
    read_outage: AtomicBool,
    write_outage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn set_read_outage(&self, down: bool) {
        self.read_outage.store(down, Ordering::SeqCst);
    }

    pub fn set_write_outage(&self, down: bool) {
        self.write_outage.store(down, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<Row> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RecordsStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn append_rows(&self, rows: &[Row]) -> Result<AppendOutcome, StoreError> {
        if self.write_outage.load(Ordering::SeqCst) {
            return Err(StoreError::unreachable("simulated write outage"));
        }

        let mut stored = self
            .rows
            .lock()
            .map_err(|_| StoreError::unreachable("memory store lock poisoned"))?;

        let first = stored.len() + 1;
        stored.extend(rows.iter().cloned());
        let last = stored.len();

        let updated_range = (!rows.is_empty()).then(|| format!("memory!A{first}:C{last}"));
        Ok(AppendOutcome {
            updated_range,
            updated_rows: Some(rows.len() as u64),
        })
    }

    async fn read_rows(&self) -> Result<Vec<Row>, StoreError> {
        if self.read_outage.load(Ordering::SeqCst) {
            return Err(StoreError::unreachable("simulated read outage"));
        }

        self.rows
            .lock()
            .map(|rows| rows.clone())
            .map_err(|_| StoreError::unreachable("memory store lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorKind;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[actix_web::test]
    async fn appends_keep_order_and_report_range() {
        let store = MemoryStore::with_rows(vec![row(&["Student ID", "Date", "Status"])]);

        let outcome = store
            .append_rows(&[
                row(&["1", "2024-01-01", "Present"]),
                row(&["2", "2024-01-01", "Absent"]),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.updated_range.as_deref(), Some("memory!A2:C3"));
        assert_eq!(outcome.updated_rows, Some(2));
        assert_eq!(store.read_rows().await.unwrap()[2], row(&["2", "2024-01-01", "Absent"]));
    }

    #[actix_web::test]
    async fn outages_fail_without_touching_rows() {
        let store = MemoryStore::new();
        store.set_write_outage(true);
        let err = store
            .append_rows(&[row(&["1", "2024-01-01", "Present"])])
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Unreachable);
        assert_eq!(store.row_count(), 0);

        store.set_read_outage(true);
        assert!(store.read_rows().await.is_err());
    }
}
