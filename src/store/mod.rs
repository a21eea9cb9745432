use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use derive_more::Display;
use tracing::info;

use crate::config::StoreConfig;

pub mod memory;
pub mod mysql;
pub mod sheets;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use sheets::{ServiceAccountKey, SheetsStore};

/// One stored row: `[student_id, date, status]`, possibly ragged.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreErrorKind {
    #[display(fmt = "unreachable")]
    Unreachable,
    #[display(fmt = "permission denied")]
    PermissionDenied,
    #[display(fmt = "not found")]
    NotFound,
    #[display(fmt = "rejected")]
    Rejected,
    #[display(fmt = "malformed response")]
    Malformed,
}

/// Failure talking to the records store.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "records store {}: {}", kind, message)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    /// Upstream status or SQLSTATE, when the backend reported one.
    pub code: Option<String>,
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unreachable, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Malformed, message)
    }
}

/// What the store reports back after an append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u64>,
}

/// Append-only table of attendance rows.
///
/// Implementations never edit or delete rows. `read_rows` returns every row in
/// append order, or an error; never a partial scan.
#[async_trait]
pub trait RecordsStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn append_rows(&self, rows: &[Row]) -> Result<AppendOutcome, StoreError>;

    async fn read_rows(&self) -> Result<Vec<Row>, StoreError>;
}

/// Build the configured backend. Missing or invalid credentials fail here, at
/// startup, rather than on the first request.
pub async fn connect(config: &StoreConfig) -> anyhow::Result<Arc<dyn RecordsStore>> {
    let store: Arc<dyn RecordsStore> = match config {
        StoreConfig::Sheets {
            spreadsheet_id,
            range,
            credentials_path,
        } => {
            let key = ServiceAccountKey::from_file(credentials_path).with_context(|| {
                format!(
                    "failed to load service account key from {}",
                    credentials_path.display()
                )
            })?;
            Arc::new(SheetsStore::new(key, spreadsheet_id.clone(), range.clone())?)
        }
        StoreConfig::MySql { database_url } => Arc::new(
            MySqlStore::connect(database_url)
                .await
                .context("failed to connect to MySQL records store")?,
        ),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
    };

    info!(backend = store.backend_tag(), "Records store ready");
    Ok(store)
}
