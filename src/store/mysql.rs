use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::instrument;

use super::{AppendOutcome, RecordsStore, Row, StoreError, StoreErrorKind};
use crate::db::{ensure_schema, init_db};

/// MySQL backend over the `attendance_rows` table.
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = init_db(database_url).await?;
        ensure_schema(&pool).await?;
        log::info!("MySQL records store connected, attendance_rows ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordsStore for MySqlStore {
    fn backend_tag(&self) -> &'static str {
        "mysql"
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn append_rows(&self, rows: &[Row]) -> Result<AppendOutcome, StoreError> {
        if rows.is_empty() {
            return Ok(AppendOutcome {
                updated_range: None,
                updated_rows: Some(0),
            });
        }

        // one transaction per submission keeps its rows together
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let mut insert: QueryBuilder<MySql> =
            QueryBuilder::new("INSERT INTO attendance_rows (student_id, date, status) ");
        insert.push_values(rows, |mut b, row| {
            b.push_bind(cell(row, 0))
                .push_bind(cell(row, 1))
                .push_bind(cell(row, 2));
        });

        let result = insert
            .build()
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        // MySQL reports the id of the first row of a multi-row insert
        let first = result.last_insert_id();
        let last = first + result.rows_affected().saturating_sub(1);
        Ok(AppendOutcome {
            updated_range: Some(format!("attendance_rows!{first}:{last}")),
            updated_rows: Some(result.rows_affected()),
        })
    }

    #[instrument(skip(self))]
    async fn read_rows(&self) -> Result<Vec<Row>, StoreError> {
        let mut stream = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT student_id, date, status
            FROM attendance_rows
            ORDER BY row_id
            "#,
        )
        .fetch(&self.pool);

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await {
            let (student_id, date, status) = row.map_err(store_error)?;
            rows.push(vec![student_id, date, status]);
        }

        Ok(rows)
    }
}

fn cell(row: &Row, index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned());
            let number = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number);
            let kind = error_kind(number, code.as_deref());
            let mut store_err = StoreError::new(kind, db_err.message().to_string());
            store_err.code = code;
            store_err
        }
        sqlx::Error::RowNotFound
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreError::malformed(err.to_string()),
        _ => StoreError::unreachable(err.to_string()),
    }
}

fn error_kind(number: Option<u16>, sqlstate: Option<&str>) -> StoreErrorKind {
    match (number, sqlstate) {
        // ER_DBACCESS_DENIED_ERROR, ER_ACCESS_DENIED_ERROR, ER_TABLEACCESS_DENIED_ERROR
        (Some(1044 | 1045 | 1142), _) => StoreErrorKind::PermissionDenied,
        // ER_NO_SUCH_TABLE
        (Some(1146), _) | (_, Some("42S02")) => StoreErrorKind::NotFound,
        _ => StoreErrorKind::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_are_permission_denied() {
        for number in [1044, 1045, 1142] {
            assert_eq!(
                error_kind(Some(number), Some("42000")),
                StoreErrorKind::PermissionDenied
            );
        }
        assert_eq!(error_kind(Some(1045), Some("28000")), StoreErrorKind::PermissionDenied);
    }

    #[test]
    fn syntax_errors_are_not_permission_problems() {
        // ER_PARSE_ERROR shares SQLSTATE 42000 with the access errors
        assert_eq!(error_kind(Some(1064), Some("42000")), StoreErrorKind::Rejected);
        assert_eq!(error_kind(None, Some("42000")), StoreErrorKind::Rejected);
    }

    #[test]
    fn missing_table_is_not_found() {
        assert_eq!(error_kind(Some(1146), Some("42S02")), StoreErrorKind::NotFound);
        assert_eq!(error_kind(None, Some("42S02")), StoreErrorKind::NotFound);
    }
}
