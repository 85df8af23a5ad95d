//! SQL execution against PostgreSQL.
//!
//! Runs caller-supplied SQL verbatim and stringifies the result set so the
//! tool layer can render it as plain text. Catalog lookups the registry
//! issues on its own behalf go through the typed helpers, which bind their
//! inputs instead of splicing them into the query text.

use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row};
use thiserror::Error;

/// Errors from query execution. Display carries the driver message, which
/// the tool layer renders into result text.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// An executed result set with values stringified per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    /// Column names in result order. Empty when the query returned no rows.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A single column from `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// One column entry of the full schema dump, ordered by table then
/// ordinal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

/// Executes SQL over a shared connection pool.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: PgPool,
}

impl QueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run an arbitrary SQL statement and stringify the result set.
    pub async fn run(&self, sql: &str) -> Result<QueryOutput, ExecutorError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.columns().len())
                    .map(|index| stringify_cell(row, index))
                    .collect()
            })
            .collect();

        Ok(QueryOutput { columns, rows })
    }

    /// Names of all public-schema tables, ordered by name.
    pub async fn list_table_names(&self) -> Result<Vec<String>, ExecutorError> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let names = rows
            .iter()
            .map(|row| row.try_get("table_name"))
            .collect::<Result<_, _>>()?;
        Ok(names)
    }

    /// Column metadata for one table, ordered by ordinal position. An
    /// unknown table yields an empty list.
    pub async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescription>, ExecutorError> {
        let rows = sqlx::query(
            "SELECT column_name, data_type, is_nullable \
             FROM information_schema.columns \
             WHERE table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ColumnDescription {
                    name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                })
            })
            .collect()
    }

    /// Every column of every public-schema table.
    pub async fn schema_dump(&self) -> Result<Vec<SchemaColumn>, ExecutorError> {
        let rows = sqlx::query(
            "SELECT table_name, column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = 'public' ORDER BY table_name, ordinal_position",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SchemaColumn {
                    table_name: row.try_get("table_name")?,
                    column_name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    is_nullable: row.try_get("is_nullable")?,
                    column_default: row.try_get("column_default")?,
                })
            })
            .collect()
    }
}

/// Stringify one cell by trying progressively narrower decodes. Postgres
/// types outside the ladder render as `?`.
fn stringify_cell(row: &PgRow, index: usize) -> String {
    macro_rules! try_decode {
        ($ty:ty) => {
            if let Ok(value) = row.try_get::<Option<$ty>, _>(index) {
                return match value {
                    Some(v) => v.to_string(),
                    None => "NULL".to_string(),
                };
            }
        };
    }

    try_decode!(String);
    try_decode!(i64);
    try_decode!(i32);
    try_decode!(i16);
    try_decode!(f64);
    try_decode!(f32);
    try_decode!(bool);
    try_decode!(uuid::Uuid);
    try_decode!(serde_json::Value);

    "?".to_string()
}
