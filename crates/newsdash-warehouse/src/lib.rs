//! # newsdash Warehouse
//!
//! DuckDB-based reader for the newsdash dataset.
//!
//! ## Overview
//!
//! This crate resolves a data path into a CSV file, a single Parquet file, or a
//! directory of Parquet partitions, and materializes it into one in-memory
//! DuckDB table. Callers ask for per-column casts at load time so that
//! identifier-like columns arrive as text and numeric measures as doubles,
//! whatever the source files inferred.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newsdash_warehouse::{ColumnCast, DataSource, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = DataSource::resolve("gold_with_sentiment_sample.csv")?;
//!     let warehouse = Warehouse::load(&source, &[("news_id", ColumnCast::Text)])?;
//!
//!     let table = warehouse.read_all()?;
//!     println!("Loaded {} rows", table.row_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Formats
//!
//! | Input | Reader |
//! |-------|--------|
//! | `*.csv` file | `read_csv_auto` |
//! | `*.parquet` file | `read_parquet` |
//! | directory | every `*.parquet` below it, unioned by column name |

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::types::Value as DuckValue;
use ::duckdb::Connection;
use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::debug;

/// Name of the in-memory table every source is loaded into.
pub const TABLE_NAME: &str = "news";

/// Errors that can occur while reading a data source.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` reader or query error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The data path does not exist.
    #[error("data path not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// The file extension is not one the reader understands.
    #[error("unsupported data file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A directory source contained no parquet partitions.
    #[error("no parquet files found under {}", path.display())]
    EmptySource { path: PathBuf },
}

/// On-disk format of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    Parquet,
}

impl SourceFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|extension| extension.to_str())?;
        if extension.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if extension.eq_ignore_ascii_case("parquet") {
            Some(Self::Parquet)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Cast applied to a column while the table is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCast {
    /// Read as text; CSV inference is overridden so ids keep their exact spelling.
    Text,
    /// `TRY_CAST` to `DOUBLE`; unparseable values become NULL.
    Double,
    /// `TRY_CAST` to `BIGINT`; unparseable values become NULL.
    BigInt,
}

impl ColumnCast {
    const fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "VARCHAR",
            Self::Double => "DOUBLE",
            Self::BigInt => "BIGINT",
        }
    }
}

/// Column metadata for the loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlColumn {
    /// Column name.
    pub name: String,
    /// Column data type.
    #[serde(rename = "type")]
    pub r#type: String,
}

/// Every row of the loaded table as JSON values.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column definitions.
    pub columns: Vec<SqlColumn>,
    /// Row data as JSON values, one entry per column.
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned.
    pub row_count: usize,
}

impl QueryResult {
    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

/// A resolved data path: its format and the concrete files to scan.
#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
    format: SourceFormat,
    files: Vec<PathBuf>,
}

impl DataSource {
    /// Resolve a path into the files that make up the dataset.
    ///
    /// A directory is scanned recursively for parquet partitions; a single file
    /// must carry a `.csv` or `.parquet` extension.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, WarehouseError> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            return Err(WarehouseError::SourceNotFound { path: root });
        }

        if root.is_dir() {
            let mut files = Vec::new();
            collect_parquet_files(root.as_path(), &mut files)?;
            if files.is_empty() {
                return Err(WarehouseError::EmptySource { path: root });
            }
            files.sort();
            return Ok(Self {
                root,
                format: SourceFormat::Parquet,
                files,
            });
        }

        let Some(format) = SourceFormat::from_path(root.as_path()) else {
            return Err(WarehouseError::UnsupportedFormat { path: root });
        };
        Ok(Self {
            files: vec![root.clone()],
            root,
            format,
        })
    }

    /// The path the source was resolved from.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Concrete files scanned, sorted by path for directory sources.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Build the DuckDB table function call that scans every file.
    ///
    /// `text_columns` forces CSV type inference to keep those columns as VARCHAR.
    fn scan_expression(&self, text_columns: &[&str]) -> String {
        let files = self
            .files
            .iter()
            .map(|path| format!("'{}'", escape_sql_string(path_to_sql(path).as_str())))
            .collect::<Vec<_>>()
            .join(", ");

        match self.format {
            SourceFormat::Csv if text_columns.is_empty() => {
                format!("read_csv_auto([{files}], header = true)")
            }
            SourceFormat::Csv => {
                let types = text_columns
                    .iter()
                    .map(|name| format!("'{}': 'VARCHAR'", escape_sql_string(name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("read_csv_auto([{files}], header = true, types = {{{types}}})")
            }
            SourceFormat::Parquet => {
                format!("read_parquet([{files}], union_by_name = true)")
            }
        }
    }
}

/// An in-memory DuckDB table holding one loaded data source.
pub struct Warehouse {
    connection: Connection,
}

impl Warehouse {
    /// Materialize `source` into the `news` table.
    ///
    /// Columns named in `casts` that exist in the source are converted while
    /// loading; absent names are ignored. Other columns keep their type, except
    /// that decimals become doubles and temporal or nested values become text.
    pub fn load(source: &DataSource, casts: &[(&str, ColumnCast)]) -> Result<Self, WarehouseError> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA disable_progress_bar;")?;

        let sniffed = describe(&connection, source.scan_expression(&[]).as_str())?;
        let text_columns = casts
            .iter()
            .filter(|(name, cast)| {
                *cast == ColumnCast::Text && sniffed.iter().any(|column| column.name == *name)
            })
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        let scan = source.scan_expression(&text_columns);

        let projection = sniffed
            .iter()
            .map(|column| project_column(column, casts))
            .collect::<Vec<_>>()
            .join(", ");

        debug!(
            format = source.format().as_str(),
            files = source.files().len(),
            columns = sniffed.len(),
            "materializing data source"
        );
        connection.execute_batch(
            format!("CREATE TABLE {TABLE_NAME} AS SELECT {projection} FROM {scan}").as_str(),
        )?;

        Ok(Self { connection })
    }

    /// Column metadata of the loaded table, in source order.
    pub fn columns(&self) -> Result<Vec<SqlColumn>, WarehouseError> {
        let mut statement = self.connection.prepare(
            format!(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_name = '{TABLE_NAME}' ORDER BY ordinal_position"
            )
            .as_str(),
        )?;
        let columns = statement
            .query_map([], |row| {
                Ok(SqlColumn {
                    name: row.get(0)?,
                    r#type: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Read every row of the loaded table.
    pub fn read_all(&self) -> Result<QueryResult, WarehouseError> {
        let columns = self.columns()?;
        let column_count = columns.len();

        let mut statement = self
            .connection
            .prepare(format!("SELECT * FROM {TABLE_NAME}").as_str())?;
        let mut cursor = statement.query([])?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next()? {
            rows.push(read_row(row, column_count)?);
        }

        Ok(QueryResult {
            columns,
            row_count: rows.len(),
            rows,
        })
    }
}

/// Column names and types produced by a scan expression.
fn describe(connection: &Connection, scan: &str) -> Result<Vec<SqlColumn>, WarehouseError> {
    let mut statement = connection.prepare(format!("DESCRIBE SELECT * FROM {scan}").as_str())?;
    let columns = statement
        .query_map([], |row| {
            Ok(SqlColumn {
                name: row.get(0)?,
                r#type: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Select-list entry for one column, applying any requested cast.
fn project_column(column: &SqlColumn, casts: &[(&str, ColumnCast)]) -> String {
    let identifier = quote_identifier(column.name.as_str());
    let requested = casts
        .iter()
        .find(|(name, _)| *name == column.name)
        .map(|(_, cast)| *cast);

    match requested {
        Some(ColumnCast::Text) => {
            format!("CAST({identifier} AS VARCHAR) AS {identifier}")
        }
        Some(cast) => {
            format!(
                "TRY_CAST({identifier} AS {}) AS {identifier}",
                cast.sql_type()
            )
        }
        None if is_json_native(column.r#type.as_str()) => identifier,
        None if column.r#type.starts_with("DECIMAL") => {
            format!("CAST({identifier} AS DOUBLE) AS {identifier}")
        }
        None => format!("CAST({identifier} AS VARCHAR) AS {identifier}"),
    }
}

/// Whether a DuckDB type maps directly onto a JSON scalar.
fn is_json_native(data_type: &str) -> bool {
    matches!(
        data_type,
        "BOOLEAN"
            | "TINYINT"
            | "SMALLINT"
            | "INTEGER"
            | "BIGINT"
            | "UTINYINT"
            | "USMALLINT"
            | "UINTEGER"
            | "UBIGINT"
            | "FLOAT"
            | "DOUBLE"
            | "VARCHAR"
            | "BLOB"
    )
}

/// Read a single row from the result set.
fn read_row(row: &::duckdb::Row<'_>, column_count: usize) -> Result<Vec<Value>, ::duckdb::Error> {
    let mut output = Vec::with_capacity(column_count);
    for index in 0..column_count {
        let value: DuckValue = row.get(index)?;
        output.push(to_json_value(value));
    }
    Ok(output)
}

/// Convert a DuckDB value to a JSON value.
fn to_json_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(value) => Value::Bool(value),
        DuckValue::TinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::SmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::Int(value) => Value::Number(Number::from(value)),
        DuckValue::BigInt(value) => Value::Number(Number::from(value)),
        DuckValue::UTinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::USmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::UInt(value) => Value::Number(Number::from(value)),
        DuckValue::UBigInt(value) => Value::Number(Number::from(value)),
        DuckValue::HugeInt(value) => Value::String(value.to_string()),
        DuckValue::Float(value) => number_from_f64(f64::from(value)),
        DuckValue::Double(value) => number_from_f64(value),
        DuckValue::Text(value) => Value::String(value),
        DuckValue::Blob(value) => Value::String(hex::encode(value)),
        other => Value::String(format!("{other:?}")),
    }
}

/// Convert an f64 to a JSON number, returning Null for NaN/Inf.
fn number_from_f64(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Recursively collect parquet files from a directory.
fn collect_parquet_files(root: &Path, files: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_parquet_files(path.as_path(), files)?;
            continue;
        }
        if SourceFormat::from_path(path.as_path()) == Some(SourceFormat::Parquet) {
            files.push(path);
        }
    }

    Ok(())
}

/// Convert a path to a SQL-compatible string (forward slashes).
fn path_to_sql(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Escape a string for inclusion in a single-quoted SQL literal.
///
/// Only used for file paths found on disk and for column names read back from
/// the source itself.
fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Quote a column name as a SQL identifier.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
