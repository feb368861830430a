//! Dataset loading and the process-wide load-once cache.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use newsdash_warehouse::{ColumnCast, DataSource, QueryResult, SqlColumn, Warehouse};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::domain::columns::{
    ARTICLE_TITLE, DATE, NEWS_ID, SENTIMENT_LABEL, SENTIMENT_SCORE_SIGNED, STOCK_SYMBOL, YEAR,
};
use crate::domain::{NewsDate, Record, Symbol};
use crate::error::LoadError;
use crate::filter::ScoreRange;

/// Casts requested from the warehouse so typed columns arrive predictably.
const LOAD_CASTS: [(&str, ColumnCast); 7] = [
    (NEWS_ID, ColumnCast::Text),
    (DATE, ColumnCast::Text),
    (YEAR, ColumnCast::BigInt),
    (STOCK_SYMBOL, ColumnCast::Text),
    (ARTICLE_TITLE, ColumnCast::Text),
    (SENTIMENT_LABEL, ColumnCast::Text),
    (SENTIMENT_SCORE_SIGNED, ColumnCast::Double),
];

/// Choices a user can pick from, computed once from the full dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Distinct years, newest first.
    pub years: Vec<i32>,
    /// Distinct normalized symbols, ascending.
    pub symbols: Vec<String>,
    /// Global min/max of the signed sentiment score.
    pub score_bounds: Option<ScoreRange>,
}

impl FilterOptions {
    fn compute(columns: &[String], records: &[Record]) -> Self {
        let has = |name: &str| columns.iter().any(|column| column == name);

        let years = if has(YEAR) {
            records
                .iter()
                .filter_map(|record| record.year)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .rev()
                .collect()
        } else {
            Vec::new()
        };

        let symbols = records
            .iter()
            .filter_map(|record| record.stock_symbol.as_ref())
            .map(Symbol::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let score_bounds = records
            .iter()
            .filter_map(|record| record.sentiment_score_signed)
            .fold(None, |bounds: Option<ScoreRange>, score| {
                Some(match bounds {
                    None => ScoreRange::new(score, score),
                    Some(range) => ScoreRange::new(range.min.min(score), range.max.max(score)),
                })
            });

        Self {
            years,
            symbols,
            score_bounds,
        }
    }
}

/// The full, immutable table of records.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    partitions: usize,
    columns: Vec<String>,
    records: Vec<Record>,
    options: FilterOptions,
}

impl Dataset {
    /// Read a CSV file, a parquet file, or a directory of parquet partitions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let failed = |error| LoadError::from_warehouse(path.to_path_buf(), error);

        let source = DataSource::resolve(path).map_err(failed)?;
        let warehouse = Warehouse::load(&source, &LOAD_CASTS).map_err(failed)?;
        let table = warehouse.read_all().map_err(failed)?;

        Ok(Self::from_table(
            source.root().to_path_buf(),
            source.files().len(),
            table,
        ))
    }

    /// Build a dataset from records already in memory.
    ///
    /// `columns` is the set of source columns the records were read from; it
    /// decides which predicates and display fields apply.
    pub fn from_records(
        source: impl Into<PathBuf>,
        columns: Vec<String>,
        records: Vec<Record>,
    ) -> Self {
        let options = FilterOptions::compute(&columns, &records);
        Self {
            source: source.into(),
            partitions: 1,
            columns,
            records,
            options,
        }
    }

    fn from_table(source: PathBuf, partitions: usize, table: QueryResult) -> Self {
        let QueryResult {
            columns: table_columns,
            rows,
            ..
        } = table;

        let mut columns = table_columns
            .iter()
            .map(|column| column.name.clone())
            .collect::<Vec<_>>();
        let derive_year = columns.iter().any(|column| column == DATE);
        if derive_year && !columns.iter().any(|column| column == YEAR) {
            columns.push(YEAR.to_owned());
        }

        let records = rows
            .into_iter()
            .map(|row| record_from_row(&table_columns, row, derive_year))
            .collect::<Vec<_>>();

        let mut dataset = Self::from_records(source, columns, records);
        dataset.partitions = partitions;
        dataset
    }

    pub fn source(&self) -> &Path {
        self.source.as_path()
    }

    /// Number of files the dataset was read from.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Column names in source order, with a derived `Year` appended.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// First record (in load order) whose id equals `news_id`.
    pub fn find(&self, news_id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.has_id(news_id))
    }
}

fn record_from_row(columns: &[SqlColumn], row: Vec<Value>, derive_year: bool) -> Record {
    let mut record = Record::default();
    let mut stored_year = None;

    for (column, value) in columns.iter().zip(row) {
        match column.name.as_str() {
            NEWS_ID => record.news_id = into_text(value),
            DATE => record.date = into_text(value).as_deref().and_then(NewsDate::parse),
            YEAR => stored_year = value.as_i64().and_then(|year| i32::try_from(year).ok()),
            STOCK_SYMBOL => {
                record.stock_symbol = into_text(value).as_deref().and_then(Symbol::normalize);
            }
            ARTICLE_TITLE => record.article_title = into_text(value),
            SENTIMENT_LABEL => record.sentiment_label = into_text(value),
            SENTIMENT_SCORE_SIGNED => {
                record.sentiment_score_signed = value.as_f64().filter(|score| score.is_finite());
            }
            other => {
                record.attributes.insert(other.to_owned(), value);
            }
        }
    }

    record.year = if derive_year {
        record.date.map(NewsDate::year)
    } else {
        stored_year
    };
    record
}

fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

/// Memoizes loaded datasets by source path.
///
/// The first successful load of a path is shared by every later caller;
/// failures are not remembered.
#[derive(Clone, Default)]
pub struct DatasetCache {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<Dataset>>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();
        GLOBAL.get_or_init(DatasetCache::new)
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, LoadError> {
        let path = path.as_ref();
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        // Held across the load so concurrent first calls load once.
        let mut datasets = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = datasets.get(&key) {
            return Ok(Arc::clone(dataset));
        }

        let started = Instant::now();
        let dataset = Arc::new(Dataset::load(path)?);
        info!(
            path = %path.display(),
            partitions = dataset.partitions(),
            rows = dataset.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "dataset loaded"
        );

        datasets.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of distinct sources loaded so far.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> SqlColumn {
        SqlColumn {
            name: name.to_owned(),
            r#type: String::from("VARCHAR"),
        }
    }

    #[test]
    fn derives_year_and_normalizes_symbol() {
        let columns = vec![column(NEWS_ID), column(DATE), column(STOCK_SYMBOL)];
        let row = vec![
            Value::from("17"),
            Value::from("2021-05-04 10:00:00"),
            Value::from(" tsla "),
        ];

        let record = record_from_row(&columns, row, true);
        assert_eq!(record.news_id.as_deref(), Some("17"));
        assert_eq!(record.year, Some(2021));
        assert_eq!(
            record.stock_symbol.as_ref().map(Symbol::as_str),
            Some("TSLA")
        );
    }

    #[test]
    fn unparseable_date_leaves_year_empty() {
        let columns = vec![column(DATE)];
        let record = record_from_row(&columns, vec![Value::from("n/a")], true);
        assert_eq!(record.date, None);
        assert_eq!(record.year, None);
    }

    #[test]
    fn stored_year_is_used_without_date_column() {
        let columns = vec![column(YEAR), column("pos_ratio")];
        let record = record_from_row(&columns, vec![Value::from(2019), Value::from(0.4)], false);
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.attributes.get("pos_ratio"), Some(&Value::from(0.4)));
    }

    #[test]
    fn options_cover_years_symbols_and_bounds() {
        let records = vec![
            Record {
                year: Some(2020),
                stock_symbol: Symbol::normalize("bbb"),
                sentiment_score_signed: Some(-0.3),
                ..Record::default()
            },
            Record {
                year: Some(2021),
                stock_symbol: Symbol::normalize("AAA"),
                sentiment_score_signed: Some(0.8),
                ..Record::default()
            },
            Record {
                year: Some(2020),
                stock_symbol: Symbol::normalize("aaa"),
                sentiment_score_signed: None,
                ..Record::default()
            },
        ];
        let columns = vec![
            YEAR.to_owned(),
            STOCK_SYMBOL.to_owned(),
            SENTIMENT_SCORE_SIGNED.to_owned(),
        ];

        let dataset = Dataset::from_records("memory", columns, records);
        let options = dataset.options();
        assert_eq!(options.years, vec![2021, 2020]);
        assert_eq!(options.symbols, vec!["AAA", "BBB"]);
        assert_eq!(options.score_bounds, Some(ScoreRange::new(-0.3, 0.8)));
    }
}
