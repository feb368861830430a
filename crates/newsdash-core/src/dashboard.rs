//! Assembly of everything one dashboard render needs.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::aggregate::{annual_trend, yearly_summary, TrendPoint, YearlySummary};
use crate::dataset::{Dataset, FilterOptions};
use crate::domain::columns::{ARTICLE_TITLE, NEWS_ID};
use crate::domain::Record;
use crate::filter::{FilterParams, FilterSpec};

/// Table columns, in display order, shown when the dataset has them.
pub const DISPLAY_COLUMNS: [&str; 14] = [
    "Year",
    "Date",
    "Stock_symbol",
    "news_id",
    "Article_title",
    "sentiment_label",
    "sentiment_score_signed",
    "avg_sentiment_score",
    "pos_ratio",
    "neg_ratio",
    "article_count",
    "publisher_count",
    "avg_title_len",
    "sentiment_category",
];

pub const DETAIL_METRICS: [&str; 6] = [
    "sentiment_label",
    "sentiment_score_signed",
    "avg_sentiment_score",
    "pos_ratio",
    "neg_ratio",
    "sentiment_category",
];

pub const DETAIL_METADATA: [&str; 9] = [
    "Year",
    "Date",
    "Stock_symbol",
    "sample_news_id",
    "Publisher",
    "Url",
    "article_count",
    "publisher_count",
    "avg_title_len",
];

pub const NO_RESULTS: &str = "no results match the current filters";

/// Ordered column/value pairs. Serializes as a JSON object in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayRow(Vec<(String, Value)>);

impl DisplayRow {
    fn project(dataset: &Dataset, record: &Record, columns: &[&str]) -> Self {
        Self(
            columns
                .iter()
                .filter(|column| dataset.has_column(column))
                .map(|column| {
                    let value = record.field(column).unwrap_or(Value::Null);
                    ((*column).to_owned(), value)
                })
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DisplayRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Single-record detail pane: title, sentiment metrics, then metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecordDetail {
    pub news_id: Option<String>,
    pub title: Option<String>,
    pub metrics: DisplayRow,
    pub metadata: DisplayRow,
}

impl RecordDetail {
    pub fn from_record(dataset: &Dataset, record: &Record) -> Self {
        let shown = |column: &str| dataset.has_column(column);
        Self {
            news_id: record.news_id.clone().filter(|_| shown(NEWS_ID)),
            title: record.article_title.clone().filter(|_| shown(ARTICLE_TITLE)),
            metrics: DisplayRow::project(dataset, record, &DETAIL_METRICS),
            metadata: DisplayRow::project(dataset, record, &DETAIL_METADATA),
        }
    }
}

/// How the detail pane picks its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The first filtered row when a `news_id` is requested; nothing without one.
    Requested,
    /// The focused id when it survives the filter, else the first filtered row.
    Focus(Option<&'a str>),
}

/// Everything a dashboard render shows for one filter state.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DashboardView {
    pub filter: FilterSpec,
    /// Matching rows before truncation.
    pub row_count: usize,
    pub table_columns: Vec<String>,
    pub table_rows: Vec<DisplayRow>,
    pub truncated: bool,
    pub selected_record: Option<RecordDetail>,
    pub trend: Vec<TrendPoint>,
    pub summary: YearlySummary,
    pub options: FilterOptions,
    /// Carried into the response envelope by adapters.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl DashboardView {
    /// Resolve raw parameters and render with [`Selection::Requested`].
    pub fn from_params(dataset: &Dataset, params: &FilterParams, table_limit: usize) -> Self {
        let resolved = params.resolve(dataset);
        Self::build(
            dataset,
            &resolved.spec,
            resolved.warnings,
            table_limit,
            Selection::Requested,
        )
    }

    pub fn build(
        dataset: &Dataset,
        spec: &FilterSpec,
        mut warnings: Vec<String>,
        table_limit: usize,
        selection: Selection<'_>,
    ) -> Self {
        let result = spec.apply(dataset);

        let selected = match selection {
            Selection::Requested if spec.news_id.is_some() => result.first(),
            Selection::Requested => None,
            Selection::Focus(focus) => focus
                .and_then(|news_id| result.find(news_id))
                .or_else(|| result.first()),
        };

        if result.is_empty() {
            warnings.push(NO_RESULTS.to_owned());
        }

        let table_columns = DISPLAY_COLUMNS
            .iter()
            .filter(|column| dataset.has_column(column))
            .map(|column| (*column).to_owned())
            .collect();
        let table_rows = result
            .page(table_limit)
            .iter()
            .map(|record| DisplayRow::project(dataset, record, &DISPLAY_COLUMNS))
            .collect();

        Self {
            filter: spec.clone(),
            row_count: result.len(),
            table_columns,
            table_rows,
            truncated: result.is_truncated(table_limit),
            selected_record: selected.map(|record| RecordDetail::from_record(dataset, record)),
            trend: annual_trend(dataset),
            summary: yearly_summary(dataset, spec.year),
            options: dataset.options().clone(),
            warnings,
        }
    }
}
