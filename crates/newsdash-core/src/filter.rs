//! Predicate-based row selection over a [`Dataset`].
//!
//! Raw user input arrives as [`FilterParams`] (strings straight from a query
//! string or an interactive control). Resolving them against a dataset yields
//! a typed [`FilterSpec`] plus a warning for every value that had to be
//! ignored. Applying a spec never fails: an empty result is a valid outcome.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dataset::Dataset;
use crate::domain::columns::{
    ARTICLE_TITLE, DATE, NEWS_ID, SENTIMENT_SCORE_SIGNED, STOCK_SYMBOL, YEAR,
};
use crate::domain::{NewsDate, Record, Symbol};

/// Rows shown in a results table unless configured otherwise.
pub const DEFAULT_TABLE_LIMIT: usize = 200;

/// Whether a control value means "no restriction".
pub fn is_all(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("(all)")
}

/// Inclusive range on `sentiment_score_signed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// Filter values as supplied by a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub year: Option<String>,
    pub symbol: Option<String>,
    pub keyword: Option<String>,
    pub news_id: Option<String>,
    pub sent_min: Option<String>,
    pub sent_max: Option<String>,
}

impl FilterParams {
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_news_id(mut self, news_id: impl Into<String>) -> Self {
        self.news_id = Some(news_id.into());
        self
    }

    pub fn with_score_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.sent_min = Some(min.into());
        self.sent_max = Some(max.into());
        self
    }

    /// Validate the raw values against `dataset`.
    ///
    /// Malformed year or score values do not fail the request: the affected
    /// predicate is skipped (score bounds fall back to the dataset's global
    /// min/max) and a warning describes what was ignored.
    pub fn resolve(&self, dataset: &Dataset) -> ResolvedFilter {
        let mut warnings = Vec::new();

        let year = match selected(self.year.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    warnings.push(format!("ignoring year filter: '{raw}' is not a valid year"));
                    None
                }
            },
        };

        let score_range = dataset.has_column(SENTIMENT_SCORE_SIGNED).then(|| {
            self.resolve_score_range(dataset.options().score_bounds, &mut warnings)
        });

        for warning in &warnings {
            warn!(%warning, "filter value ignored");
        }

        ResolvedFilter {
            spec: FilterSpec {
                year,
                symbol: selected(self.symbol.as_deref()).and_then(Symbol::normalize),
                score_range,
                keyword: non_empty(self.keyword.as_deref()),
                news_id: non_empty(self.news_id.as_deref()),
            },
            warnings,
        }
    }

    fn resolve_score_range(
        &self,
        bounds: Option<ScoreRange>,
        warnings: &mut Vec<String>,
    ) -> ScoreRange {
        let defaults = bounds.unwrap_or(ScoreRange::new(f64::NEG_INFINITY, f64::INFINITY));
        match (
            parse_bound(self.sent_min.as_deref()),
            parse_bound(self.sent_max.as_deref()),
        ) {
            (Ok(min), Ok(max)) => {
                ScoreRange::new(min.unwrap_or(defaults.min), max.unwrap_or(defaults.max))
            }
            (min, max) => {
                let rejected = [min.err(), max.err()]
                    .into_iter()
                    .flatten()
                    .map(|raw| format!("'{raw}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                warnings.push(format!(
                    "ignoring sentiment range: {rejected} is not a number; using dataset bounds"
                ));
                defaults
            }
        }
    }
}

/// Outcome of [`FilterParams::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub spec: FilterSpec,
    /// One entry per ignored value.
    pub warnings: Vec<String>,
}

/// Independently optional predicates, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    pub year: Option<i32>,
    pub symbol: Option<Symbol>,
    pub score_range: Option<ScoreRange>,
    /// Case-insensitive substring of the article title.
    pub keyword: Option<String>,
    pub news_id: Option<String>,
}

impl FilterSpec {
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Symbol::normalize(symbol);
        self
    }

    pub fn with_score_range(mut self, min: f64, max: f64) -> Self {
        self.score_range = Some(ScoreRange::new(min, max));
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = non_empty(Some(keyword));
        self
    }

    pub fn with_news_id(mut self, news_id: &str) -> Self {
        self.news_id = non_empty(Some(news_id));
        self
    }

    /// Run every predicate over `dataset` and sort the survivors.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> FilterResult<'a> {
        apply(dataset, self)
    }
}

/// Rows selected by a [`FilterSpec`], newest first.
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> FilterResult<'a> {
    /// Untruncated match count.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    /// The first `limit` rows, for table display.
    pub fn page(&self, limit: usize) -> &[&'a Record] {
        &self.rows[..limit.min(self.rows.len())]
    }

    pub fn is_truncated(&self, limit: usize) -> bool {
        self.rows.len() > limit
    }

    pub fn first(&self) -> Option<&'a Record> {
        self.rows.first().copied()
    }

    pub fn find(&self, news_id: &str) -> Option<&'a Record> {
        self.rows.iter().copied().find(|record| record.has_id(news_id))
    }
}

/// Select the rows of `dataset` matching every predicate in `spec`.
///
/// Predicates on columns the dataset lacks are skipped. When the dataset has a
/// `Date` column the result is ordered newest first with undated rows last;
/// ties keep load order.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilterResult<'a> {
    let predicates = Predicates::new(dataset, spec);
    let mut rows = dataset
        .records()
        .iter()
        .filter(|record| predicates.matches(record))
        .collect::<Vec<_>>();

    if dataset.has_column(DATE) {
        rows.sort_by(|left, right| newest_first(left.date, right.date));
    }

    FilterResult { rows }
}

struct Predicates<'s> {
    year: Option<i32>,
    symbol: Option<&'s Symbol>,
    score_range: Option<ScoreRange>,
    keyword: Option<String>,
    news_id: Option<&'s str>,
}

impl<'s> Predicates<'s> {
    fn new(dataset: &Dataset, spec: &'s FilterSpec) -> Self {
        let when = |column: &str| dataset.has_column(column);
        Self {
            year: spec.year.filter(|_| when(YEAR)),
            symbol: spec.symbol.as_ref().filter(|_| when(STOCK_SYMBOL)),
            score_range: spec.score_range.filter(|_| when(SENTIMENT_SCORE_SIGNED)),
            keyword: spec
                .keyword
                .as_deref()
                .filter(|_| when(ARTICLE_TITLE))
                .map(str::to_lowercase),
            news_id: spec.news_id.as_deref().filter(|_| when(NEWS_ID)),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        if let Some(year) = self.year {
            if record.year != Some(year) {
                return false;
            }
        }

        if let Some(symbol) = self.symbol {
            if record.stock_symbol.as_ref() != Some(symbol) {
                return false;
            }
        }

        if let Some(range) = self.score_range {
            if !record
                .sentiment_score_signed
                .is_some_and(|score| range.contains(score))
            {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            let Some(title) = &record.article_title else {
                return false;
            };
            if !title.to_lowercase().contains(keyword.as_str()) {
                return false;
            }
        }

        if let Some(news_id) = self.news_id {
            if !record.has_id(news_id) {
                return false;
            }
        }

        true
    }
}

fn newest_first(left: Option<NewsDate>, right: Option<NewsDate>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A control value unless it is blank or an "all" sentinel.
fn selected(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !is_all(value))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_bound(raw: Option<&str>) -> Result<Option<f64>, String> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|bound| bound.is_finite())
            .map(Some)
            .ok_or_else(|| value.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: &str, symbol: &str, title: Option<&str>, score: Option<f64>) -> Record {
        let date = NewsDate::parse(date);
        Record {
            news_id: Some(id.to_owned()),
            year: date.map(NewsDate::year),
            date,
            stock_symbol: Symbol::normalize(symbol),
            article_title: title.map(str::to_owned),
            sentiment_score_signed: score,
            ..Record::default()
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn sample() -> Dataset {
        Dataset::from_records(
            "memory",
            columns(&[NEWS_ID, DATE, YEAR, STOCK_SYMBOL, ARTICLE_TITLE, SENTIMENT_SCORE_SIGNED]),
            vec![
                record("1", "2020-01-05", "AAA", Some("Stocks rally"), Some(0.4)),
                record("2", "garbage", "BBB", Some("Quiet day"), Some(0.0)),
                record("3", "2021-03-01", "aaa", None, Some(-0.6)),
                record("4", "2020-07-19", "CCC", Some("Stock split"), None),
            ],
        )
    }

    fn ids(result: &FilterResult<'_>) -> Vec<String> {
        result
            .rows()
            .iter()
            .filter_map(|record| record.news_id.clone())
            .collect()
    }

    #[test]
    fn sentinels_mean_no_restriction() {
        for sentinel in ["all", "ALL", "(All)", "", "  "] {
            assert!(is_all(sentinel), "{sentinel:?} should be a sentinel");
        }
        assert!(!is_all("2020"));
    }

    #[test]
    fn empty_spec_returns_everything_newest_first_undated_last() {
        let dataset = sample();
        let result = FilterSpec::default().apply(&dataset);
        assert_eq!(ids(&result), vec!["3", "4", "1", "2"]);
    }

    #[test]
    fn invalid_year_is_skipped_with_warning() {
        let dataset = sample();
        let resolved = FilterParams::default().with_year("twenty").resolve(&dataset);

        assert_eq!(resolved.spec.year, None);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("twenty"));
    }

    #[test]
    fn symbol_request_is_normalized() {
        let dataset = sample();
        let resolved = FilterParams::default().with_symbol(" aaa ").resolve(&dataset);
        let result = resolved.spec.apply(&dataset);
        assert_eq!(ids(&result), vec!["3", "1"]);
    }

    #[test]
    fn default_score_range_drops_rows_without_score() {
        let dataset = sample();
        let resolved = FilterParams::default().resolve(&dataset);

        assert_eq!(resolved.spec.score_range, Some(ScoreRange::new(-0.6, 0.4)));
        let result = resolved.spec.apply(&dataset);
        assert_eq!(ids(&result), vec!["3", "1", "2"]);
    }

    #[test]
    fn malformed_bound_falls_back_to_dataset_bounds() {
        let dataset = sample();
        let resolved = FilterParams::default()
            .with_score_range("0.1", "lots")
            .resolve(&dataset);

        assert_eq!(resolved.spec.score_range, Some(ScoreRange::new(-0.6, 0.4)));
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("'lots'"));
    }

    #[test]
    fn one_sided_bound_keeps_the_other_default() {
        let dataset = sample();
        let resolved = FilterParams {
            sent_min: Some(String::from("0")),
            ..FilterParams::default()
        }
        .resolve(&dataset);

        assert_eq!(resolved.spec.score_range, Some(ScoreRange::new(0.0, 0.4)));
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn keyword_never_matches_missing_titles() {
        let dataset = sample();
        let result = FilterSpec::default().with_keyword("STOCK").apply(&dataset);
        assert_eq!(ids(&result), vec!["4", "1"]);
    }

    #[test]
    fn news_id_matches_string_form() {
        let dataset = sample();
        let result = FilterSpec::default().with_news_id(" 4 ").apply(&dataset);
        assert_eq!(ids(&result), vec!["4"]);
        assert_eq!(result.find("4").and_then(|r| r.news_id.as_deref()), Some("4"));
    }

    #[test]
    fn predicates_on_missing_columns_are_skipped() {
        let dataset = Dataset::from_records(
            "memory",
            columns(&[NEWS_ID]),
            vec![
                Record {
                    news_id: Some(String::from("a")),
                    ..Record::default()
                },
                Record {
                    news_id: Some(String::from("b")),
                    ..Record::default()
                },
            ],
        );

        let spec = FilterSpec::default()
            .with_year(2020)
            .with_symbol("AAA")
            .with_keyword("news")
            .with_score_range(0.0, 1.0);
        let result = spec.apply(&dataset);
        assert_eq!(ids(&result), vec!["a", "b"], "input order is kept without a Date column");
    }

    #[test]
    fn page_truncates_but_len_does_not() {
        let dataset = sample();
        let result = FilterSpec::default().apply(&dataset);
        assert_eq!(result.page(2).len(), 2);
        assert_eq!(result.len(), 4);
        assert!(result.is_truncated(2));
        assert!(!result.is_truncated(4));
    }
}
