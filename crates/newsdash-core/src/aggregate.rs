//! Read-only aggregations over the full dataset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::domain::columns::{SENTIMENT_LABEL, SENTIMENT_SCORE_SIGNED, YEAR};

/// Mean signed sentiment for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub mean_score: f64,
}

/// Per-year mean of `sentiment_score_signed`, ascending by year.
///
/// Always computed over the whole dataset, regardless of any active filter.
/// Rows without a year or a score are skipped; years with no scored rows do
/// not appear.
pub fn annual_trend(dataset: &Dataset) -> Vec<TrendPoint> {
    if !dataset.has_column(YEAR) || !dataset.has_column(SENTIMENT_SCORE_SIGNED) {
        return Vec::new();
    }

    let mut totals: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for record in dataset.records() {
        if let (Some(year), Some(score)) = (record.year, record.sentiment_score_signed) {
            let entry = totals.entry(year).or_default();
            entry.0 += score;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(year, (sum, count))| TrendPoint {
            year,
            mean_score: round_to(sum / count as f64, 4),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    /// Share of labelled rows, in percent, one decimal.
    pub percentage: f64,
}

/// Sentiment label distribution for one year (or all years).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub title: String,
    pub year: Option<i32>,
    pub total_articles: usize,
    pub dominant_label: Option<String>,
    pub dominant_pct: Option<f64>,
    /// Count descending; equal counts keep the label's first appearance order.
    pub breakdown: Vec<LabelShare>,
}

impl YearlySummary {
    fn empty(title: String, year: Option<i32>) -> Self {
        Self {
            title,
            year,
            total_articles: 0,
            dominant_label: None,
            dominant_pct: None,
            breakdown: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_articles == 0
    }
}

/// Label counts over rows matching only the year predicate.
///
/// `year = None` summarizes every row. Without a `Year` column the year is
/// ignored, the same way the filter pipeline skips it.
pub fn yearly_summary(dataset: &Dataset, year: Option<i32>) -> YearlySummary {
    let title = match year {
        Some(year) => format!("Overall Trend for {year}"),
        None => String::from("Overall Trend for All Years"),
    };

    if !dataset.has_column(SENTIMENT_LABEL) {
        return YearlySummary::empty(title, year);
    }

    let year_filter = year.filter(|_| dataset.has_column(YEAR));
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in dataset.records() {
        if year_filter.is_some_and(|year| record.year != Some(year)) {
            continue;
        }
        let Some(label) = record.sentiment_label.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let total = counts.iter().map(|(_, count)| count).sum::<usize>();
    if total == 0 {
        return YearlySummary::empty(title, year);
    }

    // Stable: ties stay in first-appearance order.
    counts.sort_by(|left, right| right.1.cmp(&left.1));

    let breakdown = counts
        .into_iter()
        .map(|(label, count)| LabelShare {
            label: label.to_owned(),
            count,
            percentage: round_to(count as f64 / total as f64 * 100.0, 1),
        })
        .collect::<Vec<_>>();

    YearlySummary {
        title,
        year,
        total_articles: total,
        dominant_label: breakdown.first().map(|share| share.label.clone()),
        dominant_pct: breakdown.first().map(|share| share.percentage),
        breakdown,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;

    fn record(year: Option<i32>, label: Option<&str>, score: Option<f64>) -> Record {
        Record {
            year,
            sentiment_label: label.map(str::to_owned),
            sentiment_score_signed: score,
            ..Record::default()
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        let columns = [YEAR, SENTIMENT_LABEL, SENTIMENT_SCORE_SIGNED]
            .iter()
            .map(|name| (*name).to_owned())
            .collect();
        Dataset::from_records("memory", columns, records)
    }

    #[test]
    fn trend_skips_nulls_and_rounds() {
        let dataset = dataset(vec![
            record(Some(2021), None, Some(1.0)),
            record(Some(2020), None, Some(0.1)),
            record(Some(2020), None, Some(0.2)),
            record(Some(2020), None, None),
            record(None, None, Some(5.0)),
            record(Some(2019), None, None),
            record(Some(2022), None, Some(1.0 / 3.0)),
        ]);

        let trend = annual_trend(&dataset);
        assert_eq!(
            trend,
            vec![
                TrendPoint { year: 2020, mean_score: 0.15 },
                TrendPoint { year: 2021, mean_score: 1.0 },
                TrendPoint { year: 2022, mean_score: 0.3333 },
            ]
        );
    }

    #[test]
    fn trend_needs_year_and_score_columns() {
        let dataset = Dataset::from_records(
            "memory",
            vec![YEAR.to_owned()],
            vec![record(Some(2020), None, Some(0.5))],
        );
        assert!(annual_trend(&dataset).is_empty());
    }

    #[test]
    fn summary_ties_keep_first_appearance() {
        let dataset = dataset(vec![
            record(Some(2020), Some("neutral"), None),
            record(Some(2020), Some("negative"), None),
            record(Some(2020), Some("negative"), None),
            record(Some(2020), Some("neutral"), None),
            record(Some(2020), Some("positive"), None),
        ]);

        let summary = yearly_summary(&dataset, Some(2020));
        assert_eq!(summary.total_articles, 5);
        assert_eq!(summary.dominant_label.as_deref(), Some("neutral"));
        assert_eq!(summary.dominant_pct, Some(40.0));
        let labels = summary
            .breakdown
            .iter()
            .map(|share| share.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["neutral", "negative", "positive"]);
        assert_eq!(summary.breakdown[2].percentage, 20.0);
    }

    #[test]
    fn summary_counts_only_labelled_rows_of_the_year() {
        let dataset = dataset(vec![
            record(Some(2020), Some("positive"), None),
            record(Some(2020), None, None),
            record(Some(2021), Some("negative"), None),
            record(Some(2020), Some("negative"), None),
            record(Some(2020), Some("positive"), None),
        ]);

        let summary = yearly_summary(&dataset, Some(2020));
        assert_eq!(summary.title, "Overall Trend for 2020");
        assert_eq!(summary.total_articles, 3);
        assert_eq!(summary.dominant_label.as_deref(), Some("positive"));
        assert_eq!(summary.dominant_pct, Some(66.7));
    }

    #[test]
    fn summary_without_matches_is_empty() {
        let dataset = dataset(vec![record(Some(2020), Some("positive"), None)]);

        let summary = yearly_summary(&dataset, Some(1999));
        assert!(summary.is_empty());
        assert_eq!(summary.dominant_label, None);
        assert_eq!(summary.dominant_pct, None);
        assert!(summary.breakdown.is_empty());
    }

    #[test]
    fn summary_without_label_column_is_empty() {
        let dataset = Dataset::from_records(
            "memory",
            vec![YEAR.to_owned()],
            vec![record(Some(2020), Some("positive"), None)],
        );

        let summary = yearly_summary(&dataset, None);
        assert_eq!(summary.title, "Overall Trend for All Years");
        assert!(summary.is_empty());
    }
}
