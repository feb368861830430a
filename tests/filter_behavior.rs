//! Behavior-driven tests for the filter pipeline
//!
//! These tests verify which rows a user gets back for a filter, and in what
//! order, against a dataset loaded from disk.

use std::fs;

use newsdash_core::{apply, Dataset, FilterParams, FilterSpec, Record};
use tempfile::{tempdir, TempDir};

const GOLD_CSV: &str = "\
news_id,Date,Stock_symbol,Article_title,sentiment_label,sentiment_score_signed
1,2020-02-01,AAA,Stock rally continues,positive,0.62
2,2020-05-17,bbb ,Markets slide on rates,negative,-0.48
3,2021-01-09, aaa,Quiet session for STOCKS,neutral,0.01
4,,CCC,Undated stock note,neutral,0.10
5,2021-11-30,BBB,,positive,0.91
6,2019-07-04,AAA,Holiday trading,neutral,
7,2021-11-30,CCC,Same day as five,negative,-0.77
";

fn load_gold() -> (TempDir, Dataset) {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("gold.csv");
    fs::write(&path, GOLD_CSV).expect("write csv");
    let dataset = Dataset::load(&path).expect("gold loads");
    (temp, dataset)
}

fn ids(rows: &[&Record]) -> Vec<String> {
    rows.iter().filter_map(|r| r.news_id.clone()).collect()
}

// =============================================================================
// Filter: No restriction
// =============================================================================

#[test]
fn when_every_control_is_all_the_full_dataset_comes_back_newest_first() {
    // Given: The gold dataset
    let (_temp, dataset) = load_gold();

    // When: Every control is left at its "all" value
    let params = FilterParams::default()
        .with_year("all")
        .with_symbol("(All)")
        .with_keyword("");
    let resolved = params.resolve(&dataset);
    let spec = FilterSpec {
        score_range: None,
        ..resolved.spec
    };
    let result = apply(&dataset, &spec);

    // Then: All rows, date descending, ties in load order, undated last
    assert!(resolved.warnings.is_empty());
    assert_eq!(ids(result.rows()), vec!["5", "7", "3", "2", "1", "6", "4"]);
}

#[test]
fn when_range_is_defaulted_only_unscored_rows_drop_out() {
    // Given: The gold dataset
    let (_temp, dataset) = load_gold();

    // When: The request leaves the score bounds at the dataset defaults
    let resolved = FilterParams::default().resolve(&dataset);
    let defaulted = resolved.spec.apply(&dataset);

    // Then: The same rows come back as an explicit min/max range
    let bounds = dataset.options().score_bounds.expect("scores exist");
    let explicit = FilterSpec::default()
        .with_score_range(bounds.min, bounds.max)
        .apply(&dataset);
    assert_eq!(ids(defaulted.rows()), ids(explicit.rows()));
    assert_eq!(defaulted.len(), 6, "row 6 has no score");
}

// =============================================================================
// Filter: Single predicates
// =============================================================================

#[test]
fn when_user_filters_by_symbol_every_row_has_that_symbol() {
    // Given: Symbols stored with stray case and whitespace
    let (_temp, dataset) = load_gold();

    // When: The user asks for "aaa"
    let result = FilterSpec::default().with_symbol("aaa").apply(&dataset);

    // Then: Only normalized AAA rows are returned
    assert_eq!(ids(result.rows()), vec!["3", "1", "6"]);
    assert!(result
        .rows()
        .iter()
        .all(|r| r.stock_symbol.as_ref().map(|s| s.as_str()) == Some("AAA")));
}

#[test]
fn when_user_filters_by_score_range_bounds_are_inclusive() {
    let (_temp, dataset) = load_gold();

    let result = FilterSpec::default()
        .with_score_range(0.01, 0.62)
        .apply(&dataset);

    assert_eq!(ids(result.rows()), vec!["3", "1", "4"]);
    assert!(result.rows().iter().all(|r| {
        r.sentiment_score_signed
            .is_some_and(|score| (0.01..=0.62).contains(&score))
    }));
}

#[test]
fn when_user_searches_titles_case_does_not_matter() {
    let (_temp, dataset) = load_gold();

    let lower = FilterSpec::default().with_keyword("stock").apply(&dataset);
    let upper = FilterSpec::default().with_keyword("STOCK").apply(&dataset);

    assert_eq!(ids(lower.rows()), ids(upper.rows()));
    assert_eq!(ids(lower.rows()), vec!["3", "1", "4"]);
}

#[test]
fn when_user_picks_a_year_only_that_year_remains() {
    let (_temp, dataset) = load_gold();

    let resolved = FilterParams::default()
        .with_year("2021")
        .with_score_range("-1", "1")
        .resolve(&dataset);
    let result = resolved.spec.apply(&dataset);

    assert_eq!(ids(result.rows()), vec!["5", "7", "3"]);
}

// =============================================================================
// Filter: Composition and lenient input
// =============================================================================

#[test]
fn when_predicates_combine_they_are_anded_in_any_order() {
    let (_temp, dataset) = load_gold();

    let spec = FilterSpec::default()
        .with_year(2021)
        .with_symbol("ccc")
        .with_keyword("day")
        .with_score_range(-1.0, 0.0);
    let result = spec.apply(&dataset);

    assert_eq!(ids(result.rows()), vec!["7"]);
}

#[test]
fn when_year_is_not_a_number_the_filter_is_skipped_and_reported() {
    // Given: The gold dataset
    let (_temp, dataset) = load_gold();

    // When: The year control holds text
    let resolved = FilterParams::default()
        .with_year("twenty-twenty")
        .with_symbol("BBB")
        .resolve(&dataset);
    let result = resolved.spec.apply(&dataset);

    // Then: Other predicates still apply and the user is told
    assert_eq!(ids(result.rows()), vec!["5", "2"]);
    assert_eq!(resolved.warnings.len(), 1);
    assert!(resolved.warnings[0].contains("twenty-twenty"));
}

#[test]
fn when_a_bound_is_malformed_both_bounds_use_dataset_extremes() {
    let (_temp, dataset) = load_gold();

    let resolved = FilterParams::default()
        .with_score_range("0.5", "high")
        .resolve(&dataset);

    assert_eq!(resolved.spec.score_range, dataset.options().score_bounds);
    assert_eq!(resolved.warnings.len(), 1);
}

#[test]
fn when_nothing_matches_the_result_is_empty_not_an_error() {
    let (_temp, dataset) = load_gold();

    let result = FilterSpec::default()
        .with_keyword("no such headline")
        .apply(&dataset);

    assert!(result.is_empty());
    assert_eq!(result.first(), None);
}
