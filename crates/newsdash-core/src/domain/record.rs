use std::collections::BTreeMap;

use serde_json::{Number, Value};

use super::{NewsDate, Symbol};

/// Column names the pipeline understands.
pub mod columns {
    pub const NEWS_ID: &str = "news_id";
    pub const DATE: &str = "Date";
    pub const YEAR: &str = "Year";
    pub const STOCK_SYMBOL: &str = "Stock_symbol";
    pub const ARTICLE_TITLE: &str = "Article_title";
    pub const SENTIMENT_LABEL: &str = "sentiment_label";
    pub const SENTIMENT_SCORE_SIGNED: &str = "sentiment_score_signed";
}

/// One news/sentiment observation.
///
/// Columns the filter pipeline works on are typed; every other source column
/// is carried through in `attributes` exactly as it was read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Identifier in string form, whatever type the source stored it as.
    pub news_id: Option<String>,
    pub date: Option<NewsDate>,
    /// Derived from `date` at load time.
    pub year: Option<i32>,
    pub stock_symbol: Option<Symbol>,
    pub article_title: Option<String>,
    pub sentiment_label: Option<String>,
    pub sentiment_score_signed: Option<f64>,
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Value of a column for display, `Null` when the record has no value.
    ///
    /// Returns `None` only for names that are neither a typed column nor a
    /// carried attribute.
    pub fn field(&self, column: &str) -> Option<Value> {
        let value = match column {
            columns::NEWS_ID => text_value(self.news_id.as_deref()),
            columns::DATE => text_value(self.date.map(NewsDate::format).as_deref()),
            columns::YEAR => self
                .year
                .map(|year| Value::Number(Number::from(year)))
                .unwrap_or(Value::Null),
            columns::STOCK_SYMBOL => text_value(self.stock_symbol.as_ref().map(Symbol::as_str)),
            columns::ARTICLE_TITLE => text_value(self.article_title.as_deref()),
            columns::SENTIMENT_LABEL => text_value(self.sentiment_label.as_deref()),
            columns::SENTIMENT_SCORE_SIGNED => self
                .sentiment_score_signed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            other => return self.attributes.get(other).cloned(),
        };
        Some(value)
    }

    /// Whether the id matches `news_id` when both are compared as strings.
    pub fn has_id(&self, news_id: &str) -> bool {
        self.news_id.as_deref() == Some(news_id)
    }
}

fn text_value(value: Option<&str>) -> Value {
    value
        .map(|text| Value::String(text.to_owned()))
        .unwrap_or(Value::Null)
}
