//! CLI argument definitions for newsdash.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Serve the HTTP dashboard |
//! | `query` | Render the dashboard once for a filter |
//! | `explore` | Interactive filter-and-redraw session |
//! | `inspect` | Columns, row count, and filter options |
//!
//! Settings resolve as flag, then `NEWSDASH_*` environment variable, then
//! default.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use newsdash_core::FilterParams;

#[derive(Debug, Parser)]
#[command(
    name = "newsdash",
    author,
    version,
    about = "Read-only news sentiment dashboard",
    long_about = "Filter a news/sentiment dataset by year, ticker, score range and title \
keyword, with an annual sentiment trend and a yearly label summary.\n\
\n\
The dataset is a CSV file, a parquet file, or a directory of parquet partitions."
)]
pub struct Cli {
    /// Dataset path. Defaults to NEWSDASH_DATA or gold_with_sentiment_sample.csv.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Maximum rows in a results table. Defaults to NEWSDASH_TABLE_LIMIT or 200.
    #[arg(long, global = true)]
    pub table_limit: Option<usize>,

    /// Output format for `query` and `inspect`.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain terminal tables.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard over HTTP.
    ///
    ///   newsdash serve --bind 0.0.0.0:5000
    Serve(ServeArgs),

    /// Render the dashboard once and exit.
    ///
    ///   newsdash query --year 2020 --symbol aapl --pretty
    ///   newsdash --format table query --keyword earnings
    Query(FilterArgs),

    /// Interactive session; type `help` for commands.
    Explore(FilterArgs),

    /// Show dataset columns, row count, and filter options.
    Inspect,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address. Defaults to NEWSDASH_BIND or 127.0.0.1:5000.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

/// Filter controls, passed through unvalidated like query parameters.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Year, or `all`.
    #[arg(long)]
    pub year: Option<String>,

    /// Ticker symbol, or `all`. Case-insensitive.
    #[arg(long)]
    pub symbol: Option<String>,

    /// Case-insensitive substring of the article title.
    #[arg(long)]
    pub keyword: Option<String>,

    /// Record to show in the detail pane.
    #[arg(long)]
    pub news_id: Option<String>,

    /// Lower sentiment bound. Defaults to the dataset minimum.
    #[arg(long, allow_hyphen_values = true)]
    pub sent_min: Option<String>,

    /// Upper sentiment bound. Defaults to the dataset maximum.
    #[arg(long, allow_hyphen_values = true)]
    pub sent_max: Option<String>,
}

impl From<&FilterArgs> for FilterParams {
    fn from(args: &FilterArgs) -> Self {
        Self {
            year: args.year.clone(),
            symbol: args.symbol.clone(),
            keyword: args.keyword.clone(),
            news_id: args.news_id.clone(),
            sent_min: args.sent_min.clone(),
            sent_max: args.sent_max.clone(),
        }
    }
}
