use std::io::{self, Write};

use newsdash_core::{DashboardView, Envelope, RecordDetail};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

const MAX_CELL_WIDTH: usize = 40;

/// Data that can print itself as plain terminal tables.
pub trait TableView {
    fn write_table(&self, out: &mut dyn Write) -> io::Result<()>;
}

pub fn render<T>(envelope: &Envelope<T>, format: OutputFormat, pretty: bool) -> Result<(), CliError>
where
    T: Serialize + TableView,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_envelope(&mut out, envelope, format, pretty)
}

pub fn write_envelope<T>(
    out: &mut dyn Write,
    envelope: &Envelope<T>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError>
where
    T: Serialize + TableView,
{
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => {
            writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
            writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
            writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
            writeln!(out, "source      : {}", envelope.meta.source)?;
            writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
            write_warnings(out, &envelope.meta.warnings)?;
            writeln!(out)?;
            envelope.data.write_table(out)?;
        }
    }

    Ok(())
}

pub fn write_warnings(out: &mut dyn Write, warnings: &[String]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "warnings:")?;
    for warning in warnings {
        writeln!(out, "  - {warning}")?;
    }
    Ok(())
}

impl TableView for DashboardView {
    fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        let summary = &self.summary;
        writeln!(out, "== {} ==", summary.title)?;
        match (&summary.dominant_label, summary.dominant_pct) {
            (Some(label), Some(pct)) => {
                writeln!(out, "total articles: {}", summary.total_articles)?;
                writeln!(out, "dominant      : {label} ({pct:.1}%)")?;
                let rows = summary
                    .breakdown
                    .iter()
                    .map(|share| {
                        vec![
                            share.label.clone(),
                            share.count.to_string(),
                            format!("{:.1}%", share.percentage),
                        ]
                    })
                    .collect::<Vec<_>>();
                write_grid(out, &["Sentiment", "Count", "Percentage"], &rows)?;
            }
            _ => writeln!(out, "no labelled articles")?,
        }
        writeln!(out)?;

        writeln!(out, "== Annual sentiment trend ==")?;
        if self.trend.is_empty() {
            writeln!(out, "no trend data")?;
        } else {
            let rows = self
                .trend
                .iter()
                .map(|point| vec![point.year.to_string(), format!("{:.4}", point.mean_score)])
                .collect::<Vec<_>>();
            write_grid(out, &["Year", "Mean score"], &rows)?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "== Results: {} rows (showing {}) ==",
            self.row_count,
            self.table_rows.len()
        )?;
        if !self.table_rows.is_empty() {
            let headers = self
                .table_columns
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>();
            let rows = self
                .table_rows
                .iter()
                .map(|row| row.fields().iter().map(|(_, value)| cell(value)).collect())
                .collect::<Vec<Vec<String>>>();
            write_grid(out, &headers, &rows)?;
        }
        writeln!(out)?;

        writeln!(out, "== Detail ==")?;
        match &self.selected_record {
            Some(detail) => write_detail(out, detail),
            None => writeln!(out, "no record selected"),
        }
    }
}

fn write_detail(out: &mut dyn Write, detail: &RecordDetail) -> io::Result<()> {
    if let Some(news_id) = &detail.news_id {
        writeln!(out, "news_id: {news_id}")?;
    }
    if let Some(title) = &detail.title {
        writeln!(out, "title  : {title}")?;
    }
    for (label, row) in [("metrics", &detail.metrics), ("metadata", &detail.metadata)] {
        if row.is_empty() {
            continue;
        }
        writeln!(out, "{label}:")?;
        for (column, value) in row.fields() {
            writeln!(out, "  {column}: {}", cell(value))?;
        }
    }
    Ok(())
}

pub fn write_grid(out: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    writeln!(out, "{}", grid_line(headers.iter().copied(), &widths))?;
    writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-")
    )?;
    for row in rows {
        writeln!(out, "{}", grid_line(row.iter().map(String::as_str), &widths))?;
    }
    Ok(())
}

fn grid_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(value, width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_owned()
}

/// Display text for one JSON value, clipped to a readable width.
pub fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut clipped = text.chars().take(MAX_CELL_WIDTH - 3).collect::<String>();
    clipped.push_str("...");
    clipped
}
