use std::io::{self, Write};

use newsdash_core::{Dataset, Envelope, EnvelopeMeta, FilterOptions};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{write_grid, TableView};

#[derive(Debug, Serialize)]
pub struct InspectReport {
    source: String,
    partitions: usize,
    rows: usize,
    columns: Vec<String>,
    options: FilterOptions,
}

pub fn run(dataset: &Dataset) -> Result<Envelope<InspectReport>, CliError> {
    let source = dataset.source().display().to_string();
    let report = InspectReport {
        source: source.clone(),
        partitions: dataset.partitions(),
        rows: dataset.len(),
        columns: dataset.columns().to_vec(),
        options: dataset.options().clone(),
    };
    let meta = EnvelopeMeta::for_request(source, 0)?;
    Ok(Envelope::success(meta, report))
}

impl TableView for InspectReport {
    fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "rows      : {}", self.rows)?;
        writeln!(out, "partitions: {}", self.partitions)?;
        let years = self
            .options
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>();
        writeln!(out, "years     : {}", years.join(", "))?;
        writeln!(out, "symbols   : {}", self.options.symbols.len())?;
        if let Some(bounds) = self.options.score_bounds {
            writeln!(out, "scores    : {:.4} .. {:.4}", bounds.min, bounds.max)?;
        }
        writeln!(out)?;

        let rows = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| vec![(index + 1).to_string(), column.clone()])
            .collect::<Vec<_>>();
        write_grid(out, &["#", "Column"], &rows)
    }
}
