use std::time::Instant;

use newsdash_core::{DashboardConfig, DashboardView, Dataset, Envelope, EnvelopeMeta, FilterParams};

use crate::cli::FilterArgs;
use crate::error::CliError;

pub fn run(
    args: &FilterArgs,
    dataset: &Dataset,
    config: &DashboardConfig,
) -> Result<Envelope<DashboardView>, CliError> {
    let started = Instant::now();
    let params = FilterParams::from(args);
    let mut view = DashboardView::from_params(dataset, &params, config.table_limit);

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::for_request(dataset.source().display().to_string(), latency_ms)?;
    meta.extend_warnings(view.warnings.drain(..));
    Ok(Envelope::success(meta, view))
}
