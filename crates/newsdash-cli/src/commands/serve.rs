use std::sync::Arc;

use newsdash_core::{DashboardConfig, Dataset};
use newsdash_web::AppState;

use crate::error::CliError;

pub async fn run(dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<(), CliError> {
    let state = AppState::new(dataset, config.table_limit);
    newsdash_web::serve(state, config.bind_addr).await?;
    Ok(())
}
