mod explore;
mod inspect;
mod query;
mod serve;

use std::sync::Arc;

use newsdash_core::{ConfigOverrides, DashboardConfig, Dataset, DatasetCache};
use tracing::error;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let bind = match &cli.command {
        Command::Serve(args) => args.bind,
        _ => None,
    };
    let config = DashboardConfig::resolve(ConfigOverrides {
        data_path: cli.data.clone(),
        bind_addr: bind,
        table_limit: cli.table_limit,
    })?;
    let dataset = load_dataset(&config)?;

    match &cli.command {
        Command::Serve(_) => serve::run(dataset, &config).await,
        Command::Query(args) => {
            let envelope = query::run(args, &dataset, &config)?;
            output::render(&envelope, cli.format, cli.pretty)
        }
        Command::Explore(args) => explore::run(args, dataset, &config),
        Command::Inspect => {
            let envelope = inspect::run(&dataset)?;
            output::render(&envelope, cli.format, cli.pretty)
        }
    }
}

/// Loads (or reuses) the configured dataset. Failure is fatal for every command.
fn load_dataset(config: &DashboardConfig) -> Result<Arc<Dataset>, CliError> {
    DatasetCache::global()
        .get_or_load(&config.data_path)
        .map_err(|err| {
            error!(path = %config.data_path.display(), error = %err, "dataset load failed");
            CliError::from(err)
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_dataset_exits_with_load_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DashboardConfig {
            data_path: dir.path().join("absent.csv"),
            ..DashboardConfig::default()
        };

        let err = load_dataset(&config).expect_err("must fail");
        assert!(matches!(err, CliError::Load(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn configured_csv_is_loaded_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gold.csv");
        fs::write(&path, "news_id,Date,Stock_symbol\n1,2020-01-02,aaa\n").expect("write csv");
        let config = DashboardConfig {
            data_path: path,
            ..DashboardConfig::default()
        };

        let first = load_dataset(&config).expect("loads");
        let second = load_dataset(&config).expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }
}
