use std::env;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::filter::DEFAULT_TABLE_LIMIT;
use crate::ValidationError;

pub const DEFAULT_DATA_PATH: &str = "gold_with_sentiment_sample.csv";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

pub const DATA_ENV: &str = "NEWSDASH_DATA";
pub const BIND_ENV: &str = "NEWSDASH_BIND";
pub const TABLE_LIMIT_ENV: &str = "NEWSDASH_TABLE_LIMIT";

/// Runtime settings shared by every adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub table_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            table_limit: DEFAULT_TABLE_LIMIT,
        }
    }
}

/// Explicitly supplied values, typically command-line flags. Each one shadows its
/// environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub bind_addr: Option<SocketAddr>,
    pub table_limit: Option<usize>,
}

impl DashboardConfig {
    /// Overrides, then `NEWSDASH_*` environment variables, then defaults.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ValidationError> {
        Self::resolve_with(overrides, |key| env::var_os(key))
    }

    /// Same as [`Self::resolve`] with an injectable variable source.
    ///
    /// A variable is only read when its override is absent.
    pub fn resolve_with<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let data_path = match overrides.data_path {
            Some(path) => path,
            None => var(DATA_ENV).map_or(defaults.data_path, PathBuf::from),
        };
        let bind_addr = match overrides.bind_addr {
            Some(addr) => addr,
            None => match var(BIND_ENV) {
                Some(bind) => parse_bind_addr(&bind.to_string_lossy())?,
                None => defaults.bind_addr,
            },
        };
        let table_limit = match overrides.table_limit {
            Some(limit) => limit,
            None => match var(TABLE_LIMIT_ENV) {
                Some(limit) => parse_table_limit(&limit.to_string_lossy())?,
                None => defaults.table_limit,
            },
        };

        let config = Self {
            data_path,
            bind_addr,
            table_limit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.table_limit == 0 {
            return Err(ValidationError::InvalidTableLimit);
        }
        Ok(())
    }
}

pub fn parse_bind_addr(value: &str) -> Result<SocketAddr, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidBindAddress {
            value: value.to_owned(),
        })
}

pub fn parse_table_limit(value: &str) -> Result<usize, ValidationError> {
    let limit = value
        .trim()
        .parse::<usize>()
        .map_err(|_| ValidationError::UnparseableTableLimit {
            value: value.to_owned(),
        })?;
    if limit == 0 {
        return Err(ValidationError::InvalidTableLimit);
    }
    Ok(limit)
}
