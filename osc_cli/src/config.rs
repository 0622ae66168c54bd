//! Layered configuration: defaults, overridden by an optional `--config`
//! TOML file, overridden by whatever CLI flags the user actually passed.
//! Mirrors `common::config`'s `RepConfig`/`read_config` shape.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use osc::error::{OscError, OscResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscCliConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub alter: String,

    pub concurrency: usize,
    pub checksum_concurrency: usize,
    pub target_chunk_time_ms: u64,
    pub attempt_inplace_ddl: bool,
    pub checksum: bool,
    pub replica_dsn: Option<String>,
    pub replica_max_lag_ms: u64,
    pub keep_old_table: bool,
}

impl Default for OscCliConfig {
    fn default() -> Self {
        OscCliConfig {
            host: "127.0.0.1:3306".to_string(),
            username: String::new(),
            password: String::new(),
            database: String::new(),
            table: String::new(),
            alter: String::new(),
            concurrency: 4,
            checksum_concurrency: 4,
            target_chunk_time_ms: 2_000,
            attempt_inplace_ddl: false,
            checksum: true,
            replica_dsn: None,
            replica_max_lag_ms: 120_000,
            keep_old_table: false,
        }
    }
}

impl OscCliConfig {
    pub fn target_chunk_time(&self) -> Duration {
        Duration::from_millis(self.target_chunk_time_ms)
    }

    pub fn replica_max_lag(&self) -> Duration {
        Duration::from_millis(self.replica_max_lag_ms)
    }
}

/// Reads a TOML config file, if given; callers then layer CLI flags on top.
pub fn read_config<P: AsRef<Path>>(path: P) -> OscResult<OscCliConfig> {
    let s = fs::read_to_string(path).map_err(OscError::Io)?;
    toml::from_str(&s).map_err(|e| OscError::config(format!("invalid config file: {e}")))
}
