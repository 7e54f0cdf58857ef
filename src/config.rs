//! Runtime configuration for the `brank` binary and [`crate::db::Database::open_default`].
//!
//! The database path is taken from, in order:
//! - the `--db <path>` flag
//! - the `BACKLOG_RANK_DB` environment variable
//! - `backlog-rank.db` in the platform data directory
//!
//! The log filter comes from `RUST_LOG` and defaults to [`DEFAULT_LOG_FILTER`].

use std::path::PathBuf;

use anyhow::Result;

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "BACKLOG_RANK_DB";

pub const DEFAULT_LOG_FILTER: &str = "backlog_rank=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env(db_flag: Option<PathBuf>) -> Result<Self> {
        Self::resolve(
            db_flag,
            std::env::var(DB_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    /// Resolve configuration from explicit sources. Empty values count as unset.
    pub fn resolve(
        db_flag: Option<PathBuf>,
        db_env: Option<String>,
        log_env: Option<String>,
    ) -> Result<Self> {
        let db_path = match db_flag.or_else(|| non_empty(db_env).map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path()?,
        };
        let log_filter = non_empty(log_env).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            db_path,
            log_filter,
        })
    }
}

/// `backlog-rank.db` under the platform data directory.
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "backlog-rank")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("backlog-rank.db"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
