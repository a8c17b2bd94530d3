//! Server configuration from flags and environment.

use clap::Parser;
use policy_core::db::{open_db, open_db_in_memory, DbResult};
use policy_core::{default_log_level, LogTarget};
use rusqlite::Connection;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "policy_server",
    version,
    about = "HTTP service for insurance policies and their notes"
)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "POLICY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database file. An in-memory store is used when omitted.
    #[arg(long, env = "POLICY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Insert the sample policies and notes at startup.
    #[arg(long, env = "POLICY_SEED")]
    pub seed: bool,

    /// trace|debug|info|warn|error. Defaults to debug in debug builds, info otherwise.
    #[arg(long, env = "POLICY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotated log files. Logs go to stderr when omitted.
    #[arg(long, env = "POLICY_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl ServerConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn log_target(&self) -> Result<LogTarget, String> {
        LogTarget::from_dir(self.log_dir.as_deref())
    }

    /// Opens the configured store with migrations applied.
    pub fn open_store(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}
