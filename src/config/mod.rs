//! Runtime configuration.
//!
//! Parsed from CLI flags and environment in `main`, then passed down as
//! plain values. Nothing here is mutated after startup.

use std::time::Duration;

use crate::consts::{
    DATASET_PREVIEW_LIMIT, DEFAULT_API_BASE, DEFAULT_HOST, DEFAULT_MAX_POLLS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT, DEFAULT_WAIT_FOR_FINISH_SECS,
};

/// Knobs for the run execution protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Sent as `waitForFinish` on submit.
    pub wait_for_finish_secs: u64,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub dataset_preview_limit: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            wait_for_finish_secs: DEFAULT_WAIT_FOR_FINISH_SECS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_polls: DEFAULT_MAX_POLLS,
            dataset_preview_limit: DATASET_PREVIEW_LIMIT,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_base: String,
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            run: RunConfig::default(),
        }
    }
}

impl Config {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
