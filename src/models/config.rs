//! Configuration data model and validation

use crate::client::ConnectionOptions;
use crate::protocol;
use crate::types::{AppError, Endpoint, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host name or IP address of the sort server
    #[serde(default)]
    pub server_host: String,

    #[serde(default)]
    pub server_port: u16,

    /// Number of random integers to sort
    #[serde(default)]
    pub num_values: usize,

    /// Largest frame accepted from the server, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Bounded wait for teardown, in milliseconds
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Optional per-RPC deadline; none means wait indefinitely
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Seed for reproducible batches
    #[serde(default)]
    pub seed: Option<u64>,

    /// Emit the report as a JSON object
    #[serde(default)]
    pub json_output: bool,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: String::new(),
            server_port: 0,
            num_values: 0,
            max_message_size: default_max_message_size(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            deadline_secs: None,
            seed: None,
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(self.server_host.clone(), self.server_port)
    }

    /// Transport settings for the connection manager
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            max_message_size: self.max_message_size,
            deadline: self.deadline(),
        }
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;

        if self.num_values == 0 {
            return Err(AppError::validation("Number of values must be greater than 0"));
        }

        if self.num_values > protocol::MAX_BATCH_LEN {
            return Err(AppError::validation(format!(
                "Number of values cannot exceed {} (single request frame limit)",
                protocol::MAX_BATCH_LEN
            )));
        }

        if self.max_message_size < crate::defaults::MIN_MAX_MESSAGE_SIZE {
            return Err(AppError::config(format!(
                "Maximum message size must be at least {} bytes",
                crate::defaults::MIN_MAX_MESSAGE_SIZE
            )));
        }

        if self.shutdown_timeout() > crate::defaults::MAX_SHUTDOWN_TIMEOUT {
            return Err(AppError::config(format!(
                "Shutdown timeout cannot exceed {}ms",
                crate::defaults::MAX_SHUTDOWN_TIMEOUT.as_millis()
            )));
        }

        if let Some(deadline) = self.deadline_secs {
            if deadline == 0 || deadline > crate::defaults::MAX_DEADLINE_SECS {
                return Err(AppError::config(format!(
                    "Deadline must be between 1 and {} seconds",
                    crate::defaults::MAX_DEADLINE_SECS
                )));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(size) = std::env::var("GLOBESORT_MAX_MESSAGE_SIZE") {
            self.max_message_size = size.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid GLOBESORT_MAX_MESSAGE_SIZE value '{}': {}", size, e)))?;
        }

        if let Ok(timeout) = std::env::var("GLOBESORT_SHUTDOWN_TIMEOUT_MS") {
            self.shutdown_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid GLOBESORT_SHUTDOWN_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(deadline) = std::env::var("GLOBESORT_DEADLINE_SECS") {
            let deadline = deadline.trim().to_string();
            if !deadline.is_empty() {
                self.deadline_secs = Some(deadline.parse()
                    .map_err(|e| AppError::config(format!("Invalid GLOBESORT_DEADLINE_SECS value '{}': {}", deadline, e)))?);
            }
        }

        if let Ok(seed) = std::env::var("GLOBESORT_SEED") {
            let seed = seed.trim().to_string();
            if !seed.is_empty() {
                self.seed = Some(seed.parse()
                    .map_err(|e| AppError::config(format!("Invalid GLOBESORT_SEED value '{}': {}", seed, e)))?);
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn default_max_message_size() -> usize {
    crate::defaults::DEFAULT_MAX_MESSAGE_SIZE
}

fn default_shutdown_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
