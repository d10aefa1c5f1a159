//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists. Variables already set in the
    /// process environment are not overwritten.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Variables merged into the configuration
    pub const SUPPORTED_ENV_VARS: [&'static str; 5] = [
        "GLOBESORT_MAX_MESSAGE_SIZE",
        "GLOBESORT_SHUTDOWN_TIMEOUT_MS",
        "GLOBESORT_DEADLINE_SECS",
        "GLOBESORT_SEED",
        "ENABLE_COLOR",
    ];

    /// Validate one variable before it is merged
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "GLOBESORT_MAX_MESSAGE_SIZE" => {
                let size: usize = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if size < crate::defaults::MIN_MAX_MESSAGE_SIZE {
                    return Err(AppError::config(format!(
                        "{} must be at least {} bytes, got: {}",
                        key, crate::defaults::MIN_MAX_MESSAGE_SIZE, size
                    )));
                }
            }
            "GLOBESORT_SHUTDOWN_TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if u128::from(timeout) > crate::defaults::MAX_SHUTDOWN_TIMEOUT.as_millis() {
                    return Err(AppError::config(format!("{} cannot exceed 60000, got: {}", key, timeout)));
                }
            }
            "GLOBESORT_DEADLINE_SECS" => {
                let deadline: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if deadline == 0 || deadline > crate::defaults::MAX_DEADLINE_SECS {
                    return Err(AppError::config(format!("{} must be between 1 and 3600, got: {}", key, deadline)));
                }
            }
            "GLOBESORT_SEED" => {
                value.parse::<u64>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Warnings for every supported variable currently set to a bad value
    pub fn validate_current_env() -> Vec<String> {
        Self::SUPPORTED_ENV_VARS
            .into_iter()
            .filter_map(|name| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
