//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Layers defaults, the .env file, process environment and CLI arguments
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_without_env_file(&mut config)?;

        Ok(config)
    }

    /// Everything except the .env lookup; used directly by tests
    fn parse_without_env_file(&self, config: &mut Config) -> Result<()> {
        config.merge_from_env()?;
        self.apply_cli_overrides(config);
        config.validate()
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        config.server_host = cli.server_ip.clone();
        config.server_port = cli.server_port;
        config.num_values = cli.num_values;

        if let Some(size) = cli.max_message_size {
            config.max_message_size = size;
        }
        if let Some(timeout) = cli.shutdown_timeout_ms {
            config.shutdown_timeout_ms = timeout;
        }
        if cli.deadline_secs.is_some() {
            config.deadline_secs = cli.deadline_secs;
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }

        config.json_output = cli.json;
        // ENABLE_COLOR=false wins over a color-capable terminal
        config.enable_color = config.enable_color && cli.use_colors();
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Server: {}:{}", config.server_host, config.server_port));
    summary.push(format!("Values: {}", config.num_values));
    summary.push(format!("Max message size: {} bytes", config.max_message_size));
    summary.push(format!("Shutdown timeout: {}ms", config.shutdown_timeout_ms));
    match config.deadline_secs {
        Some(secs) => summary.push(format!("Deadline: {}s", secs)),
        None => summary.push("Deadline: none".to_string()),
    }
    if let Some(seed) = config.seed {
        summary.push(format!("Seed: {}", seed));
    }
    summary.push(format!("JSON output: {}", config.json_output));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use clap::Parser;
    use std::env;
    use std::sync::Mutex;

    // Tests below touch process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in EnvManager::SUPPORTED_ENV_VARS {
            env::remove_var(var);
        }
    }

    fn parse(args: &[&str]) -> Result<Config> {
        let cli = Cli::parse_from(args);
        let mut config = Config::default();
        ConfigParser::new(cli).parse_without_env_file(&mut config)?;
        Ok(config)
    }

    #[test]
    fn test_positionals_applied() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = parse(&["globesort-client", "192.168.1.20", "50051", "5000"]).unwrap();
        assert_eq!(config.server_host, "192.168.1.20");
        assert_eq!(config.server_port, 50051);
        assert_eq!(config.num_values, 5000);
        assert_eq!(config.max_message_size, crate::defaults::DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.deadline_secs, None);
    }

    #[test]
    fn test_cli_overrides_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("GLOBESORT_SHUTDOWN_TIMEOUT_MS", "750");
        env::set_var("GLOBESORT_SEED", "11");

        let config = parse(&[
            "globesort-client", "localhost", "9000", "10",
            "--shutdown-timeout-ms", "100",
        ])
        .unwrap();
        clear_env();

        assert_eq!(config.shutdown_timeout_ms, 100);
        assert_eq!(config.seed, Some(11));
    }

    #[test]
    fn test_env_disables_color() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("ENABLE_COLOR", "false");

        let config = parse(&["globesort-client", "localhost", "9000", "10"]).unwrap();
        clear_env();

        assert!(!config.enable_color);
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("GLOBESORT_MAX_MESSAGE_SIZE", "lots");

        let result = parse(&["globesort-client", "localhost", "9000", "10"]);
        clear_env();

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_small_message_size_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let result = parse(&["globesort-client", "localhost", "9000", "10", "--max-message-size", "16"]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_summary_mentions_server() {
        let config = Config {
            server_host: "example.net".to_string(),
            server_port: 7000,
            num_values: 3,
            ..Config::default()
        };
        let summary = display_config_summary(&config);
        assert!(summary.contains("Server: example.net:7000"));
        assert!(summary.contains("Deadline: none"));
    }
}
