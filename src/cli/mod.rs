//! Command-line interface

use clap::Parser;
use std::io::IsTerminal;

/// GlobeSort client - benchmark a remote sorting service
#[derive(Parser, Debug, Clone)]
#[command(name = "globesort-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Server IP address or host name
    pub server_ip: String,

    /// Server port
    pub server_port: u16,

    /// Number of values to sort
    #[arg(value_parser = parse_num_values)]
    pub num_values: usize,

    /// Largest response accepted from the server, in bytes [default: 104857600]
    #[arg(long, value_name = "BYTES")]
    pub max_message_size: Option<usize>,

    /// How long to wait for the connection to close, in milliseconds [default: 2000]
    #[arg(long, value_name = "MS")]
    pub shutdown_timeout_ms: Option<u64>,

    /// Give up on an RPC after this many seconds (no deadline by default)
    #[arg(long, value_name = "SECS", value_parser = parse_deadline)]
    pub deadline_secs: Option<u64>,

    /// Seed the value generator for a reproducible batch
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print a timing breakdown and check the sorted response
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && !self.json && supports_color()
    }
}

fn parse_num_values(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("Invalid number of values: {}", s))?;
    if count == 0 {
        return Err("Number of values must be greater than 0".to_string());
    }
    Ok(count)
}

fn parse_deadline(s: &str) -> Result<u64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid deadline: {}", s));
    }
    let secs: u64 = s.parse().map_err(|_| format!("Invalid deadline: {}", s))?;
    if secs == 0 {
        Err("Deadline must be greater than 0".to_string())
    } else if secs > crate::defaults::MAX_DEADLINE_SECS {
        Err(format!("Deadline cannot exceed {} seconds", crate::defaults::MAX_DEADLINE_SECS))
    } else {
        Ok(secs)
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::stdout().is_terminal()
}
