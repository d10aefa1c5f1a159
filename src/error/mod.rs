//! Error handling for the GlobeSort benchmark client

use std::io::ErrorKind;
use thiserror::Error;

/// Custom error types for the benchmark client
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Peer unreachable, connection refused or reset
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Transport deadline exceeded
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The peer answered with an error status
    #[error("Remote error (status {code}): {message}")]
    Remote { code: u32, message: String },

    /// Malformed or oversized frames
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O errors not attributable to connectivity
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new connectivity error
    pub fn connectivity<S: Into<String>>(message: S) -> Self {
        Self::Connectivity(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new remote processing error
    pub fn remote<S: Into<String>>(code: u32, message: S) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Connectivity(_) => "CONNECTIVITY",
            Self::Timeout(_) => "TIMEOUT",
            Self::Remote { .. } => "REMOTE",
            Self::Protocol(_) => "PROTOCOL",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the failure originated on the network path rather than locally
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::Connectivity(_) | Self::Timeout(_) | Self::Remote { .. } | Self::Protocol(_)
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the server address, port and number of values.", msg)
            }
            Self::Connectivity(msg) => {
                format!("Could not reach the sort server: {}\n\nSuggestion: Verify the server is running and the address and port are correct.", msg)
            }
            Self::Timeout(msg) => {
                format!("Request timed out: {}\n\nSuggestion: Increase --deadline-secs or reduce the number of values.", msg)
            }
            Self::Remote { code, message } => {
                format!("The server rejected the request (status {}): {}\n\nSuggestion: Check the server logs.", code, message)
            }
            Self::Protocol(msg) => {
                format!("Unexpected data from the server: {}\n\nSuggestion: Make sure the peer speaks the GlobeSort protocol, or raise --max-message-size.", msg)
            }
            Self::Io(msg) => {
                format!("I/O operation failed: {}", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) => 1,  // Invalid configuration/usage
            Self::Connectivity(_) => 2,  // Network issues
            Self::Timeout(_) => 3,
            Self::Remote { .. } => 4,
            Self::Protocol(_) | Self::Io(_) => 5,
            Self::Internal(_) => 99,  // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Connectivity(_) | Self::Remote { .. } => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Protocol(_) | Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::AddrNotAvailable
            | ErrorKind::UnexpectedEof => Self::connectivity(error.to_string()),
            ErrorKind::TimedOut => Self::timeout(error.to_string()),
            _ => Self::io(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization error: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::timeout("deadline exceeded")
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
