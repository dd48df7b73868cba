//! Configuration management for PyExec
//!
//! Loads configuration from environment variables.

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock deadline for one evaluation
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Python interpreter configuration
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Interpreter executable name or path
    pub python: PathBuf,
}

/// Execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Wall-clock deadline per evaluation
    pub timeout: Duration,
}

/// Script storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory for saved scripts
    pub scripts_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: String,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Interpreter settings
    pub interpreter: InterpreterConfig,
    /// Execution settings
    pub execution: ExecutionConfig,
    /// Script storage settings
    pub storage: StorageConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Default base directory for saved scripts (`~/PythonCodeExecutor`)
fn default_scripts_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("PythonCodeExecutor")
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            interpreter: InterpreterConfig {
                python: PathBuf::from(
                    std::env::var("PYEXEC_PYTHON").unwrap_or_else(|_| "python3".to_string()),
                ),
            },
            execution: ExecutionConfig {
                timeout: Duration::from_secs(
                    std::env::var("PYEXEC_TIMEOUT_SECS")
                        .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                        .parse()
                        .unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
            },
            storage: StorageConfig {
                scripts_dir: std::env::var("PYEXEC_SCRIPTS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_scripts_dir()),
            },
            log: LogConfig {
                level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info,pyexec=debug".to_string()),
            },
        })
    }

    /// Create a minimal config for testing or CLI commands that don't need full config
    pub fn minimal() -> Self {
        Config {
            interpreter: InterpreterConfig {
                python: PathBuf::from("python3"),
            },
            execution: ExecutionConfig {
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            storage: StorageConfig {
                scripts_dir: default_scripts_dir(),
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Validate that all required configuration is present
    pub fn validate(&self) -> Result<()> {
        if self.execution.timeout.is_zero() {
            return Err(Error::Config(
                "PYEXEC_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        which::which(&self.interpreter.python)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = Config::minimal();
        assert_eq!(config.interpreter.python, PathBuf::from("python3"));
        assert_eq!(
            config.execution.timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert!(config
            .storage
            .scripts_dir
            .ends_with("PythonCodeExecutor"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::minimal();
        config.execution.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
