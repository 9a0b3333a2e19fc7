//! Error types shared by the resolver, the recorder and the toolchain config.

use std::fmt;
use thiserror::Error;

/// The shape a variable was expected to have when it failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Address,
    Integer,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Address => "address",
            ValueKind::Integer => "integer",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable \"{0}\" not set")]
    MissingVariable(String),

    #[error("Environment variable \"{name}\" is not a valid {expected}")]
    InvalidFormat { name: String, expected: ValueKind },

    #[error("Environment variable APP_ENV must be set")]
    MissingEnvironmentTag,

    #[error("Invalid network: {0}. Must be: localhost or base")]
    InvalidNetwork(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &str, expected: ValueKind) -> Self {
        ConfigError::InvalidFormat {
            name: name.to_string(),
            expected,
        }
    }
}
