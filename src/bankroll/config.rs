//! Configuration for the bankroll manager.
//!
//! Configurations can be built in code or loaded from JSON files; missing
//! fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Risk settings fixed for the lifetime of a bankroll manager.
///
/// # Example
/// ```
/// use poker_agent_core::bankroll::BankrollConfig;
///
/// let config = BankrollConfig::default();
/// assert_eq!(config.kelly_fraction, 0.25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankrollConfig {
    /// Multiplier applied to the full Kelly stake.
    ///
    /// Values below 1 trade growth rate for lower variance. Must lie in (0, 1].
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,

    /// Largest share of the bankroll a single wager may risk. Must lie in (0, 1].
    #[serde(default = "default_max_risk_percent")]
    pub max_risk_percent: f64,
}

fn default_kelly_fraction() -> f64 {
    0.25
}

fn default_max_risk_percent() -> f64 {
    0.05
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            kelly_fraction: default_kelly_fraction(),
            max_risk_percent: default_max_risk_percent(),
        }
    }
}

impl BankrollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the fractional-Kelly multiplier.
    pub fn with_kelly_fraction(mut self, fraction: f64) -> Self {
        self.kelly_fraction = fraction;
        self
    }

    /// Builder method: set the maximum risk per wager.
    pub fn with_max_risk(mut self, max_risk_percent: f64) -> Self {
        self.max_risk_percent = max_risk_percent;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_fraction("kelly_fraction", self.kelly_fraction)?;
        Self::check_fraction("max_risk_percent", self.max_risk_percent)
    }

    fn check_fraction(field: &str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("{} is out of range (0, 1]", value),
            })
        }
    }
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    InvalidValue { field: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {}", e),
            Self::ParseError(e) => write!(f, "Parse error: {}", e),
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
