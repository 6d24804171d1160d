use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::PharmaSignalError;
use crate::types::NodeMode;

const DEFAULT_STORE_PATH: &str = "data/store.json";
const DEFAULT_TIMELINE_WINDOW_DAYS: i64 = 7;
/// Upper bound on the emotion timeline window (about a century).
pub const MAX_TIMELINE_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// File-backed mention store written by the ingestion service.
    pub store_path: PathBuf,
    pub node_mode: NodeMode,
    pub timeline_window_days: i64,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    /// Unknown or malformed values fail with a configuration error.
    pub fn from_env() -> Result<Self, PharmaSignalError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PharmaSignalError> {
        let store_path = lookup("STORE_PATH")
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string())
            .into();

        let node_mode = match lookup("NODE_MODE") {
            Some(raw) => raw.parse()?,
            None => NodeMode::default(),
        };

        let timeline_window_days = match lookup("TIMELINE_WINDOW_DAYS") {
            Some(raw) => {
                let days = raw.parse().map_err(|_| {
                    PharmaSignalError::Config(format!(
                        "TIMELINE_WINDOW_DAYS must be a number, got '{raw}'"
                    ))
                })?;
                validate_window_days(days)?
            }
            None => DEFAULT_TIMELINE_WINDOW_DAYS,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(PharmaSignalError::Config(format!(
                    "LOG_FORMAT must be 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            store_path,
            node_mode,
            timeline_window_days,
            log_format,
        })
    }

    pub fn log_redacted(&self) {
        info!(
            store_path = %self.store_path.display(),
            node_mode = %self.node_mode,
            timeline_window_days = self.timeline_window_days,
            "Loaded configuration"
        );
    }
}

/// Reject timeline windows outside `0..=MAX_TIMELINE_WINDOW_DAYS`.
pub fn validate_window_days(days: i64) -> Result<i64, PharmaSignalError> {
    if (0..=MAX_TIMELINE_WINDOW_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(PharmaSignalError::Config(format!(
            "timeline window must be between 0 and {MAX_TIMELINE_WINDOW_DAYS} days, got {days}"
        )))
    }
}
