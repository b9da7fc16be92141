// ABOUTME: Tracing subscriber setup for the server binary
// ABOUTME: Chooses JSON or human-readable output and honors RUST_LOG filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

use crate::constants::env_config;
use crate::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Human-readable lines
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(AppError::config(format!(
                "{} must be 'json' or 'pretty', got '{other}'",
                env_config::LOG_FORMAT
            ))),
        }
    }
}

impl LogFormat {
    /// Format from `LOG_FORMAT`, defaulting to pretty
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown values
    pub fn from_env() -> AppResult<Self> {
        env::var(env_config::LOG_FORMAT)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| Ok(Self::default()), |v| v.parse())
    }
}

/// Install the global subscriber
///
/// Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// # Errors
///
/// Returns an internal error if a global subscriber is already installed
pub fn init_logging(format: LogFormat) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| AppError::internal(format!("Failed to initialize logging: {e}")))
}
