//! Command implementations and shared plumbing.
//!
//! # Environment Variables
//!
//! - `PANTRY_API_URL` - Back-office API base URL
//! - `PANTRY_API_TOKEN` - Bearer token
//! - `PANTRY_HTTP_TIMEOUT_SECS` - Per-request timeout (default 30)
//! - `PANTRY_BULK_CONCURRENCY` - Requests in flight per bulk command (default 8)
//! - `PANTRY_IDEMPOTENT_ASSIGN` - Generate idempotency keys for supplier assignment
//! - `PANTRY_LOG_JSON` - Log as JSON lines
//! - `RUST_LOG` - Log filter

pub mod replenishment;
pub mod submissions;

use std::fmt::Display;
use std::str::FromStr;

use pantry_admin::api::{ApiError, PantryClient};
use pantry_admin::config::{AdminConfig, ConfigError};
use pantry_admin::error::AppError;
use pantry_admin::services::{BatchReport, ServiceSettings};
use serde::Serialize;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    /// Every member of a bulk command failed or was abandoned.
    #[error("{0}")]
    NothingSucceeded(String),
}

/// Everything a command needs to talk to the API.
pub struct Context {
    pub client: PantryClient,
    pub settings: ServiceSettings,
}

impl Context {
    /// Build from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is missing or the client cannot be built.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = AdminConfig::from_env()?;
        let client = PantryClient::new(config.api())?;
        tracing::debug!(base_url = %client.base_url(), "Using back-office API");
        Ok(Self {
            client,
            settings: ServiceSettings::from(&config),
        })
    }
}

/// Print `value` as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn emit<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolves when the user presses Ctrl+C.
pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; never cancel
        std::future::pending::<()>().await;
    }
}

/// Print a bulk report and decide the exit status.
///
/// # Errors
///
/// Returns [`CommandError::NothingSucceeded`] if no member succeeded.
pub fn finish<K, T>(report: &BatchReport<K, T>, past_tense: &str) -> Result<(), CommandError>
where
    K: Serialize,
    T: Serialize,
{
    emit(report)?;
    settle(report, past_tense)
}

/// Log the summary of a bulk report that was already printed.
///
/// # Errors
///
/// Returns [`CommandError::NothingSucceeded`] if no member succeeded.
pub fn settle<K, T>(report: &BatchReport<K, T>, past_tense: &str) -> Result<(), CommandError> {
    let summary = report.summary(past_tense);
    if report.is_complete_success() {
        tracing::info!("{summary}");
        return Ok(());
    }
    if report.succeeded.is_empty() {
        return Err(CommandError::NothingSucceeded(summary));
    }
    tracing::warn!("{summary}");
    Ok(())
}

/// Parse `KEY=VALUE`.
pub fn parse_pair<K, V>(raw: &str) -> Result<(K, V), String>
where
    K: FromStr,
    K::Err: Display,
    V: FromStr,
    V::Err: Display,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim().parse().map_err(|e| format!("{key}: {e}"))?;
    let value = value.trim().parse().map_err(|e| format!("{value}: {e}"))?;
    Ok((key, value))
}
