//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ratios within bounds)
//! - Check names that end up on the wire are valid header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Warnings are returned, not logged, so they survive until logging is up
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("header.max_id_length must be greater than zero")]
    MaxIdLength,

    #[error("tracing.sample_ratio must be within 0.0..=1.0, got {0}")]
    SampleRatio(f64),

    #[error("tracing.extra_fields entry `{0}` is not a valid header name")]
    ExtraField(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),
}

/// A configuration that is accepted but probably not what was meant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("Span interceptor enabled while tracing is disabled; it will never run")]
    InterceptorWithoutTracing,
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.header.max_id_length == Some(0) {
        errors.push(ValidationError::MaxIdLength);
    }

    if !(0.0..=1.0).contains(&config.tracing.sample_ratio) {
        errors.push(ValidationError::SampleRatio(config.tracing.sample_ratio));
    }

    for field in &config.tracing.extra_fields {
        if HeaderName::from_bytes(field.as_bytes()).is_err() {
            errors.push(ValidationError::ExtraField(field.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collect the warnings for `config`. The caller logs them once a subscriber
/// is installed.
pub fn config_warnings(config: &AppConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if config.header.span_interceptor.enabled && !config.tracing.enabled {
        warnings.push(ValidationWarning::InterceptorWithoutTracing);
    }
    warnings
}
