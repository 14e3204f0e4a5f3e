//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::correlation::KORRELASJONS_ID;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Correlation header handling (filter and span interceptor toggles).
    pub header: HeaderConfig,

    /// Trace context settings.
    pub tracing: TracingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Correlation header configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Inbound IDs longer than this are replaced by a generated one.
    /// Unset adopts any non-empty value.
    pub max_id_length: Option<usize>,

    /// Correlation filter (context store).
    pub filter: FilterConfig,

    /// Span interceptor (trace extra field).
    pub span_interceptor: SpanInterceptorConfig,
}

/// Correlation filter configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Install the correlation filter.
    pub enabled: bool,

    /// Copy the correlation ID onto the response.
    pub echo_response_header: bool,
}

/// Span interceptor configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpanInterceptorConfig {
    /// Install the span interceptor.
    pub enabled: bool,
}

/// Trace context configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Run every request inside a trace context.
    pub enabled: bool,

    /// Probability that a new root trace is sampled (0.0 - 1.0).
    pub sample_ratio: f64,

    /// Extra fields a trace may carry and propagate.
    pub extra_fields: Vec<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_ratio: 1.0,
            extra_fields: vec![KORRELASJONS_ID.to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_default_to_disabled() {
        let config = AppConfig::default();

        assert!(!config.header.filter.enabled);
        assert!(!config.header.span_interceptor.enabled);
        assert!(config.tracing.enabled);
        assert_eq!(config.tracing.extra_fields, vec!["Korrelasjonsid".to_string()]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [header.filter]
            enabled = true

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert!(config.header.filter.enabled);
        assert!(!config.header.filter.echo_response_header);
        assert!(!config.header.span_interceptor.enabled);
        assert_eq!(config.header.max_id_length, None);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_max_id_length_is_opt_in() {
        let config: AppConfig = toml::from_str(
            r#"
            [header]
            max_id_length = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.header.max_id_length, Some(64));
    }
}
