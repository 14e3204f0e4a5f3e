//! Correlation ID type, generation and adoption rules.
//!
//! # Responsibilities
//! - Represent the opaque correlation token
//! - Generate new tokens when a request arrives without one
//! - Decide whether an inbound header value may be adopted
//!
//! # Design Decisions
//! - Default generator is UUID v4
//! - Inbound values are trimmed; empty values are replaced
//! - A length cap is opt-in, any non-empty value is adopted by default
//! - Generation sits behind a trait so tests can plug deterministic IDs

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correlation::header;

/// Opaque token identifying one logical request across logs and traces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh random ID (UUID v4).
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of new correlation IDs.
pub trait MakeCorrelationId: Send + Sync + 'static {
    fn make_correlation_id(&self) -> CorrelationId;
}

/// Generates UUID v4 correlation IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCorrelationId;

impl MakeCorrelationId for UuidCorrelationId {
    fn make_correlation_id(&self) -> CorrelationId {
        CorrelationId::new_random()
    }
}

impl<F> MakeCorrelationId for F
where
    F: Fn() -> CorrelationId + Send + Sync + 'static,
{
    fn make_correlation_id(&self) -> CorrelationId {
        self()
    }
}

/// Rules for adopting an inbound ID or generating a new one.
#[derive(Clone)]
pub struct CorrelationIdPolicy {
    max_length: Option<usize>,
    generator: Arc<dyn MakeCorrelationId>,
}

impl CorrelationIdPolicy {
    /// Adopt any non-empty inbound value; generate UUID v4 otherwise.
    pub fn new() -> Self {
        Self::with_generator(UuidCorrelationId)
    }

    pub fn with_generator(generator: impl MakeCorrelationId) -> Self {
        Self {
            max_length: None,
            generator: Arc::new(generator),
        }
    }

    /// Replace inbound values longer than `max_length` bytes. `None` adopts any length.
    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    /// Adopt the inbound correlation header if it carries a usable value.
    pub fn adopt(&self, headers: &HeaderMap) -> Option<CorrelationId> {
        let raw = header::inbound_value(headers)?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(max_length) = self.max_length {
            if raw.len() > max_length {
                tracing::warn!(
                    length = raw.len(),
                    max_length,
                    "Inbound correlation id too long, generating a new one"
                );
                return None;
            }
        }
        Some(CorrelationId(raw.to_string()))
    }

    /// Generate a new ID.
    pub fn generate(&self) -> CorrelationId {
        self.generator.make_correlation_id()
    }

    /// Inbound value if usable, otherwise a freshly generated one.
    pub fn resolve(&self, headers: &HeaderMap) -> CorrelationId {
        self.adopt(headers).unwrap_or_else(|| self.generate())
    }
}

impl Default for CorrelationIdPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CorrelationIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationIdPolicy")
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}
