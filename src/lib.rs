//! Request correlation for axum services.
//!
//! Every request gets a correlation ID, taken from the `Korrelasjonsid`
//! header or generated. The ID is readable from handler code through the
//! context store and, when a trace is active, from the trace's extra fields.

pub mod config;
pub mod correlation;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use correlation::{CorrelationId, KORRELASJONS_ID};
pub use error::{Error, Result};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
