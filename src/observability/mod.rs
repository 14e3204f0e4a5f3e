//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, correlation span fields)
//!     → trace.rs (trace context with extra fields)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Downstream services (traceparent + extra field headers)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation ID flows through logs and traces independently
//! - Trace activation can be switched off entirely

pub mod logging;
pub mod trace;
