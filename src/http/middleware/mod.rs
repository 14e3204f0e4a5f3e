//! Request middleware.
//!
//! # Order (outermost first)
//! ```text
//! trace_context.rs      activate trace context (when tracing is enabled)
//!   → correlation_filter.rs   resolve ID, scope context store
//!     → span_interceptor.rs   mirror ID into trace extra field
//!       → handler
//! ```

pub mod correlation_filter;
pub mod span_interceptor;
pub mod trace_context;

pub use correlation_filter::{CorrelationLayer, CorrelationService};
pub use span_interceptor::{span_interceptor, SpanInterceptorState};
pub use trace_context::{TraceContextLayer, TraceContextService};
