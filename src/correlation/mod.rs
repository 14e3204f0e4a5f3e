//! Correlation ID subsystem.
//!
//! # Data Flow
//! ```text
//! inbound headers
//!     → header.rs (canonical header name, case-insensitive lookup)
//!     → id.rs (adopt inbound value or generate a new one)
//!     → context.rs (request-scoped store read by handlers)
//! ```

pub mod context;
pub mod header;
pub mod id;

pub use header::{KORRELASJONS_ID, KORRELASJONS_ID_HEADER};
pub use id::{CorrelationId, CorrelationIdPolicy, MakeCorrelationId, UuidCorrelationId};
