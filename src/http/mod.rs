//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, access log, timeout)
//!     → layers.rs (install the layers the config turns on)
//!     → middleware/ (trace context → correlation filter → span interceptor)
//!     → handlers.rs (read both stores)
//!     → client.rs (forward the ID on outbound calls)
//! ```

pub mod client;
pub mod handlers;
pub mod layers;
pub mod middleware;
pub mod server;

pub use client::{outbound_headers, CorrelationPropagation};
pub use handlers::CorrelationSnapshot;
pub use server::HttpServer;
