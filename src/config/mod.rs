//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → read once at startup to decide which layers are installed
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::AppConfig;
pub use schema::FilterConfig;
pub use schema::HeaderConfig;
pub use schema::ListenerConfig;
pub use schema::SpanInterceptorConfig;
pub use schema::TracingConfig;
pub use validation::{config_warnings, validate_config, ValidationError, ValidationWarning};
