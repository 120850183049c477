//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable)
//!     → handed to the catalog, health checker and failover manager
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the catalog is a startup snapshot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AdminConfig;
pub use schema::CircuitBreakerConfig;
pub use schema::FailoverConfig;
pub use schema::HealthCheckConfig;
pub use schema::LatencyConfig;
pub use schema::LogFormat;
pub use schema::ModelConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProviderConfig;
pub use schema::SelectionConfig;
