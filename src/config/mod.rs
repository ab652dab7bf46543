//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional)
//!     → loader.rs (seed process environment)
//! process environment
//!     → loader.rs (read named variables)
//!     → validation.rs (presence and range checks)
//!     → ProcessConfig (validated, immutable)
//!     → handed by value to each subsystem during boot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Required values have no defaults; everything else does
//! - Validation is all-or-nothing and happens before any resource is opened

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_dotenv, ConfigError, EnvSource, ProcessEnv};
pub use schema::{
    AuthConfig, DatastoreConfig, ListenerConfig, ObservabilityConfig, ProcessConfig,
    ReadinessConfig, ServerConfig, SigningKey,
};
pub use validation::ValidationError;
