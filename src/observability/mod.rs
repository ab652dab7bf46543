//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (filter, format, stdout)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request-scoped event
//! - Secrets never reach a log line: signing keys are opaque, URLs redacted

pub mod logging;
