//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Boot sequence:
//!     → readiness.rs (probe required dependency, fixed-interval retry)
//!     → dependency live: continue boot
//!     → bound hit or shutdown: StartupError
//! ```
//!
//! # Design Decisions
//! - Wait in one place during startup instead of failing requests later
//! - Fixed interval; the dependency is usually starting, not overloaded
//! - Bounds and cancellation are opt-in

pub mod readiness;

pub use readiness::{ReadinessError, ReadinessGate, ReadinessOutcome};
