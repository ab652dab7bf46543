//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limits)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - A bind failure is fatal; the caller decides how to exit

pub mod listener;

pub use listener::{ConnectionPermit, Listener, ListenerError};
