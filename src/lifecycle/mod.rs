//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Open datastore → Wait until ready → Build pipeline → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel readiness wait / stop accepting → Close datastore → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then dependencies, then listener
//! - No connection draining; the orchestrator restarts the container

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{shutdown_requested, Shutdown};
pub use startup::{boot, Collaborators, DefaultCollaborators, StartupError};
