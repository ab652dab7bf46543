//! Parrot API server.
//!
//! Boots the translation API: loads configuration from the environment,
//! waits for the datastore to answer, assembles the request pipeline and
//! serves it.

// Boot sequence
pub mod config;
pub mod lifecycle;
pub mod resilience;

// Collaborators
pub mod api;
pub mod auth;
pub mod datastore;

// Serving
pub mod http;
pub mod net;
pub mod observability;

pub use config::ProcessConfig;
pub use http::HttpServer;
pub use lifecycle::{boot, Shutdown, StartupError};
