//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::listener)
//!     → server.rs (hyper connection, timeouts, header cap)
//!     → pipeline.rs (ordered middleware stages)
//!         → request.rs (request ID)
//!         → middleware/ (client address, access log)
//!     → /api router tree
//!     → Send to client
//! ```

pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod server;

pub use pipeline::{build_pipeline, Pipeline, API_PREFIX};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
