//! Cross-cutting request stages applied by the pipeline.

pub mod access_log;
pub mod client_addr;

pub use access_log::{log_response, request_span};
pub use client_addr::{resolve_client_addr, ClientAddr};
