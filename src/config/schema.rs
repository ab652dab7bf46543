//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! Required values come from the environment (see `loader.rs`); everything
//! else has a built-in default.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Root configuration for the API server.
///
/// Populated once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessConfig {
    /// Backing store selection and connection string.
    pub datastore: DatastoreConfig,

    /// Identity and signing material for the auth provider.
    pub auth: AuthConfig,

    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Per-connection limits.
    pub server: ServerConfig,

    /// Datastore readiness polling.
    pub readiness: ReadinessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Datastore configuration.
#[derive(Debug, Clone, Serialize)]
pub struct DatastoreConfig {
    /// Datastore kind (e.g., "postgres").
    pub name: String,

    /// Connection URL. Serialized with the password redacted.
    #[serde(serialize_with = "serialize_redacted_url")]
    pub url: String,
}

impl DatastoreConfig {
    /// The connection URL with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

/// Auth provider configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AuthConfig {
    /// Service domain, used as the token issuer name.
    pub domain: String,

    /// Token signing key.
    pub signing_key: SigningKey,
}

/// Opaque signing key bytes.
///
/// Never printed: `Debug` and `Serialize` both emit a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

impl Serialize for SigningKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<redacted>")
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Per-connection limits applied by the server launcher.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Time allowed for a client to send the request head, in seconds.
    pub read_timeout_secs: u64,

    /// Time allowed to produce the response, in seconds.
    pub write_timeout_secs: u64,

    /// Upper bound on request header bytes.
    pub max_header_bytes: usize,
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            max_header_bytes: 1 << 20,
        }
    }
}

/// Readiness gate configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessConfig {
    /// Fixed delay between probe attempts, in seconds.
    pub interval_secs: u64,

    /// Give up after this many failed probes. `None` means no limit.
    pub max_attempts: Option<u32>,

    /// Give up once this many seconds have been spent waiting. `None` means no limit.
    pub max_elapsed_secs: Option<u64>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: None,
            max_elapsed_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directives when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "parrot_server=info,tower_http=info".to_string(),
        }
    }
}

fn serialize_redacted_url<S: Serializer>(url: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&redact_url(url))
}

/// Replace the password component of a URL. Unparseable input is hidden entirely.
pub(crate) fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("xxxxx"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
