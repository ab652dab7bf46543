//! Auth provider handed to the API router tree.
//!
//! The provider only carries identity and signing material. How tokens are
//! issued and checked is decided by the API handlers that consume it.

use crate::config::{AuthConfig, SigningKey};

/// Service identity plus the key its tokens are signed with.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    name: String,
    signing_key: SigningKey,
}

impl AuthProvider {
    pub fn new(name: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            name: name.into(),
            signing_key,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.domain.clone(), config.signing_key.clone())
    }

    /// Issuer name (the service domain).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signing_key(&self) -> &[u8] {
        self.signing_key.as_bytes()
    }
}
