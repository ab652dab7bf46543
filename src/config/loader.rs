//! Configuration loading from the process environment.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{
    AuthConfig, DatastoreConfig, ListenerConfig, ObservabilityConfig, ProcessConfig,
    ReadinessConfig, ServerConfig, SigningKey,
};
use crate::config::validation::{optional_positive, require, ValidationError};

pub const DB_NAME_VAR: &str = "PARROT_DB_NAME";
pub const DB_URL_VAR: &str = "PARROT_DB_URL";
pub const SIGNING_KEY_VAR: &str = "PARROT_API_SIGNING_KEY";
pub const DOMAIN_VAR: &str = "PARROT_DOMAIN";
pub const READY_MAX_ATTEMPTS_VAR: &str = "PARROT_DB_READY_MAX_ATTEMPTS";
pub const READY_TIMEOUT_SECS_VAR: &str = "PARROT_DB_READY_TIMEOUT_SECS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Validation failures, empty for other kinds.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            ConfigError::Validation(errors) => errors,
            ConfigError::Dotenv(_) => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Source of environment variables.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Seed the process environment from `./.env` if it exists.
///
/// Variables already set in the environment take precedence.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => {
            tracing::debug!("No .env file found, using process environment only");
            Ok(())
        }
        Err(e) => Err(ConfigError::Dotenv(e)),
    }
}

/// Load and validate configuration from the environment.
///
/// All required variables are checked before returning, so a single error
/// lists every missing value.
pub fn load_config(env: &impl EnvSource) -> Result<ProcessConfig, ConfigError> {
    let mut errors = Vec::new();

    let db_name = require(DB_NAME_VAR, env.get(DB_NAME_VAR), &mut errors);
    let db_url = require(DB_URL_VAR, env.get(DB_URL_VAR), &mut errors);
    let signing_key = require(SIGNING_KEY_VAR, env.get(SIGNING_KEY_VAR), &mut errors);
    let domain = require(DOMAIN_VAR, env.get(DOMAIN_VAR), &mut errors);

    let max_attempts =
        optional_positive::<u32>(READY_MAX_ATTEMPTS_VAR, env.get(READY_MAX_ATTEMPTS_VAR), &mut errors);
    let max_elapsed_secs =
        optional_positive::<u64>(READY_TIMEOUT_SECS_VAR, env.get(READY_TIMEOUT_SECS_VAR), &mut errors);

    let (Some(db_name), Some(db_url), Some(signing_key), Some(domain)) =
        (db_name, db_url, signing_key, domain)
    else {
        return Err(ConfigError::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(ProcessConfig {
        datastore: DatastoreConfig {
            name: db_name,
            url: db_url,
        },
        auth: AuthConfig {
            domain,
            signing_key: SigningKey::new(signing_key),
        },
        listener: ListenerConfig::default(),
        server: ServerConfig::default(),
        readiness: ReadinessConfig {
            max_attempts,
            max_elapsed_secs,
            ..ReadinessConfig::default()
        },
        observability: ObservabilityConfig::default(),
    })
}
