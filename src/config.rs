//! Environment configuration

use crate::conversation::{DEFAULT_MAX_TURNS, MIN_MAX_TURNS};
use crate::llm::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::runtime::DEFAULT_SESSION_IDLE_TIMEOUT;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    Invalid { key: &'static str, value: String },
}

/// Settings read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NexusConfig {
    pub port: u16,
    /// Gemini API key; chat degrades to failure turns without one
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// Upper bound on a single model call
    pub request_timeout: Duration,
    /// Turns kept per session, seed included
    pub max_turns: usize,
    /// Sessions with no stream and no requests for this long are dropped
    pub session_idle_timeout: Duration,
    pub persona_file: Option<PathBuf>,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_turns: DEFAULT_MAX_TURNS,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            persona_file: None,
        }
    }
}

impl NexusConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = parse_or(get("NEXUS_PORT"), "NEXUS_PORT", defaults.port)?;
        let timeout_secs = positive_secs(
            get("NEXUS_REQUEST_TIMEOUT_SECS"),
            "NEXUS_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let idle_secs = positive_secs(
            get("NEXUS_SESSION_IDLE_SECS"),
            "NEXUS_SESSION_IDLE_SECS",
            defaults.session_idle_timeout.as_secs(),
        )?;
        let max_turns: usize = parse_or(get("NEXUS_MAX_TURNS"), "NEXUS_MAX_TURNS", defaults.max_turns)?;

        Ok(Self {
            port,
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            model: get("NEXUS_MODEL").unwrap_or(defaults.model),
            api_base: get("NEXUS_API_BASE").unwrap_or(defaults.api_base),
            request_timeout: Duration::from_secs(timeout_secs),
            max_turns: max_turns.max(MIN_MAX_TURNS),
            session_idle_timeout: Duration::from_secs(idle_secs),
            persona_file: get("NEXUS_PERSONA_FILE").map(PathBuf::from),
        })
    }
}

fn positive_secs(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parse_or(raw, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        secs => Ok(secs),
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
