//! Server configuration from environment variables.
//!
//! | Variable                   | Default        | Values            |
//! |----------------------------|----------------|-------------------|
//! | `PITCHSIDE_BIND`           | `0.0.0.0:3003` | `host:port`       |
//! | `PITCHSIDE_REQUIRE_JOIN`   | `true`         | `true` / `false`  |
//! | `PITCHSIDE_DUPLICATE_JOIN` | `reject`       | `reject`/`ignore` |
//!
//! Log filtering is separate and uses `RUST_LOG`.

use std::net::SocketAddr;

use pitchside::prelude::{DuplicateJoinPolicy, RouterConfig};

pub const BIND_VAR: &str = "PITCHSIDE_BIND";
pub const REQUIRE_JOIN_VAR: &str = "PITCHSIDE_REQUIRE_JOIN";
pub const DUPLICATE_JOIN_VAR: &str = "PITCHSIDE_DUPLICATE_JOIN";

/// Address the binary listens on by default.
pub const DEFAULT_BIND: &str = "0.0.0.0:3003";

/// A variable was set to something we can't use. Startup aborts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: `{value}` is not a socket address (expected host:port)")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var}: `{value}` is not a boolean (expected true or false)")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var}: {reason}")]
    InvalidPolicy { var: &'static str, reason: String },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub router: RouterConfig,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which returns a
    /// variable's value or `None` when it is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_text = value(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidBind {
            var: BIND_VAR,
            value: bind_text.clone(),
        })?;

        let mut router = RouterConfig::default();
        if let Some(text) = value(REQUIRE_JOIN_VAR) {
            router.require_join = parse_bool(&text).ok_or(ConfigError::InvalidBool {
                var: REQUIRE_JOIN_VAR,
                value: text.clone(),
            })?;
        }
        if let Some(text) = value(DUPLICATE_JOIN_VAR) {
            router.duplicate_join = text.parse::<DuplicateJoinPolicy>().map_err(
                |reason| ConfigError::InvalidPolicy {
                    var: DUPLICATE_JOIN_VAR,
                    reason,
                },
            )?;
        }

        Ok(Self { bind, router })
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
