//! # Bot Configuration
//!
//! Runtime parameters for the bot. Every field has a default and can be
//! overridden from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `SB_MENU_TIMEOUT_SECS` | `300` |
//! | `SB_DM_CHOICE_TIMEOUT_SECS` | `300` |
//! | `SB_DEFAULT_RULESET` | `standard` |
//! | `SB_DEFAULT_FIRST_TO` | `2` |

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Complete bot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// How long a menu waits for its next click.
    pub menu_timeout: Duration,
    /// How long players have to answer a choice by message.
    pub choice_timeout: Duration,
    /// Ruleset used when neither the guild nor the request names one.
    pub default_ruleset: String,
    /// Wins needed when the request does not say.
    pub default_first_to: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            menu_timeout: Duration::from_secs(300),
            choice_timeout: Duration::from_secs(300),
            default_ruleset: "standard".to_string(),
            default_first_to: 2,
        }
    }
}

impl BotConfig {
    /// Defaults overridden by `SB_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_number::<u64>(&lookup, "SB_MENU_TIMEOUT_SECS") {
            config.menu_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_number::<u64>(&lookup, "SB_DM_CHOICE_TIMEOUT_SECS") {
            config.choice_timeout = Duration::from_secs(secs);
        }
        if let Some(ruleset) = lookup("SB_DEFAULT_RULESET") {
            config.default_ruleset = ruleset;
        }
        if let Some(first_to) = parse_number::<u32>(&lookup, "SB_DEFAULT_FIRST_TO") {
            config.default_first_to = first_to;
        }

        config
    }

    /// Check the configuration can run a match.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ZeroTimeout` - A timeout is zero
    /// - `ConfigError::InvalidFirstTo` - Default first-to is zero
    /// - `ConfigError::EmptyRuleset` - No default ruleset id
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.menu_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("SB_MENU_TIMEOUT_SECS"));
        }
        if self.choice_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("SB_DM_CHOICE_TIMEOUT_SECS"));
        }
        if self.default_first_to == 0 {
            return Err(ConfigError::InvalidFirstTo);
        }
        if self.default_ruleset.trim().is_empty() {
            return Err(ConfigError::EmptyRuleset);
        }
        Ok(())
    }
}

fn parse_number<N: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Option<N> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("SB_DEFAULT_FIRST_TO must be at least 1")]
    InvalidFirstTo,

    #[error("SB_DEFAULT_RULESET must name a ruleset")]
    EmptyRuleset,

    /// The default ruleset is not in the catalog.
    #[error("Default ruleset '{0}' is not in the ruleset catalog")]
    UnknownRuleset(String),
}
