use std::env;

use crate::config::ConfigError;

pub(crate) fn require_any_env(keys: &[&str]) -> Result<String, ConfigError> {
    keys.iter()
        .find_map(|key| optional_trimmed_env(key))
        .ok_or_else(|| ConfigError::MissingVar(keys.join(" or ")))
}

pub(crate) fn env_or(key: &str, default: &str) -> String {
    optional_trimmed_env(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
