//! Location search configuration.

use std::env;
use std::time::Duration;

/// Configuration for the debounced address search
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Quiet period after the last keystroke before a lookup is sent
    pub debounce_ms: u64,
    /// Queries must be longer than this many characters to be looked up
    pub min_query_chars: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 600,
            min_query_chars: 3,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let debounce_ms = env::var("CELESTIAL_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600);

        let min_query_chars = env::var("CELESTIAL_MIN_QUERY_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        Self {
            debounce_ms,
            min_query_chars,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lock_env;

    #[test]
    fn test_resolver_config_from_env() {
        let _lock = lock_env();
        unsafe {
            env::set_var("CELESTIAL_DEBOUNCE_MS", "250");
            env::set_var("CELESTIAL_MIN_QUERY_CHARS", "not-a-number");
        }

        let config = ResolverConfig::from_env();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.min_query_chars, 3);

        unsafe {
            env::remove_var("CELESTIAL_DEBOUNCE_MS");
            env::remove_var("CELESTIAL_MIN_QUERY_CHARS");
        }
    }
}
