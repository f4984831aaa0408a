//! Session runtime configuration.

use std::env;
use std::time::Duration;

/// Upper bounds on how long the view waits for each operation
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub lookup_timeout_ms: u64,
    pub generation_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 10_000,
            generation_timeout_ms: 60_000,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let lookup_timeout_ms = env::var("CELESTIAL_LOOKUP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        let generation_timeout_ms = env::var("CELESTIAL_GENERATION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60_000);

        Self {
            lookup_timeout_ms,
            generation_timeout_ms,
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}
