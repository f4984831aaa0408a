//! Configuration for the shared HTTP client
//!
//! Provides environment-based configuration for the HTTP client with
//! defaults suited to a slow image-rendering backend.

use std::env;

use crate::services::http_client::HttpClientConfig;

impl HttpClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let read_timeout_seconds = env::var("CELESTIAL_HTTP_READ_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.read_timeout_seconds);

        let write_timeout_seconds = env::var("CELESTIAL_HTTP_WRITE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.write_timeout_seconds);

        let connect_timeout_seconds = env::var("CELESTIAL_HTTP_CONNECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout_seconds);

        let user_agent = env::var("CELESTIAL_HTTP_USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        let enable_detailed_logging = env::var("CELESTIAL_HTTP_DETAILED_LOGGING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.enable_detailed_logging);

        Self {
            read_timeout_seconds,
            write_timeout_seconds,
            connect_timeout_seconds,
            user_agent,
            enable_detailed_logging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lock_env;

    #[test]
    fn test_http_client_config_defaults() {
        let _lock = lock_env();

        unsafe {
            env::remove_var("CELESTIAL_HTTP_READ_TIMEOUT");
            env::remove_var("CELESTIAL_HTTP_WRITE_TIMEOUT");
            env::remove_var("CELESTIAL_HTTP_CONNECT_TIMEOUT");
            env::remove_var("CELESTIAL_HTTP_USER_AGENT");
            env::remove_var("CELESTIAL_HTTP_DETAILED_LOGGING");
        }

        let config = HttpClientConfig::from_env();
        assert_eq!(config.read_timeout_seconds, 10);
        assert_eq!(config.write_timeout_seconds, 60);
        assert_eq!(config.connect_timeout_seconds, 3);
        assert!(config.enable_detailed_logging);
    }

    #[test]
    fn test_http_client_config_from_env() {
        let _lock = lock_env();

        unsafe {
            env::set_var("CELESTIAL_HTTP_READ_TIMEOUT", "2");
            env::set_var("CELESTIAL_HTTP_WRITE_TIMEOUT", "120");
            env::set_var("CELESTIAL_HTTP_USER_AGENT", "portfolio-bot/1.0");
            env::set_var("CELESTIAL_HTTP_DETAILED_LOGGING", "false");
        }

        let config = HttpClientConfig::from_env();
        assert_eq!(config.read_timeout_seconds, 2);
        assert_eq!(config.write_timeout_seconds, 120);
        assert_eq!(config.user_agent, "portfolio-bot/1.0");
        assert!(!config.enable_detailed_logging);

        // Clean up
        unsafe {
            env::remove_var("CELESTIAL_HTTP_READ_TIMEOUT");
            env::remove_var("CELESTIAL_HTTP_WRITE_TIMEOUT");
            env::remove_var("CELESTIAL_HTTP_USER_AGENT");
            env::remove_var("CELESTIAL_HTTP_DETAILED_LOGGING");
        }
    }
}
