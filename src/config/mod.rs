//! Configuration structures and loading utilities.
//!
//! Every concern has its own structure with a `Default` and a `from_env()`
//! constructor; [`CelestialConfig`] bundles them for the binary.

pub mod endpoints;
pub mod http_client;
pub mod logging;
pub mod resolver;
pub mod session;

pub use endpoints::*;
pub use logging::*;
pub use resolver::*;
pub use session::*;

use crate::services::http_client::HttpClientConfig;

/// Serializes every test in this crate that touches process environment variables
#[cfg(test)]
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default)]
pub struct CelestialConfig {
    pub endpoints: EndpointConfig,
    pub http: HttpClientConfig,
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl CelestialConfig {
    pub fn from_env() -> Self {
        Self {
            endpoints: EndpointConfig::from_env(),
            http: HttpClientConfig::from_env(),
            resolver: ResolverConfig::from_env(),
            session: SessionConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}
