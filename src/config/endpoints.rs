//! Remote endpoint configuration.

use std::env;

use tracing::warn;
use url::Url;

use crate::services::generator::ResponseContract;
use crate::services::geocoder::GeocodeProvider;

pub const DEFAULT_API_BASE_URL: &str = "https://astro.gbonis.com.br/";

/// Where the geocoder and the sky-map generator live
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub geocode_url: Url,
    pub geocode_provider: GeocodeProvider,
    /// Maximum number of suggestions per lookup
    pub geocode_limit: usize,
    pub sky_map_url: Url,
    pub response_contract: ResponseContract,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let base = default_base_url();
        Self {
            sky_map_url: sky_map_url(&base),
            geocode_url: base,
            geocode_provider: GeocodeProvider::Backend,
            geocode_limit: 5,
            response_contract: ResponseContract::Binary,
        }
    }
}

impl EndpointConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let base = env_url("CELESTIAL_API_BASE_URL").unwrap_or_else(default_base_url);

        let geocode_url = env_url("CELESTIAL_GEOCODE_URL").unwrap_or_else(|| base.clone());

        let geocode_provider = env::var("CELESTIAL_GEOCODE_PROVIDER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let geocode_limit = env::var("CELESTIAL_GEOCODE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let sky_map_url = env_url("CELESTIAL_SKY_MAP_URL").unwrap_or_else(|| sky_map_url(&base));

        let response_contract = env::var("CELESTIAL_RESPONSE_CONTRACT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            geocode_url,
            geocode_provider,
            geocode_limit,
            sky_map_url,
            response_contract,
        }
    }
}

fn env_url(name: &str) -> Option<Url> {
    let raw = env::var(name).ok()?;
    match Url::parse(raw.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "Ignoring invalid URL");
            None
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

fn sky_map_url(base: &Url) -> Url {
    base.join("sky-map").unwrap_or_else(|_| base.clone())
}
