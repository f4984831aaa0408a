//! Integration tests for environment-driven configuration

use std::time::Duration;

use celestial_map::{CelestialConfig, GeocodeProvider, LogFormat, ResponseContract};

#[test]
fn test_celestial_config_from_env() {
    unsafe {
        std::env::set_var("CELESTIAL_API_BASE_URL", "http://localhost:8000/api/");
        std::env::set_var("CELESTIAL_DEBOUNCE_MS", "300");
        std::env::set_var("CELESTIAL_GENERATION_TIMEOUT_MS", "90000");
        std::env::set_var("CELESTIAL_LOOKUP_TIMEOUT_MS", "soon");
        std::env::set_var("CELESTIAL_LOG_FORMAT", "JSON");
        std::env::set_var("CELESTIAL_RESPONSE_CONTRACT", "json-url");
    }

    let config = CelestialConfig::from_env();

    assert_eq!(config.endpoints.geocode_url.as_str(), "http://localhost:8000/api/");
    assert_eq!(
        config.endpoints.sky_map_url.as_str(),
        "http://localhost:8000/api/sky-map"
    );
    assert_eq!(config.endpoints.geocode_provider, GeocodeProvider::Backend);
    assert_eq!(config.endpoints.response_contract, ResponseContract::JsonUrl);
    assert_eq!(config.resolver.debounce(), Duration::from_millis(300));
    assert_eq!(config.resolver.min_query_chars, 3);
    assert_eq!(config.session.generation_timeout(), Duration::from_secs(90));
    // Unparseable values fall back to defaults
    assert_eq!(config.session.lookup_timeout(), Duration::from_secs(10));
    assert_eq!(config.logging.format, LogFormat::Json);

    unsafe {
        std::env::remove_var("CELESTIAL_API_BASE_URL");
        std::env::remove_var("CELESTIAL_DEBOUNCE_MS");
        std::env::remove_var("CELESTIAL_GENERATION_TIMEOUT_MS");
        std::env::remove_var("CELESTIAL_LOOKUP_TIMEOUT_MS");
        std::env::remove_var("CELESTIAL_LOG_FORMAT");
        std::env::remove_var("CELESTIAL_RESPONSE_CONTRACT");
    }
}
