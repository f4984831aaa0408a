//! Geocoding: free-text addresses to coordinates, and coordinates back to place names.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::models::{CelestialError, GeocodePayload, Suggestion};
use crate::services::http_client::HttpClient;

/// Trait for geocoding backends
pub trait Geocoder: Send + Sync {
    /// Look up places matching a free-text query.
    ///
    /// An empty vector is a successful lookup with no matches.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Suggestion>, CelestialError>> + Send;

    /// Reverse geocode coordinates to a display name
    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<String, CelestialError>> + Send;
}

impl<G: Geocoder> Geocoder for Arc<G> {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Suggestion>, CelestialError>> + Send {
        (**self).search(query)
    }

    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<String, CelestialError>> + Send {
        (**self).reverse(latitude, longitude)
    }
}

/// Resolve a query to its best match, or `NotFound`
pub async fn resolve_first<G: Geocoder>(
    geocoder: &G,
    query: &str,
) -> Result<Suggestion, CelestialError> {
    geocoder
        .search(query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CelestialError::NotFound(query.to_string()))
}

/// Which geocoding service the endpoint speaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeProvider {
    /// The sky-map backend's own `/geocode` proxy
    #[default]
    Backend,
    /// A Nominatim-compatible public service
    Nominatim,
}

impl FromStr for GeocodeProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(GeocodeProvider::Backend),
            "nominatim" => Ok(GeocodeProvider::Nominatim),
            other => Err(format!("unknown geocode provider '{other}'")),
        }
    }
}

/// Geocoder backed by an HTTP endpoint
pub struct HttpGeocoder {
    client: HttpClient,
    base_url: Url,
    provider: GeocodeProvider,
    limit: usize,
}

impl HttpGeocoder {
    pub fn new(client: HttpClient, base_url: Url, provider: GeocodeProvider, limit: usize) -> Self {
        Self {
            client,
            base_url,
            provider,
            limit: limit.max(1),
        }
    }

    pub fn provider(&self) -> GeocodeProvider {
        self.provider
    }

    /// Build the forward lookup URL for a query
    pub fn search_url(&self, query: &str) -> Result<Url, CelestialError> {
        let mut url = match self.provider {
            GeocodeProvider::Backend => self.endpoint("geocode")?,
            GeocodeProvider::Nominatim => self.endpoint("search")?,
        };
        {
            let mut pairs = url.query_pairs_mut();
            if self.provider == GeocodeProvider::Nominatim {
                pairs
                    .append_pair("format", "json")
                    .append_pair("limit", &self.limit.to_string());
            }
            pairs.append_pair("q", query);
        }
        Ok(url)
    }

    /// Build the reverse lookup URL for a coordinate pair
    pub fn reverse_url(&self, latitude: f64, longitude: f64) -> Result<Url, CelestialError> {
        let mut url = self.endpoint("reverse")?;
        {
            let mut pairs = url.query_pairs_mut();
            if self.provider == GeocodeProvider::Nominatim {
                pairs.append_pair("format", "json");
            }
            pairs
                .append_pair("lat", &latitude.to_string())
                .append_pair("lon", &longitude.to_string());
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CelestialError> {
        // Keep any path prefix on the base URL
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path)?)
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<Suggestion>, CelestialError> {
        let response = self.client.get(url).await?;
        let body = response.bytes().await?;
        GeocodePayload::parse(&body)
    }
}

impl Geocoder for HttpGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, CelestialError> {
        let url = self.search_url(query)?;
        let mut suggestions = self.fetch(&url).await?;
        suggestions.truncate(self.limit);

        info!(
            provider = ?self.provider,
            query = %query,
            results = suggestions.len(),
            "Geocode lookup completed"
        );
        Ok(suggestions)
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, CelestialError> {
        let url = self.reverse_url(latitude, longitude)?;
        let place = self
            .fetch(&url)
            .await?
            .into_iter()
            .next()
            .map(|s| s.display_name)
            .ok_or_else(|| CelestialError::NotFound(format!("{latitude}, {longitude}")))?;

        debug!(latitude, longitude, place = %place, "Reverse geocode completed");
        Ok(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_client::HttpClientConfig;

    fn geocoder(base: &str, provider: GeocodeProvider) -> HttpGeocoder {
        let client = HttpClient::new(HttpClientConfig::default(), None).unwrap();
        HttpGeocoder::new(client, Url::parse(base).unwrap(), provider, 5)
    }

    #[test]
    fn test_backend_search_url_encodes_query() {
        let geocoder = geocoder("https://astro.gbonis.com.br", GeocodeProvider::Backend);
        let url = geocoder.search_url("Av. Paulista, São Paulo").unwrap();

        assert_eq!(url.path(), "/geocode");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("q".to_string(), "Av. Paulista, São Paulo".to_string())]
        );
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_nominatim_urls() {
        let geocoder = geocoder("https://nominatim.example.org/api", GeocodeProvider::Nominatim);

        let url = geocoder.search_url("Lisboa").unwrap();
        assert_eq!(url.path(), "/api/search");
        assert_eq!(url.query(), Some("format=json&limit=5&q=Lisboa"));

        let url = geocoder.reverse_url(38.7, -9.1).unwrap();
        assert_eq!(url.path(), "/api/reverse");
        assert_eq!(url.query(), Some("format=json&lat=38.7&lon=-9.1"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Nominatim".parse::<GeocodeProvider>(), Ok(GeocodeProvider::Nominatim));
        assert_eq!(" backend ".parse::<GeocodeProvider>(), Ok(GeocodeProvider::Backend));
        assert!("google".parse::<GeocodeProvider>().is_err());
    }
}
