//! Sky-map generation client.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::models::{CelestialError, MapPayload, MapRequest};
use crate::services::http_client::HttpClient;

/// Trait for map generation backends
pub trait MapGenerator: Send + Sync {
    /// Render one map. Implementations issue exactly one request per call.
    fn generate(
        &self,
        request: &MapRequest,
    ) -> impl Future<Output = Result<MapPayload, CelestialError>> + Send;
}

impl<M: MapGenerator> MapGenerator for Arc<M> {
    fn generate(
        &self,
        request: &MapRequest,
    ) -> impl Future<Output = Result<MapPayload, CelestialError>> + Send {
        (**self).generate(request)
    }
}

/// What the sky-map endpoint answers with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseContract {
    /// The PNG itself
    #[default]
    Binary,
    /// `{"url": "..."}` pointing at a hosted image
    JsonUrl,
}

impl FromStr for ResponseContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "png" => Ok(ResponseContract::Binary),
            "json-url" | "json_url" | "url" => Ok(ResponseContract::JsonUrl),
            other => Err(format!("unknown response contract '{other}'")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostedImage {
    url: String,
}

/// Map generator posting to the sky-map HTTP endpoint
pub struct HttpMapGenerator {
    client: HttpClient,
    endpoint: Url,
    contract: ResponseContract,
}

impl HttpMapGenerator {
    pub fn new(client: HttpClient, endpoint: Url, contract: ResponseContract) -> Self {
        Self {
            client,
            endpoint,
            contract,
        }
    }

    pub fn contract(&self) -> ResponseContract {
        self.contract
    }

    /// Interpret a successful response body according to the configured contract
    pub fn decode(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<MapPayload, CelestialError> {
        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .unwrap_or_default();

        match self.contract {
            ResponseContract::Binary => {
                if !content_type.starts_with("image/") {
                    return Err(CelestialError::InvalidResponse(format!(
                        "expected an image, got '{content_type}'"
                    )));
                }
                if body.is_empty() {
                    return Err(CelestialError::InvalidResponse("empty image body".to_string()));
                }
                Ok(MapPayload::Image {
                    bytes: body.to_vec(),
                    content_type,
                })
            }
            ResponseContract::JsonUrl => {
                let hosted: HostedImage = serde_json::from_slice(body).map_err(|e| {
                    CelestialError::InvalidResponse(format!("expected {{\"url\": ...}}: {e}"))
                })?;
                if hosted.url.trim().is_empty() {
                    return Err(CelestialError::InvalidResponse("empty image url".to_string()));
                }
                // Relative URLs are served by the generation host
                Ok(MapPayload::Remote(self.endpoint.join(hosted.url.trim())?))
            }
        }
    }
}

impl MapGenerator for HttpMapGenerator {
    async fn generate(&self, request: &MapRequest) -> Result<MapPayload, CelestialError> {
        let response = self.client.post_json(&self.endpoint, request).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?;

        let payload = self.decode(content_type.as_deref(), &body)?;
        info!(
            latitude = request.latitude,
            longitude = request.longitude,
            date = %request.date,
            contract = ?self.contract,
            bytes = body.len(),
            "Sky map generated"
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_client::HttpClientConfig;

    fn generator(contract: ResponseContract) -> HttpMapGenerator {
        let client = HttpClient::new(HttpClientConfig::default(), None).unwrap();
        let endpoint = Url::parse("https://astro.gbonis.com.br/sky-map").unwrap();
        HttpMapGenerator::new(client, endpoint, contract)
    }

    #[test]
    fn test_binary_contract_accepts_images() {
        let generator = generator(ResponseContract::Binary);
        let payload = generator
            .decode(Some("image/png"), &[0x89, b'P', b'N', b'G'])
            .unwrap();

        assert_eq!(
            payload,
            MapPayload::Image {
                bytes: vec![0x89, b'P', b'N', b'G'],
                content_type: "image/png".to_string(),
            }
        );
    }

    #[test]
    fn test_binary_contract_rejects_other_bodies() {
        let generator = generator(ResponseContract::Binary);

        assert!(matches!(
            generator.decode(Some("application/json"), br#"{"url":"/x.png"}"#),
            Err(CelestialError::InvalidResponse(_))
        ));
        assert!(matches!(
            generator.decode(Some("image/png"), &[]),
            Err(CelestialError::InvalidResponse(_))
        ));
        assert!(generator.decode(None, b"PNG").is_err());
    }

    #[test]
    fn test_json_contract_resolves_relative_urls() {
        let generator = generator(ResponseContract::JsonUrl);

        let payload = generator
            .decode(Some("application/json; charset=utf-8"), br#"{"url": "/maps/abc.png"}"#)
            .unwrap();
        assert_eq!(
            payload,
            MapPayload::Remote(Url::parse("https://astro.gbonis.com.br/maps/abc.png").unwrap())
        );

        let payload = generator
            .decode(None, br#"{"url": "https://cdn.example.com/abc.png"}"#)
            .unwrap();
        assert_eq!(
            payload,
            MapPayload::Remote(Url::parse("https://cdn.example.com/abc.png").unwrap())
        );

        assert!(generator.decode(None, br#"{"url": ""}"#).is_err());
        assert!(generator.decode(None, b"\x89PNG").is_err());
    }

    #[test]
    fn test_contract_from_str() {
        assert_eq!(
            "json-url".parse::<ResponseContract>(),
            Ok(ResponseContract::JsonUrl)
        );
        assert_eq!("BINARY".parse::<ResponseContract>(), Ok(ResponseContract::Binary));
        assert!("xml".parse::<ResponseContract>().is_err());
    }
}
