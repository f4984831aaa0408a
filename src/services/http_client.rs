//! Shared HTTP client for the geocoding and sky-map endpoints.
//!
//! This module provides a configurable HTTP client that implements:
//! - Separate timeouts for lookups (read) and map generation (write)
//! - Structured request logging
//! - Optional Prometheus request metrics
//!
//! Failed requests are not retried.

use std::time::{Duration, Instant};

use prometheus::{CounterVec, HistogramVec, Opts, Registry};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use url::Url;

use crate::models::CelestialError;

/// Configuration for the shared HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Timeout for geocoding lookups (in seconds)
    pub read_timeout_seconds: u64,

    /// Timeout for map generation (in seconds)
    pub write_timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    /// User-Agent header; public geocoders reject anonymous clients
    pub user_agent: String,

    /// Enable detailed logging
    pub enable_detailed_logging: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            read_timeout_seconds: 10,
            write_timeout_seconds: 60,
            connect_timeout_seconds: 3,
            user_agent: format!("celestial-map/{}", env!("CARGO_PKG_VERSION")),
            enable_detailed_logging: true,
        }
    }
}

/// Request metrics for outbound HTTP calls
#[derive(Clone)]
pub struct ClientMetrics {
    /// HTTP requests by destination, method, and outcome
    pub http_requests_total: CounterVec,

    /// HTTP request duration by destination and method
    pub http_request_duration_seconds: HistogramVec,

    /// Timeout occurrences by destination and type
    pub timeouts_total: CounterVec,
}

impl ClientMetrics {
    /// Create and register the metrics
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let http_requests_total = CounterVec::new(
            Opts::new(
                "celestial_http_requests_total",
                "Total outbound HTTP requests by destination, method, and outcome",
            ),
            &["destination", "method", "outcome"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "celestial_http_request_duration_seconds",
                "Duration of outbound HTTP requests",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["destination", "method"],
        )?;

        let timeouts_total = CounterVec::new(
            Opts::new(
                "celestial_http_timeouts_total",
                "Total timeouts by destination and type",
            ),
            &["destination", "timeout_type"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(timeouts_total.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration_seconds,
            timeouts_total,
        })
    }
}

/// Request context for logging and metrics
#[derive(Debug, Clone)]
struct RequestContext {
    destination: String,
    method: &'static str,
    url: String,
}

/// Operation type for determining the appropriate timeout
#[derive(Debug, Clone, Copy)]
enum OperationType {
    Read,
    Write,
}

impl OperationType {
    fn label(self) -> &'static str {
        match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
        }
    }
}

/// HTTP client shared by the geocoder and the map generator
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    metrics: Option<ClientMetrics>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(
        config: HttpClientConfig,
        metrics: Option<ClientMetrics>,
    ) -> Result<Self, CelestialError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config,
            metrics,
        })
    }

    /// Execute a GET request; non-2xx statuses are errors
    pub async fn get(&self, url: &Url) -> Result<Response, CelestialError> {
        let context = RequestContext {
            destination: extract_destination(url),
            method: "GET",
            url: url.to_string(),
        };
        self.execute(self.client.get(url.clone()), context, OperationType::Read)
            .await
    }

    /// Execute a POST request with a JSON body; non-2xx statuses are errors
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &T,
    ) -> Result<Response, CelestialError> {
        let context = RequestContext {
            destination: extract_destination(url),
            method: "POST",
            url: url.to_string(),
        };
        self.execute(
            self.client.post(url.clone()).json(body),
            context,
            OperationType::Write,
        )
        .await
    }

    /// Download a remote resource into memory
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, CelestialError> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        context: RequestContext,
        operation: OperationType,
    ) -> Result<Response, CelestialError> {
        let timeout = match operation {
            OperationType::Read => Duration::from_secs(self.config.read_timeout_seconds),
            OperationType::Write => Duration::from_secs(self.config.write_timeout_seconds),
        };
        let start = Instant::now();

        match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(response)) if response.status().is_success() => {
                if self.config.enable_detailed_logging {
                    info!(
                        destination = %context.destination,
                        method = context.method,
                        url = %context.url,
                        status = response.status().as_u16(),
                        duration_ms = start.elapsed().as_millis(),
                        "Request completed successfully"
                    );
                }
                self.record_request(&context, "success", start.elapsed());
                Ok(response)
            }
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                if self.config.enable_detailed_logging {
                    warn!(
                        destination = %context.destination,
                        method = context.method,
                        url = %context.url,
                        status,
                        duration_ms = start.elapsed().as_millis(),
                        "Request failed with error status"
                    );
                }
                self.record_request(&context, "error_status", start.elapsed());
                Err(CelestialError::Status(status))
            }
            Ok(Err(e)) => {
                if self.config.enable_detailed_logging {
                    error!(
                        destination = %context.destination,
                        method = context.method,
                        url = %context.url,
                        error = %e,
                        duration_ms = start.elapsed().as_millis(),
                        "Request failed with network error"
                    );
                }
                self.record_request(&context, "network_error", start.elapsed());
                Err(CelestialError::Network(e))
            }
            Err(_) => {
                if self.config.enable_detailed_logging {
                    warn!(
                        destination = %context.destination,
                        method = context.method,
                        url = %context.url,
                        timeout_seconds = timeout.as_secs(),
                        "Request timed out"
                    );
                }
                self.record_request(&context, "timeout", start.elapsed());
                self.record_timeout(&context, operation);
                Err(CelestialError::Timeout(timeout.as_millis() as u64))
            }
        }
    }

    fn record_request(&self, context: &RequestContext, outcome: &str, duration: Duration) {
        if let Some(metrics) = &self.metrics {
            metrics
                .http_requests_total
                .with_label_values(&[context.destination.as_str(), context.method, outcome])
                .inc();

            metrics
                .http_request_duration_seconds
                .with_label_values(&[context.destination.as_str(), context.method])
                .observe(duration.as_secs_f64());
        }
    }

    fn record_timeout(&self, context: &RequestContext, operation: OperationType) {
        if let Some(metrics) = &self.metrics {
            metrics
                .timeouts_total
                .with_label_values(&[context.destination.as_str(), operation.label()])
                .inc();
        }
    }
}

/// Extract destination (host) from URL for metrics grouping
fn extract_destination(url: &Url) -> String {
    url.host_str().unwrap_or("unknown").to_string()
}
