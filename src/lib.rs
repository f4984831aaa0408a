//! Celestial Map - a headless client for rendering star maps
//!
//! Turns a free-text address (or hand-typed / clicked coordinates), a date
//! and a title into a rendered sky-map image from a remote generation API:
//! - Debounced address suggestions with stale-response protection
//! - Map generation with a single in-flight request per session
//! - Result presentation with revocable image handles
//! - Platform-aware share or download export
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Suggestions, drafts, requests, UI state and errors
//! - `services/` - HTTP clients, the resolver/presenter/controller state owners, and the session runtime
//! - `utils/` - Platform capability detection
//! - `config/` - Configuration structures and environment loading
//! - `logging` - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use celestial_map::{
//!     Action, CelestialConfig, CelestialMap, HttpClient, HttpGeocoder, HttpMapGenerator,
//!     SessionHandle, UiState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CelestialConfig::from_env();
//!     let client = HttpClient::new(config.http.clone(), None)?;
//!     let geocoder = HttpGeocoder::new(
//!         client.clone(),
//!         config.endpoints.geocode_url.clone(),
//!         config.endpoints.geocode_provider,
//!         config.endpoints.geocode_limit,
//!     );
//!     let generator = HttpMapGenerator::new(
//!         client,
//!         config.endpoints.sky_map_url.clone(),
//!         config.endpoints.response_contract,
//!     );
//!
//!     let map = CelestialMap::new(config.resolver.clone());
//!     let mut session = SessionHandle::spawn(map, geocoder, generator, config.session.clone());
//!     session.dispatch(Action::Submit)?;
//!     let snapshot = session
//!         .wait_for(|s| matches!(s.state, UiState::Ready | UiState::Error))
//!         .await?;
//!     println!("{:?}", snapshot.view);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{
    CelestialConfig, EndpointConfig, LogFormat, LoggingConfig, ResolverConfig, SessionConfig,
};
pub use logging::init_tracing;
pub use models::{
    BuildInfo, CelestialError, DEFAULT_TITLE, ErrorKind, InputMode, MapDraft, MapPayload,
    MapRequest, Snapshot, Suggestion, UiState, View,
};
pub use services::{
    Action, CelestialMap, ClientMetrics, Effect, ExportAction, ExportFile, ExportSource,
    GeocodeProvider, Geocoder, HttpClient, HttpClientConfig, HttpGeocoder, HttpMapGenerator,
    ImageHandle, ImageStore, LocationResolver, LookupOutcome, MapGenerator, MapResult,
    ResponseContract, ResultPresenter, SessionHandle, resolve_first,
};
pub use utils::Platform;
