//! Location models: geocoder suggestions, input modes and the geocoder wire format.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::error::CelestialError;

/// A geocoded place offered to the user while typing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable place name (e.g., "Av. Paulista, São Paulo, Brasil")
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Suggestion {
    pub fn new(display_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            display_name: display_name.into(),
            latitude,
            longitude,
        }
    }
}

/// How the user is choosing the map location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Address search with debounced suggestions
    #[default]
    FreeText,
    /// Latitude and longitude typed by hand
    ManualCoordinates,
    /// Coordinates picked on a map widget
    MapClick,
}

/// Coordinate as sent by geocoders: some return numbers, Nominatim returns strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireCoordinate {
    Number(f64),
    Text(String),
}

impl WireCoordinate {
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            WireCoordinate::Number(n) => *n,
            WireCoordinate::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// One place record in a geocoder response
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeRecord {
    pub display_name: String,
    pub lat: WireCoordinate,
    pub lon: WireCoordinate,
}

impl GeocodeRecord {
    /// Convert to a suggestion, dropping records with unusable coordinates
    pub fn into_suggestion(self) -> Option<Suggestion> {
        let (Some(latitude), Some(longitude)) = (self.lat.value(), self.lon.value()) else {
            warn!(display_name = %self.display_name, "Skipping geocode record with invalid coordinates");
            return None;
        };
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            warn!(
                display_name = %self.display_name,
                latitude,
                longitude,
                "Skipping geocode record outside geographic range"
            );
            return None;
        }
        Some(Suggestion::new(self.display_name, latitude, longitude))
    }
}

/// Any body a geocoder may answer with
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeocodePayload {
    Many(Vec<GeocodeRecord>),
    Failure {
        #[serde(alias = "error")]
        erro: String,
    },
    One(GeocodeRecord),
}

impl GeocodePayload {
    /// Parse a raw geocoder body into suggestions.
    ///
    /// An explicit failure object from the backend maps to `NotFound`; an
    /// empty array is an empty, successful result.
    pub fn parse(body: &[u8]) -> Result<Vec<Suggestion>, CelestialError> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(CelestialError::InvalidResponse("empty geocoder body".to_string()));
        }
        let payload: GeocodePayload = serde_json::from_slice(body)
            .map_err(|e| CelestialError::InvalidResponse(format!("geocoder body: {e}")))?;

        match payload {
            GeocodePayload::Many(records) => Ok(records
                .into_iter()
                .filter_map(GeocodeRecord::into_suggestion)
                .collect()),
            GeocodePayload::One(record) => Ok(record.into_suggestion().into_iter().collect()),
            GeocodePayload::Failure { erro } => Err(CelestialError::NotFound(erro)),
        }
    }
}
