//! Map request models: the editable draft, the submitted request and the generated result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::error::CelestialError;
use crate::models::location::Suggestion;

/// Title printed on the map when the user leaves it blank
pub const DEFAULT_TITLE: &str = "O NASCER DE UMA ESTRELA";

/// Initial draft coordinates (São Paulo)
pub const DEFAULT_LATITUDE: f64 = -23.55;
pub const DEFAULT_LONGITUDE: f64 = -46.63;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form fields behind a map request, kept as typed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDraft {
    pub latitude: String,
    pub longitude: String,
    /// `YYYY-MM-DD`; empty means "today"
    pub date: String,
    pub title: String,
}

impl Default for MapDraft {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE.to_string(),
            longitude: DEFAULT_LONGITUDE.to_string(),
            date: String::new(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl MapDraft {
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.latitude = latitude.to_string();
        self.longitude = longitude.to_string();
    }

    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) {
        self.set_coordinates(suggestion.latitude, suggestion.longitude);
    }

    /// Coerce the draft into a request.
    ///
    /// Unparseable coordinates become 0, an empty date becomes `today` and an
    /// empty title becomes [`DEFAULT_TITLE`]. Out-of-range coordinates and
    /// malformed dates are rejected.
    pub fn to_request(&self, today: NaiveDate) -> Result<MapRequest, CelestialError> {
        let latitude = coerce_coordinate(&self.latitude);
        let longitude = coerce_coordinate(&self.longitude);

        let date = match self.date.trim() {
            "" => today,
            raw => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                CelestialError::Validation(format!("Date must be in YYYY-MM-DD format, got '{raw}'"))
            })?,
        };

        MapRequest::new(latitude, longitude, date, &self.title)
    }
}

/// Parse a coordinate field, falling back to 0 when it is not a finite number
pub fn coerce_coordinate(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Payload submitted to the sky-map endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub date: NaiveDate,
    pub title: String,
}

impl MapRequest {
    pub fn new(
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        title: &str,
    ) -> Result<Self, CelestialError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CelestialError::Validation(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CelestialError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }

        let title = match title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };

        Ok(Self {
            latitude,
            longitude,
            date,
            title,
        })
    }

    /// File name used when the rendered map is downloaded or shared
    pub fn export_file_name(&self) -> String {
        format!("mapa-celestial-{}.png", self.date.format(DATE_FORMAT))
    }
}

/// Raw outcome of a generation call, before the presenter takes ownership of it
#[derive(Debug, Clone, PartialEq)]
pub enum MapPayload {
    Image { bytes: Vec<u8>, content_type: String },
    Remote(Url),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_empty_title_falls_back_to_default() {
        let draft = MapDraft {
            latitude: "-23.55".into(),
            longitude: "-46.63".into(),
            date: "2024-06-21".into(),
            title: "   ".into(),
        };
        let request = draft.to_request(date("2000-01-01")).unwrap();
        assert_eq!(request.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_invalid_coordinates_fall_back_to_zero() {
        let draft = MapDraft {
            latitude: "".into(),
            longitude: "abc".into(),
            date: "2024-06-21".into(),
            title: "Here".into(),
        };
        let request = draft.to_request(date("2000-01-01")).unwrap();
        assert_eq!((request.latitude, request.longitude), (0.0, 0.0));
        assert_eq!(coerce_coordinate("NaN"), 0.0);
        assert_eq!(coerce_coordinate("inf"), 0.0);
    }

    #[test]
    fn test_empty_date_defaults_to_today() {
        let draft = MapDraft::default();
        let request = draft.to_request(date("2026-10-18")).unwrap();
        assert_eq!(request.date, date("2026-10-18"));
        assert_eq!(request.latitude, DEFAULT_LATITUDE);
        assert_eq!(request.longitude, DEFAULT_LONGITUDE);
    }

    #[test]
    fn test_rejects_out_of_range_and_malformed_input() {
        let mut draft = MapDraft::default();
        draft.latitude = "91".into();
        assert!(matches!(
            draft.to_request(date("2024-01-01")),
            Err(CelestialError::Validation(_))
        ));

        let mut draft = MapDraft::default();
        draft.longitude = "-180.5".into();
        assert!(draft.to_request(date("2024-01-01")).is_err());

        let mut draft = MapDraft::default();
        draft.date = "21/06/2024".into();
        assert!(matches!(
            draft.to_request(date("2024-01-01")),
            Err(CelestialError::Validation(_))
        ));
    }

    #[test]
    fn test_suggestion_coordinates_survive_the_draft_exactly() {
        let mut draft = MapDraft::default();
        draft.apply_suggestion(&Suggestion::new("Av. Paulista", -23.5613, -46.6565));
        let request = draft.to_request(date("2024-06-21")).unwrap();
        assert_eq!(request.latitude, -23.5613);
        assert_eq!(request.longitude, -46.6565);
    }

    #[test]
    fn test_request_wire_shape() {
        let request = MapRequest::new(-23.55, -46.63, date("2024-06-21"), "").unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "lat": -23.55,
                "lon": -46.63,
                "date": "2024-06-21",
                "title": DEFAULT_TITLE,
            })
        );
        assert_eq!(request.export_file_name(), "mapa-celestial-2024-06-21.png");
    }
}
