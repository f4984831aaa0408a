//! Result panel: image handles, rendering and the share/download export.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::models::{CelestialError, MapPayload, MapRequest, UiState, View};
use crate::services::http_client::HttpClient;
use crate::utils::Platform;

const PLACEHOLDER_HEADLINE: &str = "Waiting for coordinates";
const PLACEHOLDER_HINT: &str = "Search for a location and render to generate your map.";
const GENERATING_MESSAGE: &str = "Calculating star positions...";
const SEARCHING_MESSAGE: &str = "Searching location...";
const IMAGE_ALT: &str = "Generated celestial map";

/// Displayable reference to an image held in an [`ImageStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageHandle {
    id: Uuid,
}

impl ImageHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> String {
        format!("blob:celestial-map/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory image registry; every allocated handle must be revoked
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<Uuid, StoredImage>,
}

impl ImageStore {
    pub fn allocate(&mut self, bytes: Vec<u8>, content_type: String) -> ImageHandle {
        let id = Uuid::new_v4();
        self.images.insert(id, StoredImage { bytes, content_type });
        debug!(handle = %id, live = self.images.len(), "Allocated image handle");
        ImageHandle { id }
    }

    pub fn resolve(&self, handle: &ImageHandle) -> Option<&StoredImage> {
        self.images.get(&handle.id)
    }

    pub fn revoke(&mut self, handle: &ImageHandle) -> bool {
        let removed = self.images.remove(&handle.id).is_some();
        if removed {
            debug!(handle = %handle.id, live = self.images.len(), "Revoked image handle");
        }
        removed
    }

    pub fn live_count(&self) -> usize {
        self.images.len()
    }

    /// Revoke everything, returning how many handles were live
    pub fn clear(&mut self) -> usize {
        let count = self.images.len();
        self.images.clear();
        count
    }
}

/// A generated map as the view sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MapResult {
    Local(ImageHandle),
    Remote(Url),
}

impl MapResult {
    /// Value for an `<img src>`-like attribute
    pub fn source(&self) -> String {
        match self {
            MapResult::Local(handle) => handle.url(),
            MapResult::Remote(url) => url.to_string(),
        }
    }
}

/// Where exported bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum ExportSource {
    Bytes { bytes: Vec<u8>, content_type: String },
    Remote(Url),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub source: ExportSource,
}

impl ExportFile {
    /// Save the file into `dir`, downloading hosted images first
    pub async fn save_to(&self, dir: &Path, client: &HttpClient) -> Result<PathBuf, CelestialError> {
        let bytes = match &self.source {
            ExportSource::Bytes { bytes, .. } => bytes.clone(),
            ExportSource::Remote(url) => client.fetch_bytes(url).await?,
        };
        let path = dir.join(&self.file_name);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Map exported");
        Ok(path)
    }
}

/// The single export action, already branched on platform capability
#[derive(Debug, Clone, PartialEq)]
pub enum ExportAction {
    Share(ExportFile),
    Download(ExportFile),
}

impl ExportAction {
    pub fn file(&self) -> &ExportFile {
        match self {
            ExportAction::Share(file) | ExportAction::Download(file) => file,
        }
    }
}

/// Owns the current result and its image handle
#[derive(Debug, Default)]
pub struct ResultPresenter {
    store: ImageStore,
    current: Option<(MapRequest, MapResult)>,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a fresh generation result, releasing the previous one first
    pub fn present(&mut self, request: MapRequest, payload: MapPayload) -> &MapResult {
        self.release();
        let result = match payload {
            MapPayload::Image {
                bytes,
                content_type,
            } => MapResult::Local(self.store.allocate(bytes, content_type)),
            MapPayload::Remote(url) => MapResult::Remote(url),
        };
        &self.current.insert((request, result)).1
    }

    /// Drop the current result and revoke its handle
    pub fn release(&mut self) {
        if let Some((_, MapResult::Local(handle))) = self.current.take() {
            self.store.revoke(&handle);
        }
    }

    /// Release everything; called when the view goes away
    pub fn unmount(&mut self) {
        self.current = None;
        let released = self.store.clear();
        if released > 0 {
            debug!(released, "Released image handles on unmount");
        }
    }

    pub fn result(&self) -> Option<&MapResult> {
        self.current.as_ref().map(|(_, result)| result)
    }

    pub fn request(&self) -> Option<&MapRequest> {
        self.current.as_ref().map(|(request, _)| request)
    }

    pub fn image(&self) -> Option<&StoredImage> {
        match self.result()? {
            MapResult::Local(handle) => self.store.resolve(handle),
            MapResult::Remote(_) => None,
        }
    }

    pub fn live_handles(&self) -> usize {
        self.store.live_count()
    }

    pub fn render(&self, state: UiState, error: Option<&str>) -> View {
        match state {
            UiState::Generating => View::Loading {
                message: GENERATING_MESSAGE.to_string(),
            },
            UiState::SearchingLocation => View::Loading {
                message: SEARCHING_MESSAGE.to_string(),
            },
            UiState::Error => View::Failure {
                message: error
                    .unwrap_or("Something went wrong while rendering the star map. Please try again.")
                    .to_string(),
            },
            UiState::Idle | UiState::Ready | UiState::AwaitingSuggestionSelection => {
                match self.result() {
                    Some(result) => View::Image {
                        source: result.source(),
                        alt: IMAGE_ALT.to_string(),
                    },
                    None => View::Placeholder {
                        headline: PLACEHOLDER_HEADLINE.to_string(),
                        hint: PLACEHOLDER_HINT.to_string(),
                    },
                }
            }
        }
    }

    /// Build the export action for the current map
    pub fn export(&self, platform: Platform) -> Result<ExportAction, CelestialError> {
        let (request, result) = self.current.as_ref().ok_or(CelestialError::NothingToExport)?;

        let source = match result {
            MapResult::Local(handle) => {
                let image = self
                    .store
                    .resolve(handle)
                    .ok_or(CelestialError::NothingToExport)?;
                ExportSource::Bytes {
                    bytes: image.bytes.clone(),
                    content_type: image.content_type.clone(),
                }
            }
            MapResult::Remote(url) => ExportSource::Remote(url.clone()),
        };
        let file = ExportFile {
            file_name: request.export_file_name(),
            source,
        };

        Ok(match platform {
            Platform::NativeShare => ExportAction::Share(file),
            Platform::Download => ExportAction::Download(file),
        })
    }
}

impl Drop for ResultPresenter {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(date: &str) -> MapRequest {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        MapRequest::new(-23.55, -46.63, date, "").unwrap()
    }

    fn png() -> MapPayload {
        MapPayload::Image {
            bytes: vec![0x89, b'P', b'N', b'G'],
            content_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_resubmission_releases_previous_handle() {
        let mut presenter = ResultPresenter::new();

        let first = presenter.present(request("2024-06-21"), png()).clone();
        let second = presenter.present(request("2024-06-22"), png()).clone();

        assert_ne!(first, second);
        assert_eq!(presenter.live_handles(), 1);
        assert_eq!(presenter.image().map(|i| i.content_type.as_str()), Some("image/png"));
        for _ in 0..10 {
            presenter.present(request("2024-06-23"), png());
        }
        assert_eq!(presenter.live_handles(), 1);

        presenter.unmount();
        assert_eq!(presenter.live_handles(), 0);
        assert!(presenter.result().is_none());
    }

    #[test]
    fn test_remote_results_hold_no_handles() {
        let mut presenter = ResultPresenter::new();
        presenter.present(request("2024-06-21"), png());

        let url = Url::parse("https://astro.gbonis.com.br/maps/abc.png").unwrap();
        let result = presenter.present(request("2024-06-21"), MapPayload::Remote(url.clone()));
        assert_eq!(result.source(), url.to_string());
        assert_eq!(presenter.live_handles(), 0);
        assert!(presenter.image().is_none());

        presenter.release();
        assert!(presenter.result().is_none());
    }

    #[test]
    fn test_render_per_state() {
        let mut presenter = ResultPresenter::new();

        assert!(matches!(presenter.render(UiState::Idle, None), View::Placeholder { .. }));
        assert!(matches!(
            presenter.render(UiState::Generating, None),
            View::Loading { .. }
        ));
        assert!(matches!(
            presenter.render(UiState::SearchingLocation, None),
            View::Loading { .. }
        ));
        assert_eq!(
            presenter.render(UiState::Error, Some("boom")),
            View::Failure {
                message: "boom".to_string()
            }
        );

        let source = presenter.present(request("2024-06-21"), png()).source();
        assert!(source.starts_with("blob:celestial-map/"));
        assert_eq!(
            presenter.render(UiState::Ready, None),
            View::Image {
                source,
                alt: IMAGE_ALT.to_string()
            }
        );
    }

    #[test]
    fn test_export_branches_on_platform() {
        let mut presenter = ResultPresenter::new();
        assert!(matches!(
            presenter.export(Platform::Download),
            Err(CelestialError::NothingToExport)
        ));

        presenter.present(request("2024-06-21"), png());

        let download = presenter.export(Platform::Download).unwrap();
        assert!(matches!(download, ExportAction::Download(_)));
        assert_eq!(download.file().file_name, "mapa-celestial-2024-06-21.png");

        let share = presenter.export(Platform::NativeShare).unwrap();
        assert!(matches!(share, ExportAction::Share(_)));
        assert_eq!(
            share.file().source,
            ExportSource::Bytes {
                bytes: vec![0x89, b'P', b'N', b'G'],
                content_type: "image/png".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_save_to_writes_file() {
        let dir = std::env::temp_dir().join(format!("celestial-map-{}", Uuid::new_v4()));
        let client = HttpClient::new(Default::default(), None).unwrap();
        let file = ExportFile {
            file_name: "mapa-celestial-2024-06-21.png".to_string(),
            source: ExportSource::Bytes {
                bytes: b"PNG".to_vec(),
                content_type: "image/png".to_string(),
            },
        };

        let path = file.save_to(&dir, &client).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"PNG");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
