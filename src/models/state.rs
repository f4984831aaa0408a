//! View state: the UI state machine, the rendered result panel and read-only snapshots.

use serde::Serialize;

use crate::models::location::{InputMode, Suggestion};
use crate::models::map::{MapDraft, MapRequest};

/// Exactly one of these is active at any time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiState {
    #[default]
    Idle,
    SearchingLocation,
    AwaitingSuggestionSelection,
    Generating,
    Ready,
    Error,
}

/// What the result panel shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Placeholder { headline: String, hint: String },
    Loading { message: String },
    Image { source: String, alt: String },
    Failure { message: String },
}

/// Immutable copy of everything the view may read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: UiState,
    pub mode: InputMode,
    pub query: String,
    /// Place name from a reverse lookup, display only
    pub place_name: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub suggestions_open: bool,
    /// A lookup for the current query is scheduled or in flight
    pub lookup_pending: bool,
    pub draft: MapDraft,
    pub can_submit: bool,
    pub view: View,
    pub error: Option<String>,
    pub last_request: Option<MapRequest>,
}
