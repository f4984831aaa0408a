//! The celestial map controller.
//!
//! [`CelestialMap`] is the single owner of the view state. User actions go
//! in through [`CelestialMap::dispatch`]; anything that needs I/O comes back
//! out as an [`Effect`] for the runtime to execute, and the runtime reports
//! completions through the `*_finished` methods. The view only ever reads
//! [`Snapshot`]s.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::config::ResolverConfig;
use crate::models::{
    CelestialError, InputMode, MapDraft, MapPayload, MapRequest, Snapshot, Suggestion, UiState,
};
use crate::services::presenter::{ExportAction, MapResult, ResultPresenter};
use crate::services::resolver::{LocationResolver, LookupOutcome, LookupTicket, ReverseTicket};
use crate::utils::Platform;

/// Everything the user can do to the form
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Typing in the address box
    TypeQuery(String),
    /// Picking the n-th suggestion
    SelectSuggestion(usize),
    /// Clicking outside the suggestion list
    DismissSuggestions,
    SetMode(InputMode),
    SetLatitude(String),
    SetLongitude(String),
    /// Picking a point on the map widget
    ClickMap { latitude: f64, longitude: f64 },
    SetDate(String),
    SetTitle(String),
    Submit,
}

/// A submitted generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTicket {
    pub sequence: u64,
    pub request: MapRequest,
}

/// Work the runtime must perform on behalf of the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Wait out the debounce window, then call [`CelestialMap::lookup_started`]
    ScheduleLookup(LookupTicket),
    ReverseLookup(ReverseTicket),
    Generate(GenerationTicket),
}

pub struct CelestialMap {
    resolver: LocationResolver,
    draft: MapDraft,
    state: UiState,
    generation_sequence: u64,
    in_flight: Option<u64>,
    error: Option<String>,
    /// The last submission outcome owns the state until the next location input
    outcome_pinned: bool,
    presenter: ResultPresenter,
}

impl CelestialMap {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            resolver: LocationResolver::new(config),
            draft: MapDraft::default(),
            state: UiState::Idle,
            generation_sequence: 0,
            in_flight: None,
            error: None,
            outcome_pinned: false,
            presenter: ResultPresenter::new(),
        }
    }

    pub fn with_draft(mut self, draft: MapDraft) -> Self {
        self.draft = draft;
        self
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn draft(&self) -> &MapDraft {
        &self.draft
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn result(&self) -> Option<&MapResult> {
        self.presenter.result()
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Submit is disabled while a map or a location search is in flight
    pub fn can_submit(&self) -> bool {
        !self.is_generating() && !self.resolver.is_searching()
    }

    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        if matches!(
            action,
            Action::TypeQuery(_)
                | Action::SelectSuggestion(_)
                | Action::DismissSuggestions
                | Action::SetMode(_)
                | Action::ClickMap { .. }
        ) {
            self.outcome_pinned = false;
        }
        match action {
            Action::TypeQuery(text) => {
                let ticket = self.resolver.on_query_change(&text);
                self.settle();
                ticket.map(Effect::ScheduleLookup)
            }
            Action::SelectSuggestion(index) => {
                let suggestion = self.resolver.select(index)?;
                self.commit_suggestion(&suggestion);
                self.settle();
                None
            }
            Action::DismissSuggestions => {
                self.resolver.dismiss();
                self.settle();
                None
            }
            Action::SetMode(mode) => {
                self.resolver.set_mode(mode);
                self.settle();
                None
            }
            Action::SetLatitude(text) => {
                self.draft.latitude = text;
                None
            }
            Action::SetLongitude(text) => {
                self.draft.longitude = text;
                None
            }
            Action::ClickMap {
                latitude,
                longitude,
            } => {
                self.draft.set_coordinates(latitude, longitude);
                let ticket = self.resolver.request_reverse(latitude, longitude);
                self.settle();
                Some(Effect::ReverseLookup(ticket))
            }
            Action::SetDate(date) => {
                self.draft.date = date;
                None
            }
            Action::SetTitle(title) => {
                self.draft.title = title;
                None
            }
            Action::Submit => self.submit(Local::now().date_naive()),
        }
    }

    /// Submit the draft as of `today`; a no-op while submit is disabled
    pub fn submit(&mut self, today: NaiveDate) -> Option<Effect> {
        if !self.can_submit() {
            info!(state = ?self.state, "Ignoring submit while busy");
            return None;
        }

        let request = match self.draft.to_request(today) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Map request rejected");
                self.error = Some(e.user_message());
                self.outcome_pinned = true;
                self.state = UiState::Error;
                return None;
            }
        };

        self.resolver.dismiss();
        self.generation_sequence += 1;
        self.in_flight = Some(self.generation_sequence);
        self.error = None;
        self.state = UiState::Generating;

        info!(
            sequence = self.generation_sequence,
            latitude = request.latitude,
            longitude = request.longitude,
            date = %request.date,
            "Submitting map request"
        );
        Some(Effect::Generate(GenerationTicket {
            sequence: self.generation_sequence,
            request,
        }))
    }

    /// The debounce window for `ticket` elapsed; returns whether to run the lookup
    pub fn lookup_started(&mut self, ticket: &LookupTicket) -> bool {
        let started = self.resolver.begin_lookup(ticket);
        if started {
            self.settle();
        }
        started
    }

    pub fn lookup_finished(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Vec<Suggestion>, CelestialError>,
    ) -> LookupOutcome {
        let outcome = self.resolver.apply_suggestions(ticket, result);
        if outcome != LookupOutcome::Stale {
            self.settle();
        }
        outcome
    }

    pub fn reverse_finished(&mut self, ticket: &ReverseTicket, result: Result<String, CelestialError>) {
        self.resolver.apply_reverse(ticket, result);
    }

    pub fn generation_finished(
        &mut self,
        ticket: GenerationTicket,
        result: Result<MapPayload, CelestialError>,
    ) {
        if self.in_flight != Some(ticket.sequence) {
            warn!(sequence = ticket.sequence, "Ignoring result of an abandoned generation");
            return;
        }
        self.in_flight = None;
        self.outcome_pinned = true;

        match result {
            Ok(payload) => {
                let source = self.presenter.present(ticket.request, payload).source();
                info!(sequence = ticket.sequence, source = %source, "Map ready");
                self.error = None;
                self.state = UiState::Ready;
            }
            Err(e) => {
                warn!(sequence = ticket.sequence, error = %e, kind = ?e.kind(), "Map generation failed");
                self.error = Some(e.user_message());
                self.state = UiState::Error;
            }
        }
        self.settle();
    }

    pub fn export(&self, platform: Platform) -> Result<ExportAction, CelestialError> {
        self.presenter.export(platform)
    }

    /// The view is going away: release every image handle
    pub fn unmount(&mut self) {
        self.presenter.unmount();
        self.in_flight = None;
        self.outcome_pinned = false;
        self.state = UiState::Idle;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            mode: self.resolver.mode(),
            query: self.resolver.query().to_string(),
            place_name: self.resolver.place_name().map(str::to_string),
            suggestions: self.resolver.suggestions().to_vec(),
            suggestions_open: self.resolver.is_list_open(),
            lookup_pending: self.resolver.is_lookup_pending(),
            draft: self.draft.clone(),
            can_submit: self.can_submit(),
            view: self.presenter.render(self.state, self.error.as_deref()),
            error: self.error.clone(),
            last_request: self.presenter.request().cloned(),
        }
    }

    fn commit_suggestion(&mut self, suggestion: &Suggestion) {
        self.draft.apply_suggestion(suggestion);
        info!(
            display_name = %suggestion.display_name,
            latitude = suggestion.latitude,
            longitude = suggestion.longitude,
            "Location selected"
        );
    }

    /// Recompute the UI state from what is in flight and what is stored
    fn settle(&mut self) {
        self.state = if self.is_generating() {
            UiState::Generating
        } else if self.outcome_pinned && self.error.is_some() {
            UiState::Error
        } else if self.outcome_pinned && self.presenter.result().is_some() {
            UiState::Ready
        } else if self.resolver.is_searching() {
            UiState::SearchingLocation
        } else if self.resolver.is_list_open() {
            UiState::AwaitingSuggestionSelection
        } else if self.error.is_some() {
            UiState::Error
        } else if self.presenter.result().is_some() {
            UiState::Ready
        } else {
            UiState::Idle
        };
    }
}
