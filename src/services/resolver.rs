//! Debounced address search state.
//!
//! The resolver never performs I/O itself. Every user keystroke bumps a
//! sequence number and may hand back a [`LookupTicket`]; the caller waits
//! out the debounce window, asks [`LocationResolver::begin_lookup`] whether
//! the ticket is still current, runs the lookup, and feeds the result back
//! through [`LocationResolver::apply_suggestions`]. A result whose ticket no
//! longer matches the current sequence number and query is dropped.

use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::models::{CelestialError, InputMode, Suggestion};

/// A lookup scheduled for one query value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub sequence: u64,
    pub query: String,
}

/// A reverse lookup for a map click or manual coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseTicket {
    pub sequence: u64,
    pub latitude: f64,
    pub longitude: f64,
}

/// What happened to a finished lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Suggestions were stored (possibly zero)
    Applied(usize),
    /// The lookup failed and was degraded to an empty list
    Suppressed,
    /// The query changed while the lookup was in flight
    Stale,
}

#[derive(Debug)]
pub struct LocationResolver {
    config: ResolverConfig,
    mode: InputMode,
    query: String,
    sequence: u64,
    /// Sequence number of the latest ticket handed out and not yet answered
    pending: Option<u64>,
    in_flight: Option<u64>,
    suggestions: Vec<Suggestion>,
    list_open: bool,
    place_name: Option<String>,
    /// Text we set programmatically; its echo from the input must not search
    echo_guard: Option<String>,
}

impl LocationResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            mode: InputMode::FreeText,
            query: String::new(),
            sequence: 0,
            pending: None,
            in_flight: None,
            suggestions: Vec::new(),
            list_open: false,
            place_name: None,
            echo_guard: None,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_list_open(&self) -> bool {
        self.list_open
    }

    pub fn place_name(&self) -> Option<&str> {
        self.place_name.as_deref()
    }

    /// True while a lookup for the current query is in flight
    pub fn is_searching(&self) -> bool {
        self.in_flight == Some(self.sequence)
    }

    /// True from the keystroke that scheduled a lookup until its answer is applied
    pub fn is_lookup_pending(&self) -> bool {
        self.pending == Some(self.sequence)
    }

    /// User-driven change of the address text.
    ///
    /// Returns a ticket to debounce when the text should be looked up.
    pub fn on_query_change(&mut self, text: &str) -> Option<LookupTicket> {
        if self.echo_guard.take().is_some_and(|echo| echo == text) {
            debug!(query = %text, "Ignoring echo of programmatic query text");
            return None;
        }

        self.query = text.to_string();
        self.invalidate();
        self.place_name = None;

        if self.mode != InputMode::FreeText {
            return None;
        }
        if text.trim().chars().count() <= self.config.min_query_chars {
            return None;
        }

        self.pending = Some(self.sequence);
        Some(LookupTicket {
            sequence: self.sequence,
            query: self.query.clone(),
        })
    }

    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        ticket.sequence == self.sequence && ticket.query == self.query
    }

    /// Called when the debounce window for `ticket` has elapsed.
    ///
    /// Returns false when a newer keystroke superseded the ticket.
    pub fn begin_lookup(&mut self, ticket: &LookupTicket) -> bool {
        if !self.is_current(ticket) || self.mode != InputMode::FreeText {
            return false;
        }
        self.in_flight = Some(ticket.sequence);
        true
    }

    pub fn apply_suggestions(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Vec<Suggestion>, CelestialError>,
    ) -> LookupOutcome {
        if self.in_flight == Some(ticket.sequence) {
            self.in_flight = None;
        }
        if !self.is_current(ticket) {
            debug!(
                query = %ticket.query,
                sequence = ticket.sequence,
                current_sequence = self.sequence,
                "Discarding stale suggestions"
            );
            return LookupOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(suggestions) => {
                let count = suggestions.len();
                self.list_open = count > 0;
                self.suggestions = suggestions;
                LookupOutcome::Applied(count)
            }
            Err(e) => {
                warn!(query = %ticket.query, error = %e, "Location suggestions unavailable");
                self.suggestions.clear();
                self.list_open = false;
                LookupOutcome::Suppressed
            }
        }
    }

    /// Commit a suggestion: its display name replaces the query text without searching
    pub fn select(&mut self, index: usize) -> Option<Suggestion> {
        let suggestion = self.suggestions.get(index)?.clone();
        self.set_query_text(&suggestion.display_name);
        self.place_name = None;
        Some(suggestion)
    }

    /// Close the suggestion list (click outside); nothing else changes
    pub fn dismiss(&mut self) {
        self.list_open = false;
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.invalidate();
    }

    pub fn request_reverse(&mut self, latitude: f64, longitude: f64) -> ReverseTicket {
        self.invalidate();
        self.place_name = None;
        ReverseTicket {
            sequence: self.sequence,
            latitude,
            longitude,
        }
    }

    /// Store a reverse lookup result for display. Returns false for stale or failed lookups.
    pub fn apply_reverse(
        &mut self,
        ticket: &ReverseTicket,
        result: Result<String, CelestialError>,
    ) -> bool {
        if ticket.sequence != self.sequence {
            return false;
        }
        match result {
            Ok(name) => {
                self.set_query_text(&name);
                self.place_name = Some(name);
                true
            }
            Err(e) => {
                warn!(
                    latitude = ticket.latitude,
                    longitude = ticket.longitude,
                    error = %e,
                    "Reverse geocode unavailable"
                );
                false
            }
        }
    }

    /// Replace the visible text without treating it as typing
    fn set_query_text(&mut self, text: &str) {
        self.query = text.to_string();
        self.echo_guard = Some(self.query.clone());
        self.invalidate();
    }

    /// Supersede every pending or in-flight lookup and drop the list
    fn invalidate(&mut self) {
        self.sequence += 1;
        self.suggestions.clear();
        self.list_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocationResolver {
        LocationResolver::new(ResolverConfig::default())
    }

    fn paulista() -> Suggestion {
        Suggestion::new("Av. Paulista, São Paulo, Brasil", -23.5613, -46.6565)
    }

    #[test]
    fn test_short_queries_are_not_looked_up() {
        let mut resolver = resolver();
        assert!(resolver.on_query_change("P").is_none());
        assert!(resolver.on_query_change("Pau").is_none());
        assert!(resolver.on_query_change("   Pau  ").is_none());
        assert!(resolver.on_query_change("Paul").is_some());
    }

    #[test]
    fn test_only_latest_ticket_survives_debounce() {
        let mut resolver = resolver();
        let first = resolver.on_query_change("Paul").unwrap();
        let last = resolver.on_query_change("Paulista Avenue").unwrap();
        assert!(resolver.is_lookup_pending());

        assert!(!resolver.begin_lookup(&first));
        assert!(resolver.begin_lookup(&last));
        assert!(resolver.is_searching());
        assert_eq!(last.query, "Paulista Avenue");
    }

    #[test]
    fn test_late_response_for_old_query_is_discarded() {
        let mut resolver = resolver();
        let old = resolver.on_query_change("Paulista").unwrap();
        assert!(resolver.begin_lookup(&old));

        let new = resolver.on_query_change("Paulista Avenue").unwrap();
        assert!(!resolver.is_searching());
        assert!(resolver.begin_lookup(&new));

        let outcome = resolver.apply_suggestions(&new, Ok(vec![paulista()]));
        assert_eq!(outcome, LookupOutcome::Applied(1));

        let outcome = resolver.apply_suggestions(&old, Ok(vec![Suggestion::new("Old", 1.0, 1.0)]));
        assert_eq!(outcome, LookupOutcome::Stale);
        assert_eq!(resolver.suggestions(), &[paulista()]);
        assert!(resolver.is_list_open());
    }

    #[test]
    fn test_failures_degrade_to_empty_list() {
        let mut resolver = resolver();
        let ticket = resolver.on_query_change("Paulista").unwrap();
        resolver.begin_lookup(&ticket);

        let outcome = resolver.apply_suggestions(&ticket, Err(CelestialError::Status(502)));
        assert_eq!(outcome, LookupOutcome::Suppressed);
        assert!(!resolver.is_lookup_pending());
        assert!(resolver.suggestions().is_empty());
        assert!(!resolver.is_searching());
    }

    #[test]
    fn test_select_replaces_text_without_new_lookup() {
        let mut resolver = resolver();
        let ticket = resolver.on_query_change("Paulista Avenue").unwrap();
        resolver.begin_lookup(&ticket);
        resolver.apply_suggestions(&ticket, Ok(vec![paulista()]));

        let selected = resolver.select(0).unwrap();
        assert_eq!(selected, paulista());
        assert_eq!(resolver.query(), "Av. Paulista, São Paulo, Brasil");
        assert!(resolver.suggestions().is_empty());

        // The input echoes the programmatic text back once
        assert!(resolver.on_query_change("Av. Paulista, São Paulo, Brasil").is_none());
        // Real typing afterwards searches again
        assert!(resolver.on_query_change("Av. Paulista, São Paulo, Brasi").is_some());
    }

    #[test]
    fn test_select_out_of_range() {
        let mut resolver = resolver();
        assert!(resolver.select(0).is_none());
    }

    #[test]
    fn test_dismiss_keeps_state() {
        let mut resolver = resolver();
        let ticket = resolver.on_query_change("Paulista").unwrap();
        resolver.begin_lookup(&ticket);
        resolver.apply_suggestions(&ticket, Ok(vec![paulista()]));

        resolver.dismiss();
        assert!(!resolver.is_list_open());
        assert_eq!(resolver.suggestions().len(), 1);
        assert_eq!(resolver.query(), "Paulista");
    }

    #[test]
    fn test_mode_switch_clears_suggestions_and_pending_lookups() {
        let mut resolver = resolver();
        let ticket = resolver.on_query_change("Paulista").unwrap();
        resolver.begin_lookup(&ticket);

        resolver.set_mode(InputMode::ManualCoordinates);
        assert!(!resolver.is_searching());
        assert_eq!(
            resolver.apply_suggestions(&ticket, Ok(vec![paulista()])),
            LookupOutcome::Stale
        );
        assert!(resolver.suggestions().is_empty());

        // Typing outside free-text mode never schedules a lookup
        assert!(resolver.on_query_change("Paulista Avenue").is_none());
    }

    #[test]
    fn test_reverse_lookup_is_display_only_and_guarded() {
        let mut resolver = resolver();
        resolver.set_mode(InputMode::MapClick);

        let stale = resolver.request_reverse(10.0, 10.0);
        let ticket = resolver.request_reverse(-23.5613, -46.6565);

        assert!(!resolver.apply_reverse(&stale, Ok("Somewhere else".into())));
        assert!(resolver.apply_reverse(&ticket, Ok("Bela Vista, São Paulo".into())));
        assert_eq!(resolver.place_name(), Some("Bela Vista, São Paulo"));
        assert_eq!(resolver.query(), "Bela Vista, São Paulo");
    }
}
