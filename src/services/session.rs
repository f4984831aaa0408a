//! Session runtime: the event loop that drives a [`CelestialMap`].
//!
//! One tokio task owns the controller. User actions arrive over a channel,
//! effects are executed as spawned tasks whose completions come back over a
//! second channel, and every processed message publishes a fresh
//! [`Snapshot`] on a watch channel. Nothing outside the loop touches the
//! controller, so no locking is involved.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::models::{CelestialError, MapPayload, Snapshot, Suggestion};
use crate::services::controller::{Action, CelestialMap, Effect, GenerationTicket};
use crate::services::generator::MapGenerator;
use crate::services::geocoder::Geocoder;
use crate::services::presenter::ExportAction;
use crate::services::resolver::{LookupTicket, ReverseTicket};
use crate::utils::Platform;

enum Command {
    Action(Action),
    Export {
        platform: Platform,
        reply: oneshot::Sender<Result<ExportAction, CelestialError>>,
    },
    Shutdown,
}

enum Completion {
    DebounceElapsed(LookupTicket),
    Lookup(LookupTicket, Result<Vec<Suggestion>, CelestialError>),
    Reverse(ReverseTicket, Result<String, CelestialError>),
    Generation(GenerationTicket, Result<MapPayload, CelestialError>),
}

/// Client side of a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Start the event loop on the current tokio runtime
    pub fn spawn<G, M>(
        map: CelestialMap,
        geocoder: G,
        generator: M,
        config: SessionConfig,
    ) -> Self
    where
        G: Geocoder + 'static,
        M: MapGenerator + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(map.snapshot());

        let session = Session {
            debounce: map.resolver().config().debounce(),
            map,
            geocoder: Arc::new(geocoder),
            generator: Arc::new(generator),
            config,
            completions: completions_tx,
            pending_debounce: None,
            snapshots: snapshots_tx,
        };
        tokio::spawn(session.run(commands_rx, completions_rx));

        Self {
            commands: commands_tx,
            snapshots: snapshots_rx,
        }
    }

    pub fn dispatch(&self, action: Action) -> Result<(), CelestialError> {
        self.commands
            .send(Command::Action(action))
            .map_err(|_| CelestialError::SessionClosed)
    }

    /// Latest published view state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `predicate` (checked against the current one first)
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Result<Snapshot, CelestialError> {
        let snapshot = self
            .snapshots
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| CelestialError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    pub async fn export(&self, platform: Platform) -> Result<ExportAction, CelestialError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Export { platform, reply })
            .map_err(|_| CelestialError::SessionClosed)?;
        response.await.map_err(|_| CelestialError::SessionClosed)?
    }

    /// Unmount the view and wait for the loop to finish
    pub async fn close(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        while self.snapshots.changed().await.is_ok() {}
    }
}

struct Session<G, M> {
    map: CelestialMap,
    geocoder: Arc<G>,
    generator: Arc<M>,
    config: SessionConfig,
    debounce: Duration,
    completions: mpsc::UnboundedSender<Completion>,
    pending_debounce: Option<JoinHandle<()>>,
    snapshots: watch::Sender<Snapshot>,
}

impl<G, M> Session<G, M>
where
    G: Geocoder + 'static,
    M: MapGenerator + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        info!("Celestial map session started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Action(action)) => self.handle_action(action),
                    Some(Command::Export { platform, reply }) => {
                        let _ = reply.send(self.map.export(platform));
                        continue;
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
            self.publish();
        }

        if let Some(pending) = self.pending_debounce.take() {
            pending.abort();
        }
        self.map.unmount();
        self.publish();
        info!("Celestial map session closed");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.map.snapshot());
    }

    fn handle_action(&mut self, action: Action) {
        debug!(action = ?action, "Handling action");
        if let Some(effect) = self.map.dispatch(action) {
            self.run_effect(effect);
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::DebounceElapsed(ticket) => {
                if self.map.lookup_started(&ticket) {
                    self.spawn_lookup(ticket);
                }
            }
            Completion::Lookup(ticket, result) => {
                let outcome = self.map.lookup_finished(&ticket, result);
                debug!(query = %ticket.query, outcome = ?outcome, "Lookup finished");
            }
            Completion::Reverse(ticket, result) => self.map.reverse_finished(&ticket, result),
            Completion::Generation(ticket, result) => self.map.generation_finished(ticket, result),
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleLookup(ticket) => {
                if let Some(pending) = self.pending_debounce.take() {
                    pending.abort();
                }
                let completions = self.completions.clone();
                let debounce = self.debounce;
                self.pending_debounce = Some(tokio::spawn(async move {
                    tokio::time::sleep(debounce).await;
                    let _ = completions.send(Completion::DebounceElapsed(ticket));
                }));
            }
            Effect::ReverseLookup(ticket) => {
                let geocoder = Arc::clone(&self.geocoder);
                let completions = self.completions.clone();
                let limit = self.config.lookup_timeout();
                tokio::spawn(async move {
                    let result =
                        with_timeout(limit, geocoder.reverse(ticket.latitude, ticket.longitude))
                            .await;
                    let _ = completions.send(Completion::Reverse(ticket, result));
                });
            }
            Effect::Generate(ticket) => {
                let generator = Arc::clone(&self.generator);
                let completions = self.completions.clone();
                let limit = self.config.generation_timeout();
                tokio::spawn(async move {
                    let result = with_timeout(limit, generator.generate(&ticket.request)).await;
                    let _ = completions.send(Completion::Generation(ticket, result));
                });
            }
        }
    }

    fn spawn_lookup(&self, ticket: LookupTicket) {
        let geocoder = Arc::clone(&self.geocoder);
        let completions = self.completions.clone();
        let limit = self.config.lookup_timeout();
        tokio::spawn(async move {
            let result = with_timeout(limit, geocoder.search(&ticket.query)).await;
            let _ = completions.send(Completion::Lookup(ticket, result));
        });
    }
}

async fn with_timeout<T>(
    limit: Duration,
    operation: impl Future<Output = Result<T, CelestialError>>,
) -> Result<T, CelestialError> {
    tokio::time::timeout(limit, operation)
        .await
        .unwrap_or_else(|_| Err(CelestialError::Timeout(limit.as_millis() as u64)))
}
