//! Ingestion session.
//!
//! A [`Session`] accepts source locators, processes each one on its own task
//! and exposes the results in two ways: an ordered event queue that can be
//! pulled while sources are still loading, and bulk accessors for calendars
//! and errors that become available once every source has finished.
//!
//! Calendars, errors and the in-flight counter live in one `watch` value and
//! are only ever changed together through `send_modify`. Workers push a
//! source's events onto the queue before they decrement the counter, so an
//! observer that sees the session drained also sees every event queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use icsfeed_core::{Calendar, Event};
use icsfeed_parser::{ExpandOptions, Parsed, parse_document};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::fetch::{DocumentFetcher, Fetcher};

/// Shared session aggregates.
#[derive(Debug, Default)]
struct SessionState {
    calendars: Vec<Calendar>,
    errors: Vec<IngestError>,
    in_flight: usize,
}

/// Everything a worker needs to turn a locator into a calendar.
struct Worker {
    fetcher: Arc<dyn Fetcher>,
    state: Arc<watch::Sender<SessionState>>,
    events: mpsc::UnboundedSender<Event>,
    next_id: Arc<AtomicU64>,
    options: ExpandOptions,
    timeout: Option<Duration>,
}

impl Worker {
    async fn run(&self, locator: String) {
        debug!(locator = %locator, "Fetching source");

        let fetched = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(&locator))
                .await
                .unwrap_or_else(|_| {
                    warn!(locator = %locator, ?limit, "Source timed out");
                    Err(IngestError::timeout(&locator, limit))
                }),
            None => self.fetcher.fetch(&locator).await,
        };

        let text = match fetched {
            Ok(text) => text,
            Err(err) => {
                warn!(locator = %locator, error = %err, "Source failed");
                self.finish(Err(err));
                return;
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let options = self.options;
        let url = locator.clone();
        let parsed =
            tokio::task::spawn_blocking(move || parse_document(&text, &url, id, &options)).await;

        match parsed {
            Ok(parsed) => {
                info!(
                    locator = %locator,
                    calendar_id = id,
                    events = parsed.calendar.events.len(),
                    "Source parsed"
                );
                self.finish(Ok(parsed));
            }
            Err(err) => {
                warn!(locator = %locator, error = %err, "Parser task failed");
                self.finish(Err(IngestError::read(&locator, err)));
            }
        }
    }

    /// Publishes a source's outcome and releases its in-flight slot.
    fn finish(&self, outcome: Result<Parsed, IngestError>) {
        match outcome {
            Ok(parsed) => {
                deliver(&self.events, &parsed.calendar);
                self.state.send_modify(|state| {
                    let locator = parsed.calendar.url.clone();
                    state.errors.extend(
                        parsed
                            .errors
                            .into_iter()
                            .map(|err| IngestError::zone(locator.clone(), err)),
                    );
                    state.calendars.push(parsed.calendar);
                    state.in_flight = state.in_flight.saturating_sub(1);
                });
            }
            Err(err) => self.state.send_modify(|state| {
                state.errors.push(err);
                state.in_flight = state.in_flight.saturating_sub(1);
            }),
        }
    }
}

fn deliver(queue: &mpsc::UnboundedSender<Event>, calendar: &Calendar) {
    for event in &calendar.events {
        // The session owns a receiver for as long as it owns this sender.
        let _ = queue.send(event.clone());
    }
}

/// Reads submissions and spawns one worker task per source.
async fn dispatch(mut intake: mpsc::UnboundedReceiver<String>, worker: Arc<Worker>) {
    while let Some(locator) = intake.recv().await {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run(locator).await });
    }
    debug!("Intake closed, dispatcher stopping");
}

/// A multi-source ingestion session.
///
/// Must be created inside a Tokio runtime.
pub struct Session {
    intake: mpsc::UnboundedSender<String>,
    state: Arc<watch::Sender<SessionState>>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    next_id: Arc<AtomicU64>,
    options: ExpandOptions,
    dispatcher: JoinHandle<()>,
}

impl Session {
    /// Creates a session that retrieves sources with [`DocumentFetcher`].
    pub fn new(config: IngestConfig) -> IngestResult<Self> {
        let fetcher = DocumentFetcher::new(config.clone())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a session that retrieves sources with a custom fetcher.
    pub fn with_fetcher(config: IngestConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let (intake, intake_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(SessionState::default());
        let state = Arc::new(state);
        let next_id = Arc::new(AtomicU64::new(1));
        let options = config.expand_options();

        let worker = Arc::new(Worker {
            fetcher,
            state: Arc::clone(&state),
            events: events_tx.clone(),
            next_id: Arc::clone(&next_id),
            options,
            timeout: config.fetch_timeout,
        });
        let dispatcher = tokio::spawn(dispatch(intake_rx, worker));

        Self {
            intake,
            state,
            events_tx,
            events_rx,
            next_id,
            options,
            dispatcher,
        }
    }

    /// Enqueues a source locator (local path or `http(s)://` URL).
    ///
    /// The source counts as in flight from this call until its worker has
    /// either parsed it or recorded a failure.
    pub fn submit(&self, locator: impl Into<String>) {
        let locator = locator.into();
        self.state.send_modify(|state| state.in_flight += 1);
        info!(locator = %locator, "Source accepted");

        if let Err(mpsc::error::SendError(locator)) = self.intake.send(locator) {
            warn!(locator = %locator, "Dispatcher is gone, dropping source");
            self.state.send_modify(|state| {
                state
                    .errors
                    .push(IngestError::read(locator, "dispatcher stopped"));
                state.in_flight = state.in_flight.saturating_sub(1);
            });
        }
    }

    /// Parses already-retrieved document text on the calling thread.
    ///
    /// The calendar has an empty locator; its events are queued like those of
    /// any other source.
    pub fn load(&self, text: &str) -> Calendar {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let parsed = parse_document(text, "", id, &self.options);
        deliver(&self.events_tx, &parsed.calendar);

        let calendar = parsed.calendar.clone();
        self.state.send_modify(|state| {
            state
                .errors
                .extend(parsed.errors.into_iter().map(|err| IngestError::zone("", err)));
            state.calendars.push(parsed.calendar);
        });
        debug!(calendar_id = id, events = calendar.events.len(), "Loaded document");

        calendar
    }

    /// Number of sources accepted but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.state.borrow().in_flight
    }

    /// Returns true when no source is in flight.
    pub fn is_drained(&self) -> bool {
        self.in_flight() == 0
    }

    /// Waits until every submitted source has finished.
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // The session holds the sender, so this cannot see a closed channel.
        let _ = rx.wait_for(|state| state.in_flight == 0).await;
    }

    /// Pulls the next event from the output queue.
    ///
    /// Events of one source arrive in generation order; sources interleave
    /// arbitrarily. Returns `None` once the session is drained and the queue
    /// is empty. Sources submitted later make the queue yield again.
    pub async fn next_event(&mut self) -> Option<Event> {
        let mut state = self.state.subscribe();
        loop {
            if let Ok(event) = self.events_rx.try_recv() {
                return Some(event);
            }
            if state.borrow_and_update().in_flight == 0 {
                return self.events_rx.try_recv().ok();
            }
            tokio::select! {
                event = self.events_rx.recv() => return event,
                _ = state.changed() => {}
            }
        }
    }

    /// Pulls the next queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events_rx.try_recv().ok()
    }

    /// All calendars parsed so far.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotDrained`] while sources are in flight.
    pub fn calendars(&self) -> IngestResult<Vec<Calendar>> {
        let state = self.state.borrow();
        if state.in_flight > 0 {
            return Err(IngestError::NotDrained {
                in_flight: state.in_flight,
            });
        }
        Ok(state.calendars.clone())
    }

    /// All retrieval failures and zone fallbacks recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotDrained`] while sources are in flight.
    pub fn errors(&self) -> IngestResult<Vec<IngestError>> {
        let state = self.state.borrow();
        if state.in_flight > 0 {
            return Err(IngestError::NotDrained {
                in_flight: state.in_flight,
            });
        }
        Ok(state.errors.clone())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}
