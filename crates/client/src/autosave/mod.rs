//! Debounced autosave with a guaranteed flush on teardown.
//!
//! Each session owns one scheduler. Edits reset a single pending deadline to
//! the quiet period; when the deadline fires, exactly one save is issued with
//! the latest payload. Intermediate payloads are never persisted. `flush` is
//! the durability backstop: it cancels the pending deadline, saves the
//! supplied payload awaited, and reports the result to the caller.
//!
//! Failure policy: a debounce-triggered save is background work and is only
//! logged; a flush failure is returned to the caller, who logs it during
//! teardown. The scheduler itself never retries.

use crate::store::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

/// Default quiet period between the last edit and the deferred save.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(30);

/// Destination for scheduled saves.
///
/// The session wires this to the remote store; tests substitute a recorder.
#[async_trait]
pub trait SaveSink: Send + Sync + 'static {
    async fn save(&self, payload: Value) -> Result<(), StoreError>;
}

enum Command {
    Edit(Value),
    Flush {
        payload: Option<Value>,
        done: oneshot::Sender<Result<(), StoreError>>,
    },
}

/// Debounce state: either nothing is scheduled, or one payload is waiting
/// on one deadline. Edits refresh the deadline and replace the payload;
/// firing or flushing returns to idle after issuing exactly one save.
enum DebounceState {
    Idle,
    Pending { payload: Value, deadline: Instant },
}

impl DebounceState {
    fn deadline(&self) -> Option<Instant> {
        match self {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline, .. } => Some(*deadline),
        }
    }

    fn take_payload(&mut self) -> Option<Value> {
        match std::mem::replace(self, DebounceState::Idle) {
            DebounceState::Idle => None,
            DebounceState::Pending { payload, .. } => Some(payload),
        }
    }
}

/// Handle to a per-session autosave worker.
///
/// Dropping the handle closes the command channel; the worker performs one
/// final best-effort save if a payload is still pending, then exits.
#[derive(Debug)]
pub struct Autosave {
    tx: mpsc::UnboundedSender<Command>,
}

impl Autosave {
    /// Spawn a scheduler with the default quiet period.
    pub fn spawn(sink: Arc<dyn SaveSink>) -> Self {
        Self::with_quiet_period(sink, DEFAULT_QUIET_PERIOD)
    }

    /// Spawn a scheduler with an explicit quiet period.
    pub fn with_quiet_period(sink: Arc<dyn SaveSink>, quiet_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, sink, quiet_period));
        Self { tx }
    }

    /// Record an edit: the payload replaces any pending one and the
    /// deadline restarts at the quiet period.
    pub fn record_edit(&self, payload: Value) {
        if self.tx.send(Command::Edit(payload)).is_err() {
            tracing::debug!("edit dropped, autosave worker already stopped");
        }
    }

    /// Cancel any pending deadline and save now, awaited.
    ///
    /// With `Some(payload)` the supplied payload is saved (teardown reads
    /// the editor's current state); with `None` the pending payload, if
    /// any, is saved. Saving nothing succeeds trivially.
    pub async fn flush(&self, payload: Option<Value>) -> Result<(), StoreError> {
        let (done, ack) = oneshot::channel();
        if self.tx.send(Command::Flush { payload, done }).is_err() {
            tracing::debug!("flush after autosave worker stopped");
            return Ok(());
        }
        match ack.await {
            Ok(result) => result,
            // Worker dropped mid-flush; its exit path already saved.
            Err(_) => Ok(()),
        }
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Command>, sink: Arc<dyn SaveSink>, quiet_period: Duration) {
    let mut state = DebounceState::Idle;

    loop {
        let deadline = state.deadline();

        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Edit(payload)) => {
                    state = DebounceState::Pending { payload, deadline: Instant::now() + quiet_period };
                }
                Some(Command::Flush { payload, done }) => {
                    let latest = payload.or_else(|| state.take_payload());
                    state = DebounceState::Idle;
                    let result = match latest {
                        Some(payload) => sink.save(payload).await,
                        None => Ok(()),
                    };
                    let _ = done.send(result);
                }
                None => {
                    // Session dropped without an explicit flush.
                    if let Some(payload) = state.take_payload() {
                        if let Err(error) = sink.save(payload).await {
                            tracing::warn!(%error, "final autosave failed");
                        }
                    }
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(payload) = state.take_payload() {
                    if let Err(error) = sink.save(payload).await {
                        // Background save: not retried, not surfaced.
                        tracing::debug!(%error, "debounced save failed");
                    }
                }
            }
        }
    }
}
