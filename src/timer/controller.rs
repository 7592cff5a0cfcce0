use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use super::alert::CompletionAlert;
use super::sink::SessionSink;
use super::state::{TimerError, TimerState, TimerStatus};
use crate::models::SessionDraft;

/// Drives a [`TimerState`] in real time.
///
/// At most one ticker task is alive. Every accepted transition aborts it
/// before the state changes, so a stale ticker can never decrement a timer
/// that was paused, reset or restarted underneath it.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    sink: Arc<dyn SessionSink>,
    alert: CompletionAlert,
    updates: Arc<watch::Sender<TimerState>>,
    delivery: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TimerController {
    pub fn new(initial: TimerState, sink: Arc<dyn SessionSink>, alert: CompletionAlert) -> Self {
        let (updates, _) = watch::channel(initial.clone());
        Self {
            state: Arc::new(Mutex::new(initial)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            sink,
            alert,
            updates: Arc::new(updates),
            delivery: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub const fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Every published snapshot, starting with the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn set_duration(&self, minutes: u32) -> Result<TimerState, TimerError> {
        self.transition(|s| s.set_duration(minutes)).await
    }

    pub async fn select_subject(&self, subject_id: i32) -> Result<TimerState, TimerError> {
        self.transition(|s| s.select_subject(subject_id)).await
    }

    pub async fn start(&self) -> Result<TimerState, TimerError> {
        let state = self.transition(|s| s.start(Utc::now())).await?;
        self.spawn_ticker().await;
        info!(
            subject_id = state.subject_id,
            remaining_seconds = state.remaining_seconds,
            "Timer started"
        );
        Ok(state)
    }

    pub async fn pause(&self) -> Result<TimerState, TimerError> {
        let state = self.transition(TimerState::pause).await?;
        debug!(remaining_seconds = state.remaining_seconds, "Timer paused");
        Ok(state)
    }

    pub async fn reset(&self) -> TimerState {
        let result = self
            .transition(|s| {
                s.reset();
                Ok(())
            })
            .await;
        match result {
            Ok(state) => state,
            Err(_) => self.snapshot().await,
        }
    }

    /// Applies `apply` to a copy first; a rejected transition leaves both the
    /// state and the running ticker untouched.
    async fn transition<F>(&self, apply: F) -> Result<TimerState, TimerError>
    where
        F: FnOnce(&mut TimerState) -> Result<(), TimerError>,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        apply(&mut next)?;

        self.cancel_ticker().await;
        *state = next.clone();
        drop(state);

        self.updates.send_replace(next.clone());
        Ok(next)
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let controller = self.clone();
        *ticker = Some(tokio::spawn(async move { controller.run_ticker().await }));
    }

    async fn run_ticker(self) {
        let period = self.tick_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;

            let (snapshot, draft) = {
                let mut state = self.state.lock().await;
                if !state.is_running() {
                    break;
                }
                let draft = state.tick(Utc::now());
                (state.clone(), draft)
            };

            // Hand off before publishing so that anyone reacting to the
            // completed snapshot can already wait on the delivery.
            if let Some(draft) = draft {
                self.hand_off(draft).await;
            }

            self.updates.send_replace(snapshot.clone());

            if snapshot.status == TimerStatus::Completed {
                info!(minutes = snapshot.total_minutes, "Timer completed");
                self.alert.fire(snapshot.total_minutes);
                break;
            }
        }
    }

    /// Delivery runs detached from the ticker so a later transition cannot
    /// abort it midway. Failures are logged and the session is dropped.
    async fn hand_off(&self, draft: SessionDraft) {
        let sink = self.sink.clone();
        let handle = tokio::spawn(async move {
            let subject_id = draft.subject_id;
            if let Err(e) = sink.deliver(draft).await {
                error!(subject_id, error = %format!("{e:#}"), "Failed to persist focus session");
            }
        });
        *self.delivery.lock().await = Some(handle);
    }

    /// Waits for the most recent completed run to reach its sink.
    pub async fn wait_for_delivery(&self) {
        let handle = self.delivery.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = %e, "Session delivery task failed");
        }
    }
}
