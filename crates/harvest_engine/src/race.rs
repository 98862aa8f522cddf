//! Races one long-running action against cancellation signals and a deadline.
//!
//! Every long-running interaction (travelling, digging, waiting for chat)
//! combines one collaborator call, the world events that invalidate it and a
//! timeout. [`ActionRace`] is the only place that combination lives.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{select_all, BoxFuture};
use futures_util::FutureExt;
use harvest_core::Vec3;
use harvest_logging::harvest_debug;
use tokio_util::sync::CancellationToken;

use crate::{EventKind, EventSource, StuckDetection, WorldEvent, WorldView};

/// A source that can cut an action short.
pub enum CancelSignal {
    /// Fires on the first world event of this kind.
    WorldEvent(EventKind),
    /// Fires when the caller cancels the token.
    Token(CancellationToken),
    /// Fires when the bot stops making movement progress.
    Stuck(StuckWatchdog),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CancelCause {
    Died { respawn_at: Vec3 },
    Stuck { at: Vec3 },
    Aborted,
    Event(WorldEvent),
}

impl CancelCause {
    /// True for causes that originate in the world rather than in the caller.
    pub fn is_world_event(&self) -> bool {
        matches!(self, CancelCause::Died { .. } | CancelCause::Event(_))
    }
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Died { respawn_at } => {
                write!(f, "the bot died and respawned at {respawn_at}")
            }
            CancelCause::Stuck { at } => write!(f, "the bot appears to be stuck at {at}"),
            CancelCause::Aborted => write!(f, "the caller aborted the operation"),
            CancelCause::Event(event) => write!(f, "world event: {event}"),
        }
    }
}

/// The single result of one race.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome<T, E> {
    Succeeded(T),
    Failed(E),
    Cancelled(CancelCause),
    TimedOut,
}

impl<T, E> RaceOutcome<T, E> {
    pub fn label(&self) -> &'static str {
        match self {
            RaceOutcome::Succeeded(_) => "succeeded",
            RaceOutcome::Failed(_) => "failed",
            RaceOutcome::Cancelled(_) => "cancelled",
            RaceOutcome::TimedOut => "timed out",
        }
    }
}

/// Samples the bot position and resolves once it stops moving.
pub struct StuckWatchdog {
    world: Arc<dyn WorldView>,
    detection: StuckDetection,
}

impl StuckWatchdog {
    pub fn new(world: Arc<dyn WorldView>, detection: StuckDetection) -> Self {
        Self { world, detection }
    }

    pub async fn watch(self) -> CancelCause {
        let mut last = self.world.current_position();
        let mut strikes = 0_u32;
        loop {
            tokio::time::sleep(self.detection.interval).await;
            let now = self.world.current_position();
            if now.distance_to(last) < self.detection.min_progress {
                strikes += 1;
                if strikes > self.detection.max_strikes {
                    return CancelCause::Stuck { at: now };
                }
            } else {
                strikes = 0;
                last = now;
            }
        }
    }
}

impl CancelSignal {
    /// Registers the listener now and returns a future for its first firing.
    fn listen(self, events: &dyn EventSource) -> BoxFuture<'static, CancelCause> {
        match self {
            CancelSignal::WorldEvent(kind) => {
                let mut subscription = events.subscribe(kind);
                async move {
                    match subscription.recv().await {
                        Some(WorldEvent::Death { respawn_at }) => CancelCause::Died { respawn_at },
                        Some(event) => CancelCause::Event(event),
                        // The source is gone; this signal can no longer fire.
                        None => std::future::pending().await,
                    }
                }
                .boxed()
            }
            CancelSignal::Token(token) => async move {
                token.cancelled().await;
                CancelCause::Aborted
            }
            .boxed(),
            CancelSignal::Stuck(watchdog) => watchdog.watch().boxed(),
        }
    }
}

/// One primary action raced against cancellation signals and a timer.
///
/// Resolves exactly once. Sources are polled in a fixed order: the action,
/// then the signals, then the timer, so an action that is already complete
/// wins even if a signal fired meanwhile. All listeners are registered before
/// the action is first polled and released before the outcome is returned.
pub struct ActionRace<'a> {
    label: &'static str,
    events: &'a dyn EventSource,
    signals: Vec<CancelSignal>,
    timeout: Duration,
}

impl<'a> ActionRace<'a> {
    pub fn new(label: &'static str, events: &'a dyn EventSource, timeout: Duration) -> Self {
        Self {
            label,
            events,
            signals: Vec::new(),
            timeout,
        }
    }

    pub fn cancel_on(mut self, signal: CancelSignal) -> Self {
        self.signals.push(signal);
        self
    }

    pub async fn run<F, T, E>(self, action: F) -> RaceOutcome<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let ActionRace {
            label,
            events,
            signals,
            timeout,
        } = self;

        let listeners: Vec<_> = signals
            .into_iter()
            .map(|signal| signal.listen(events))
            .collect();

        let outcome = tokio::select! {
            biased;
            result = action => match result {
                Ok(value) => RaceOutcome::Succeeded(value),
                Err(err) => RaceOutcome::Failed(err),
            },
            cause = first_cancellation(listeners) => RaceOutcome::Cancelled(cause),
            () = tokio::time::sleep(timeout) => RaceOutcome::TimedOut,
        };

        harvest_debug!("{label} race {}", outcome.label());
        outcome
    }
}

async fn first_cancellation(listeners: Vec<BoxFuture<'static, CancelCause>>) -> CancelCause {
    if listeners.is_empty() {
        return std::future::pending().await;
    }
    let (cause, _index, _remaining) = select_all(listeners).await;
    cause
}
