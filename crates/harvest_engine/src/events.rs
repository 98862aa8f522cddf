use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use harvest_core::Vec3;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Death,
    Chat,
}

/// Asynchronous notification pushed by the world.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// The bot died and has respawned at `respawn_at`.
    Death { respawn_at: Vec3 },
    Chat { sender: String, message: String },
}

impl WorldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::Death { .. } => EventKind::Death,
            WorldEvent::Chat { .. } => EventKind::Chat,
        }
    }
}

impl fmt::Display for WorldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldEvent::Death { respawn_at } => write!(f, "death (respawned at {respawn_at})"),
            WorldEvent::Chat { sender, message } => write!(f, "chat <{sender}> {message}"),
        }
    }
}

pub trait EventSource: Send + Sync {
    /// Starts listening for `kind`. Listening stops when the returned guard drops.
    fn subscribe(&self, kind: EventKind) -> Subscription;
}

/// Scope-bound event listener. Dropping it unregisters the listener.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<WorldEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<WorldEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            release: Some(Box::new(release)),
        }
    }

    /// Next matching event, or `None` once the source has gone away.
    pub async fn recv(&mut self) -> Option<WorldEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_id: HashMap<u64, (EventKind, mpsc::UnboundedSender<WorldEvent>)>,
}

/// In-process event bus fanning world events out to live subscriptions.
#[derive(Default, Clone)]
pub struct WorldEventBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl WorldEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every listener of its kind; returns how many received it.
    pub fn publish(&self, event: WorldEvent) -> usize {
        let kind = event.kind();
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners
            .by_id
            .values()
            .filter(|(listening, _)| *listening == kind)
            .filter(|(_, tx)| tx.send(event.clone()).is_ok())
            .count()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }
}

impl EventSource for WorldEventBus {
    fn subscribe(&self, kind: EventKind) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.by_id.insert(id, (kind, tx));
            id
        };

        let registry: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        Subscription::new(rx, move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .by_id
                    .remove(&id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_a_subscription_unregisters_it() {
        let bus = WorldEventBus::new();
        let mut deaths = bus.subscribe(EventKind::Death);
        let chats = bus.subscribe(EventKind::Chat);
        assert_eq!(bus.active_subscriptions(), 2);

        let delivered = bus.publish(WorldEvent::Death {
            respawn_at: Vec3::new(0.0, 64.0, 0.0),
        });
        assert_eq!(delivered, 1);
        assert!(matches!(deaths.recv().await, Some(WorldEvent::Death { .. })));

        drop(chats);
        drop(deaths);
        assert_eq!(bus.active_subscriptions(), 0);
        assert_eq!(
            bus.publish(WorldEvent::Chat {
                sender: "alex".into(),
                message: "hi".into()
            }),
            0
        );
    }
}
