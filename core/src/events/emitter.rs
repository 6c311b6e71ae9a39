//! Listener registry for normalized events
//!
//! Registration hands back a `Subscription`; releasing it is the only cleanup
//! a caller owes, and releasing twice is harmless.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::types::{
    BackgroundDetectionEvent, Beacon, BridgeEvent, ErrorEvent, EventTopic, SyncLifecycleEvent,
};

type Listener = Arc<dyn Fn(&BridgeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<EventTopic, Vec<(u64, Listener)>>,
}

#[derive(Clone, Default)]
pub struct EventEmitter {
    registry: Arc<Mutex<Registry>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: EventTopic, listener: F) -> Subscription
    where
        F: Fn(&BridgeEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(topic)
            .or_default()
            .push((id, Arc::new(listener)));

        tracing::debug!("Listener {} registered for {}", id, topic);
        Subscription {
            topic,
            id,
            registry: Arc::downgrade(&self.registry),
            active: AtomicBool::new(true),
        }
    }

    pub fn on_beacons<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Beacon]) + Send + Sync + 'static,
    {
        self.subscribe(EventTopic::BeaconsDetected, move |event| {
            if let BridgeEvent::Beacons(beacons) = event {
                listener(beacons);
            }
        })
    }

    pub fn on_sync_lifecycle<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncLifecycleEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventTopic::SyncLifecycle, move |event| {
            if let BridgeEvent::SyncLifecycle(sync) = event {
                listener(sync);
            }
        })
    }

    pub fn on_background_detection<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BackgroundDetectionEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventTopic::BackgroundDetection, move |event| {
            if let BridgeEvent::BackgroundDetection(detection) = event {
                listener(detection);
            }
        })
    }

    pub fn on_scanning_state<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.subscribe(EventTopic::ScanningStateChanged, move |event| {
            if let BridgeEvent::ScanningState(scanning) = event {
                listener(*scanning);
            }
        })
    }

    pub fn on_error<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventTopic::Error, move |event| {
            if let BridgeEvent::Error(error) = event {
                listener(error);
            }
        })
    }

    /// Deliver to every listener on the event's topic. Returns how many were
    /// called.
    ///
    /// Listeners run outside the lock so they may subscribe or unsubscribe.
    pub fn emit(&self, event: &BridgeEvent) -> usize {
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .get(&event.topic())
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self, topic: EventTopic) -> usize {
        self.registry
            .lock()
            .listeners
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

/// Handle for one registered listener.
pub struct Subscription {
    topic: EventTopic,
    id: u64,
    registry: Weak<Mutex<Registry>>,
    active: AtomicBool,
}

impl Subscription {
    pub fn topic(&self) -> EventTopic {
        self.topic
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Idempotent. A no-op once the emitter itself is gone.
    pub fn remove(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(registry) = self.registry.upgrade() {
            if let Some(list) = registry.lock().listeners.get_mut(&self.topic) {
                list.retain(|(id, _)| *id != self.id);
            }
            tracing::debug!("Listener {} removed from {}", self.id, self.topic);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
