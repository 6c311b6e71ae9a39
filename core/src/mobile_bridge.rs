// Mobile bridge types for UniFFI bindings
//
// Kotlin and Swift hosts reach the normalizer and the listener registry through
// these exports. Raw payloads cross the FFI as JSON strings; everything coming
// back is already normalized.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::{
    normalize, BackgroundDetectionEvent, Beacon, BridgeEvent, ErrorEvent, EventEmitter,
    EventTopic, Proximity, Subscription, SyncLifecycleEvent,
};

// ============================================================================
// PARSER EXPORTS
// ============================================================================

#[uniffi::export]
pub fn parse_beacon_batch_json(payload: String) -> Vec<Beacon> {
    normalize::parse_beacon_batch(&normalize::parse_payload_str(&payload))
}

#[uniffi::export]
pub fn parse_proximity_str(value: String) -> Proximity {
    normalize::parse_proximity_str(&value)
}

#[uniffi::export]
pub fn parse_sync_lifecycle_json(payload: String) -> SyncLifecycleEvent {
    normalize::parse_sync_lifecycle(&normalize::parse_payload_str(&payload))
}

#[uniffi::export]
pub fn parse_background_detection_json(payload: String) -> BackgroundDetectionEvent {
    normalize::parse_background_detection(&normalize::parse_payload_str(&payload))
}

#[uniffi::export]
pub fn parse_scanning_state_json(payload: String) -> bool {
    normalize::parse_scanning_state(&normalize::parse_payload_str(&payload))
}

#[uniffi::export]
pub fn parse_error_json(payload: String) -> ErrorEvent {
    normalize::parse_error(&normalize::parse_payload_str(&payload))
}

// ============================================================================
// FOREIGN LISTENER
// ============================================================================

/// Implemented in Kotlin/Swift. One callback per topic.
#[uniffi::export(with_foreign)]
pub trait BeaconEventListener: Send + Sync {
    fn on_beacons_detected(&self, beacons: Vec<Beacon>);
    fn on_sync_lifecycle(&self, event: SyncLifecycleEvent);
    fn on_background_detection(&self, event: BackgroundDetectionEvent);
    fn on_scanning_state_changed(&self, is_scanning: bool);
    fn on_error(&self, error: ErrorEvent);
}

fn dispatch(listener: &dyn BeaconEventListener, event: &BridgeEvent) {
    match event {
        BridgeEvent::Beacons(beacons) => listener.on_beacons_detected(beacons.clone()),
        BridgeEvent::SyncLifecycle(sync) => listener.on_sync_lifecycle(sync.clone()),
        BridgeEvent::BackgroundDetection(detection) => {
            listener.on_background_detection(detection.clone())
        }
        BridgeEvent::ScanningState(scanning) => listener.on_scanning_state_changed(*scanning),
        BridgeEvent::Error(error) => listener.on_error(error.clone()),
    }
}

// ============================================================================
// EVENT RELAY
// ============================================================================

/// Receives raw native events from platform glue and forwards the normalized
/// form to a single foreign listener.
#[derive(uniffi::Object)]
pub struct NativeEventRelay {
    events: EventEmitter,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl NativeEventRelay {
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }
}

#[uniffi::export]
impl NativeEventRelay {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: EventEmitter::new(),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    /// Replaces any previously set listener.
    pub fn set_listener(&self, listener: Arc<dyn BeaconEventListener>) {
        let fresh: Vec<Subscription> = EventTopic::ALL
            .into_iter()
            .map(|topic| {
                let listener = listener.clone();
                self.events
                    .subscribe(topic, move |event| dispatch(listener.as_ref(), event))
            })
            .collect();

        let previous = std::mem::replace(&mut *self.subscriptions.lock(), fresh);
        for sub in &previous {
            sub.remove();
        }
        tracing::info!("Foreign event listener attached");
    }

    pub fn clear_listener(&self) {
        let previous = std::mem::take(&mut *self.subscriptions.lock());
        if previous.is_empty() {
            return;
        }
        for sub in &previous {
            sub.remove();
        }
        tracing::info!("Foreign event listener cleared");
    }

    pub fn has_listener(&self) -> bool {
        !self.subscriptions.lock().is_empty()
    }

    /// Normalize and forward one native event. Returns false for an unknown
    /// topic.
    pub fn deliver(&self, topic: String, payload_json: String) -> bool {
        let Some(topic) = EventTopic::from_name(&topic) else {
            tracing::warn!("Relay dropping event on unknown topic '{}'", topic);
            return false;
        };

        let payload = normalize::parse_payload_str(&payload_json);
        self.events.emit(&normalize::parse_event(topic, &payload));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SyncPhase;

    #[derive(Default)]
    struct RecordingListener {
        beacons: Mutex<Vec<Vec<Beacon>>>,
        syncs: Mutex<Vec<SyncLifecycleEvent>>,
        detections: Mutex<Vec<BackgroundDetectionEvent>>,
        scanning: Mutex<Vec<bool>>,
        errors: Mutex<Vec<ErrorEvent>>,
    }

    impl BeaconEventListener for RecordingListener {
        fn on_beacons_detected(&self, beacons: Vec<Beacon>) {
            self.beacons.lock().push(beacons);
        }
        fn on_sync_lifecycle(&self, event: SyncLifecycleEvent) {
            self.syncs.lock().push(event);
        }
        fn on_background_detection(&self, event: BackgroundDetectionEvent) {
            self.detections.lock().push(event);
        }
        fn on_scanning_state_changed(&self, is_scanning: bool) {
            self.scanning.lock().push(is_scanning);
        }
        fn on_error(&self, error: ErrorEvent) {
            self.errors.lock().push(error);
        }
    }

    #[test]
    fn test_parse_exports_accept_garbage() {
        assert!(parse_beacon_batch_json("not json".into()).is_empty());
        assert_eq!(parse_proximity_str("NEAR".into()), Proximity::Near);
        assert_eq!(parse_sync_lifecycle_json("".into()).phase, SyncPhase::Unknown);
        assert_eq!(parse_background_detection_json("[]".into()).beacon_count, 0);
        assert!(!parse_scanning_state_json("{}".into()));
        assert_eq!(parse_error_json("null".into()), ErrorEvent::default());
    }

    #[test]
    fn test_relay_forwards_every_topic() {
        let relay = NativeEventRelay::new();
        let listener = Arc::new(RecordingListener::default());
        relay.set_listener(listener.clone());

        assert!(relay.deliver(
            "onBeaconsDetected".into(),
            r#"[{"uuid": "abc", "major": 1, "minor": 2, "rssi": -60, "proximity": "near"}]"#.into(),
        ));
        assert!(relay.deliver("onSyncLifecycle".into(), r#"{"status": "success"}"#.into()));
        assert!(relay.deliver("onBackgroundDetection".into(), r#"{"count": 3}"#.into()));
        assert!(relay.deliver("onScanningStateChanged".into(), "true".into()));
        assert!(relay.deliver("onError".into(), r#"{"code": "E_BT_OFF"}"#.into()));

        assert_eq!(listener.beacons.lock()[0][0].proximity, Proximity::Near);
        assert_eq!(listener.syncs.lock()[0].phase, SyncPhase::Completed);
        assert_eq!(listener.detections.lock()[0].beacon_count, 3);
        assert_eq!(*listener.scanning.lock(), vec![true]);
        let errors = listener.errors.lock();
        assert_eq!(errors[0].code, "E_BT_OFF");
        assert_eq!(errors[0].message, ErrorEvent::UNKNOWN_MESSAGE);
    }

    #[test]
    fn test_relay_unknown_topic() {
        let relay = NativeEventRelay::new();
        assert!(!relay.deliver("onBeaconDetected".into(), "[]".into()));
    }

    #[test]
    fn test_replacing_and_clearing_listener() {
        let relay = NativeEventRelay::new();
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());

        relay.set_listener(first.clone());
        relay.set_listener(second.clone());
        relay.deliver("onScanningStateChanged".into(), "false".into());

        assert!(first.scanning.lock().is_empty());
        assert_eq!(*second.scanning.lock(), vec![false]);
        assert_eq!(relay.events().listener_count(EventTopic::Error), 1);

        relay.clear_listener();
        relay.clear_listener();
        assert!(!relay.has_listener());
        relay.deliver("onScanningStateChanged".into(), "true".into());
        assert_eq!(second.scanning.lock().len(), 1);
    }
}
