//! Native event stream
//!
//! Raw payloads from the vendor SDK are normalized into a stable schema and
//! fanned out to registered listeners.

pub mod emitter;
pub mod normalize;
pub mod types;

pub use emitter::{EventEmitter, Subscription};
pub use normalize::{
    parse_background_detection, parse_beacon, parse_beacon_batch, parse_error, parse_event,
    parse_integer, parse_metadata, parse_number, parse_payload_str, parse_proximity,
    parse_proximity_str, parse_scanning_state, parse_sync_lifecycle,
};
pub use types::{
    BackgroundDetectionEvent, Beacon, BeaconMetadata, BridgeEvent, ErrorEvent, EventTopic,
    Proximity, SyncLifecycleEvent, SyncPhase,
};
