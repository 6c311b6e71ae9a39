//! Typed event schema delivered to listeners

use serde::{Deserialize, Serialize};

// ============================================================================
// TOPICS
// ============================================================================

/// Fixed native → bridge event channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    BeaconsDetected,
    SyncLifecycle,
    BackgroundDetection,
    ScanningStateChanged,
    Error,
}

impl EventTopic {
    pub const ALL: [EventTopic; 5] = [
        EventTopic::BeaconsDetected,
        EventTopic::SyncLifecycle,
        EventTopic::BackgroundDetection,
        EventTopic::ScanningStateChanged,
        EventTopic::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BeaconsDetected => "onBeaconsDetected",
            Self::SyncLifecycle => "onSyncLifecycle",
            Self::BackgroundDetection => "onBackgroundDetection",
            Self::ScanningStateChanged => "onScanningStateChanged",
            Self::Error => "onError",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|topic| topic.name() == name)
    }
}

impl std::fmt::Display for EventTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// BEACONS
// ============================================================================

/// Vendor-classified distance bucket
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Proximity {
    Immediate,
    Near,
    Far,
    BtOnly,
    #[default]
    Unknown,
}

impl Proximity {
    /// Lower is closer; `Unknown` sorts last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Immediate => 0,
            Self::Near => 1,
            Self::Far => 2,
            Self::BtOnly => 3,
            Self::Unknown => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Near => "near",
            Self::Far => "far",
            Self::BtOnly => "bt-only",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct BeaconMetadata {
    pub firmware_version: String,
    pub battery_level: i64,
    pub movements: i64,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi_from_ble: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_connectable: Option<bool>,
}

/// One detection. Identity does not persist across batches; key on
/// `(uuid, major, minor)` for continuity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    pub uuid: String,
    pub major: i64,
    pub minor: i64,
    pub rssi: i64,
    pub proximity: Proximity,
    /// Meters; zero or negative means the distance is unknown
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BeaconMetadata>,
}

impl Beacon {
    pub fn key(&self) -> (&str, i64, i64) {
        (&self.uuid, self.major, self.minor)
    }

    pub fn has_distance(&self) -> bool {
        self.accuracy > 0.0
    }
}

// ============================================================================
// LIFECYCLE EVENTS
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Started,
    Completed,
    Failed,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct SyncLifecycleEvent {
    pub phase: SyncPhase,
    pub queued_payloads: i64,
    pub sent_payloads: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundDetectionEvent {
    pub beacon_count: i64,
    pub closest_proximity: Proximity,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

impl ErrorEvent {
    pub const UNKNOWN_CODE: &'static str = "UNKNOWN";
    pub const UNKNOWN_MESSAGE: &'static str = "Unknown error";
}

impl Default for ErrorEvent {
    fn default() -> Self {
        Self {
            code: Self::UNKNOWN_CODE.to_string(),
            message: Self::UNKNOWN_MESSAGE.to_string(),
        }
    }
}

/// A normalized event, tagged by topic.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Beacons(Vec<Beacon>),
    SyncLifecycle(SyncLifecycleEvent),
    BackgroundDetection(BackgroundDetectionEvent),
    ScanningState(bool),
    Error(ErrorEvent),
}

impl BridgeEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Beacons(_) => EventTopic::BeaconsDetected,
            Self::SyncLifecycle(_) => EventTopic::SyncLifecycle,
            Self::BackgroundDetection(_) => EventTopic::BackgroundDetection,
            Self::ScanningState(_) => EventTopic::ScanningStateChanged,
            Self::Error(_) => EventTopic::Error,
        }
    }
}
