// Beacon Bridge Core
//
// Sits between a host app and a vendor BLE-beacon SDK:
// - Permission orchestration across Android API levels (pass-through on iOS)
// - Normalization of loosely typed native events into a stable schema
// - Validated configuration before anything reaches the native module

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod native;
pub mod permissions;
pub mod settings;

// Mobile bridge module
pub mod mobile_bridge;

pub use bridge::BeaconBridge;
pub use config::{
    BackgroundScanInterval, ConfigureRequest, ForegroundScanInterval, MaxQueuedPayloads,
    SdkConfig, UserProperties,
};
pub use error::{BridgeError, NativeError, Result};
pub use events::{
    BackgroundDetectionEvent, Beacon, BeaconMetadata, BridgeEvent, ErrorEvent, EventEmitter,
    EventTopic, Proximity, Subscription, SyncLifecycleEvent, SyncPhase,
};
pub use logging::LogFormat;
pub use native::NativeBeaconModule;
pub use permissions::{
    orchestrator_for, EnsureOptions, Permission, PermissionBackend, PermissionError,
    PermissionOrchestrator, PermissionPolicy, PermissionStatus, PermissionThresholds,
    RequestOutcome,
};
pub use settings::{BridgeSettings, Platform, SettingsError};

// Mobile bridge exports for UniFFI
pub use mobile_bridge::*;

uniffi::setup_scaffolding!();

// ============================================================================
// TESTS
// ============================================================================
