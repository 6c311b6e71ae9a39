//! Host-side OS permission primitives
//!
//! The host (Android activity glue) implements `PermissionBackend`; the
//! orchestrator never talks to the OS any other way.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    FineLocation,
    CoarseLocation,
    BackgroundLocation,
    BluetoothScan,
    BluetoothConnect,
    PostNotifications,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::FineLocation,
        Permission::CoarseLocation,
        Permission::BackgroundLocation,
        Permission::BluetoothScan,
        Permission::BluetoothConnect,
        Permission::PostNotifications,
    ];

    /// Manifest name passed to `ActivityCompat.requestPermissions`.
    pub fn android_name(&self) -> &'static str {
        match self {
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::BackgroundLocation => "android.permission.ACCESS_BACKGROUND_LOCATION",
            Self::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
            Self::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
            Self::PostNotifications => "android.permission.POST_NOTIFICATIONS",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.android_name())
    }
}

/// Result of one interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOutcome {
    Granted,
    Denied,
    /// "Don't ask again": the OS will not show the dialog any more
    Blocked,
    /// The permission does not exist on this device
    Unavailable,
}

impl RequestOutcome {
    /// Platform gaps count as granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted | Self::Unavailable)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Permission check failed for {permission}: {reason}")]
    CheckFailed {
        permission: Permission,
        reason: String,
    },

    #[error("Permission request failed for {permission}: {reason}")]
    RequestFailed {
        permission: Permission,
        reason: String,
    },

    #[error("Could not open app settings: {0}")]
    SettingsUnavailable(String),
}

#[async_trait]
pub trait PermissionBackend: Send + Sync {
    /// False when there is no permission service at all (headless or
    /// secondary targets). The orchestrator then reports everything granted.
    fn is_available(&self) -> bool {
        true
    }

    /// Read-only; must never show UI.
    async fn check(&self, permission: Permission) -> Result<bool, PermissionError>;

    /// Show the consent dialog and resolve once the user answers.
    async fn request(&self, permission: Permission) -> Result<RequestOutcome, PermissionError>;

    /// Deep-link to this app's page in OS settings.
    async fn open_settings(&self) -> Result<(), PermissionError>;
}
