//! OS-version gating for runtime permissions
//!
//! Each Android permission only exists from a given API level onward. Below
//! that level the prompt is skipped and the permission counts as granted.
//! The levels are configuration because the vendor has moved them between
//! SDK releases.

use serde::{Deserialize, Serialize};

use super::backend::Permission;

/// API levels at which each permission model was introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionThresholds {
    /// Location runtime prompts (Android 6.0)
    pub runtime_permissions: u32,
    /// `ACCESS_BACKGROUND_LOCATION` exists (Android 10)
    pub background_location: u32,
    /// Background location may be requested without fine location already held
    pub independent_background: u32,
    /// `BLUETOOTH_SCAN` / `BLUETOOTH_CONNECT` (Android 12)
    pub bluetooth_runtime: u32,
    /// `POST_NOTIFICATIONS` (Android 13)
    pub notifications: u32,
}

impl Default for PermissionThresholds {
    fn default() -> Self {
        Self {
            runtime_permissions: 23,
            background_location: 29,
            independent_background: 30,
            bluetooth_runtime: 31,
            notifications: 33,
        }
    }
}

/// OS version plus thresholds, injected into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPolicy {
    os_version: u32,
    thresholds: PermissionThresholds,
}

impl PermissionPolicy {
    pub fn new(os_version: u32, thresholds: PermissionThresholds) -> Self {
        Self {
            os_version,
            thresholds,
        }
    }

    pub fn os_version(&self) -> u32 {
        self.os_version
    }

    pub fn thresholds(&self) -> &PermissionThresholds {
        &self.thresholds
    }

    pub fn introduced_in(&self, permission: Permission) -> u32 {
        let t = &self.thresholds;
        match permission {
            Permission::FineLocation | Permission::CoarseLocation => t.runtime_permissions,
            Permission::BackgroundLocation => t.background_location,
            Permission::BluetoothScan | Permission::BluetoothConnect => t.bluetooth_runtime,
            Permission::PostNotifications => t.notifications,
        }
    }

    /// False when the permission predates its runtime model on this OS,
    /// i.e. it is implicitly granted.
    pub fn requires_prompt(&self, permission: Permission) -> bool {
        self.os_version >= self.introduced_in(permission)
    }

    pub fn allows_independent_background(&self) -> bool {
        self.os_version >= self.thresholds.independent_background
    }
}
