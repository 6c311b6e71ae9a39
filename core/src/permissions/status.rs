//! Unified permission snapshot

use serde::{Deserialize, Serialize};

/// Point-in-time read of every permission the detection engine needs.
///
/// Always recomputed from the live OS state; never cached between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatus {
    pub fine_or_coarse_location: bool,
    pub bluetooth_scan: bool,
    pub bluetooth_connect: bool,
    pub notifications: bool,
    pub background_location: bool,
}

impl PermissionStatus {
    pub fn all_granted() -> Self {
        Self::uniform(true)
    }

    /// Broadcast one native flag to every field (iOS collapses them).
    pub fn uniform(granted: bool) -> Self {
        Self {
            fine_or_coarse_location: granted,
            bluetooth_scan: granted,
            bluetooth_connect: granted,
            notifications: granted,
            background_location: granted,
        }
    }

    /// Per-field OR. A field granted on either side stays granted.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fine_or_coarse_location: self.fine_or_coarse_location
                || other.fine_or_coarse_location,
            bluetooth_scan: self.bluetooth_scan || other.bluetooth_scan,
            bluetooth_connect: self.bluetooth_connect || other.bluetooth_connect,
            notifications: self.notifications || other.notifications,
            background_location: self.background_location || other.background_location,
        }
    }

    /// Location and Bluetooth, the minimum for foreground ranging.
    pub fn foreground_granted(&self) -> bool {
        self.fine_or_coarse_location && self.bluetooth_scan && self.bluetooth_connect
    }

    pub fn is_fully_granted(&self) -> bool {
        self.foreground_granted() && self.notifications && self.background_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform() {
        assert!(PermissionStatus::uniform(true).is_fully_granted());
        assert_eq!(PermissionStatus::uniform(false), PermissionStatus::default());
    }

    #[test]
    fn test_merge_never_regresses() {
        let before = PermissionStatus {
            fine_or_coarse_location: true,
            notifications: true,
            ..Default::default()
        };
        let fresh = PermissionStatus {
            bluetooth_scan: true,
            ..Default::default()
        };

        let merged = before.merge(fresh);
        assert!(merged.fine_or_coarse_location);
        assert!(merged.notifications);
        assert!(merged.bluetooth_scan);
        assert!(!merged.bluetooth_connect);
        assert!(!merged.background_location);
    }

    #[test]
    fn test_foreground_granted_ignores_optional_fields() {
        let status = PermissionStatus {
            fine_or_coarse_location: true,
            bluetooth_scan: true,
            bluetooth_connect: true,
            ..Default::default()
        };
        assert!(status.foreground_granted());
        assert!(!status.is_fully_granted());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(PermissionStatus::all_granted()).unwrap();
        assert_eq!(json["fineOrCoarseLocation"], true);
        assert_eq!(json["backgroundLocation"], true);
    }
}
