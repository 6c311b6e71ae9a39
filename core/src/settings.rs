//! Host-supplied bridge settings
//!
//! Resolved once when the bridge is constructed and threaded through
//! explicitly. Nothing in the crate reads the OS version ad hoc:
//! - Platform selection (which permission strategy to use)
//! - OS version (Android API level; ignored on iOS)
//! - Permission version thresholds
//! - Log filter and format

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogFormat;
use crate::permissions::{PermissionPolicy, PermissionThresholds};

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingsError {
    #[error("Invalid OS version: Android settings require an API level > 0")]
    MissingOsVersion,

    #[error("Invalid permission thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

// ============================================================================
// ENUMS
// ============================================================================

/// Target platform, passed in by the host at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Runtime permissions are driven from this layer
    Android,
    /// Consent is obtained by the native SDK; this layer passes through
    Ios,
}

impl Platform {
    /// Whether the native side owns the entire consent flow.
    pub fn is_native_handled(&self) -> bool {
        matches!(self, Self::Ios)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::Android
    }
}

// ============================================================================
// BRIDGE SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeSettings {
    pub platform: Platform,

    /// Android API level (`Build.VERSION.SDK_INT`). Unused on iOS.
    pub os_version: u32,

    pub thresholds: PermissionThresholds,

    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_filter: String,

    pub log_format: LogFormat,
}

impl BridgeSettings {
    pub fn android(os_version: u32) -> Self {
        Self {
            platform: Platform::Android,
            os_version,
            ..Self::default()
        }
    }

    pub fn ios() -> Self {
        Self {
            platform: Platform::Ios,
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, thresholds: PermissionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Parse and validate settings sent by the host as JSON.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.platform.is_native_handled() {
            return Ok(());
        }

        if self.os_version == 0 {
            return Err(SettingsError::MissingOsVersion);
        }

        let t = &self.thresholds;
        if t.runtime_permissions > t.background_location {
            return Err(SettingsError::InvalidThresholds(format!(
                "runtime permissions ({}) introduced after background location ({})",
                t.runtime_permissions, t.background_location
            )));
        }
        if t.background_location > t.independent_background {
            return Err(SettingsError::InvalidThresholds(format!(
                "independent background ({}) precedes background location ({})",
                t.independent_background, t.background_location
            )));
        }

        Ok(())
    }

    pub fn permission_policy(&self) -> PermissionPolicy {
        PermissionPolicy::new(self.os_version, self.thresholds.clone())
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            os_version: 0,
            thresholds: PermissionThresholds::default(),
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
