//! Error types for the bridge
//!
//! Configuration-time problems are loud: they come back as `BridgeError` before
//! anything reaches the native layer. Native rejections are passed through
//! verbatim as `NativeError`. Malformed event payloads never produce an error
//! at all (see `events::normalize`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::SettingsError;

// ============================================================================
// NATIVE ERRORS
// ============================================================================

/// A rejection reported by the native SDK module.
///
/// The bridge never rewrites these; callers see exactly what the vendor SDK
/// reported.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct NativeError {
    pub code: String,
    pub message: String,
}

impl NativeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// BRIDGE ERRORS
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Business token required: value must be non-empty after trimming")]
    BusinessTokenRequired,

    #[error("Invalid foreground scan interval: {0}s is not a supported value")]
    InvalidForegroundScanInterval(u32),

    #[error("Invalid background scan interval: {0}s is not a supported value")]
    InvalidBackgroundScanInterval(u32),

    #[error("Invalid max queued payloads: {0} is not a supported value")]
    InvalidMaxQueuedPayloads(u32),

    #[error("Invalid user property: {0}")]
    InvalidUserProperty(String),

    #[error("SDK not configured: call configure() before starting to scan")]
    NotConfigured,

    #[error("Unsupported operation on this platform: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Native(#[from] NativeError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Raised by this layer before any native call was attempted.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::BusinessTokenRequired
                | Self::InvalidForegroundScanInterval(_)
                | Self::InvalidBackgroundScanInterval(_)
                | Self::InvalidMaxQueuedPayloads(_)
                | Self::InvalidUserProperty(_)
                | Self::NotConfigured
                | Self::Settings(_)
        )
    }

    pub fn is_native_error(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// Machine-readable code for hosts that surface errors to JS/Kotlin/Swift.
    ///
    /// Native errors keep the vendor's own code.
    pub fn error_code(&self) -> &str {
        match self {
            Self::BusinessTokenRequired => "BUSINESS_TOKEN_REQUIRED",
            Self::InvalidForegroundScanInterval(_) => "INVALID_FOREGROUND_SCAN_INTERVAL",
            Self::InvalidBackgroundScanInterval(_) => "INVALID_BACKGROUND_SCAN_INTERVAL",
            Self::InvalidMaxQueuedPayloads(_) => "INVALID_MAX_QUEUED_PAYLOADS",
            Self::InvalidUserProperty(_) => "INVALID_USER_PROPERTY",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Self::Settings(_) => "INVALID_SETTINGS",
            Self::Native(err) => &err.code,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
