//! SDK configuration forwarded to the native module
//!
//! Intervals and queue sizes are bounded enumerations; the native side only
//! understands these exact integers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

// ============================================================================
// ENUMS
// ============================================================================

/// Foreground ranging interval, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ForegroundScanInterval {
    Short,
    #[default]
    Medium,
    Long,
}

impl ForegroundScanInterval {
    pub fn seconds(self) -> u32 {
        match self {
            Self::Short => 2,
            Self::Medium => 5,
            Self::Long => 10,
        }
    }
}

impl TryFrom<u32> for ForegroundScanInterval {
    type Error = BridgeError;

    fn try_from(seconds: u32) -> Result<Self> {
        match seconds {
            2 => Ok(Self::Short),
            5 => Ok(Self::Medium),
            10 => Ok(Self::Long),
            other => Err(BridgeError::InvalidForegroundScanInterval(other)),
        }
    }
}

impl From<ForegroundScanInterval> for u32 {
    fn from(interval: ForegroundScanInterval) -> Self {
        interval.seconds()
    }
}

/// Background ranging interval, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BackgroundScanInterval {
    Short,
    #[default]
    Medium,
    Long,
}

impl BackgroundScanInterval {
    pub fn seconds(self) -> u32 {
        match self {
            Self::Short => 30,
            Self::Medium => 60,
            Self::Long => 300,
        }
    }
}

impl TryFrom<u32> for BackgroundScanInterval {
    type Error = BridgeError;

    fn try_from(seconds: u32) -> Result<Self> {
        match seconds {
            30 => Ok(Self::Short),
            60 => Ok(Self::Medium),
            300 => Ok(Self::Long),
            other => Err(BridgeError::InvalidBackgroundScanInterval(other)),
        }
    }
}

impl From<BackgroundScanInterval> for u32 {
    fn from(interval: BackgroundScanInterval) -> Self {
        interval.seconds()
    }
}

/// Upper bound on detection payloads the SDK holds while offline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MaxQueuedPayloads {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl MaxQueuedPayloads {
    pub fn count(self) -> u32 {
        match self {
            Self::Small => 50,
            Self::Medium => 100,
            Self::Large => 250,
            Self::ExtraLarge => 500,
        }
    }
}

impl TryFrom<u32> for MaxQueuedPayloads {
    type Error = BridgeError;

    fn try_from(count: u32) -> Result<Self> {
        match count {
            50 => Ok(Self::Small),
            100 => Ok(Self::Medium),
            250 => Ok(Self::Large),
            500 => Ok(Self::ExtraLarge),
            other => Err(BridgeError::InvalidMaxQueuedPayloads(other)),
        }
    }
}

impl From<MaxQueuedPayloads> for u32 {
    fn from(max: MaxQueuedPayloads) -> Self {
        max.count()
    }
}

// ============================================================================
// SDK CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    pub business_token: String,
    #[serde(default)]
    pub foreground_scan_interval: ForegroundScanInterval,
    #[serde(default)]
    pub background_scan_interval: BackgroundScanInterval,
    #[serde(default)]
    pub max_queued_payloads: MaxQueuedPayloads,
}

impl SdkConfig {
    pub fn new(business_token: impl Into<String>) -> Self {
        Self {
            business_token: business_token.into(),
            ..Default::default()
        }
    }

    pub fn with_foreground_scan_interval(mut self, interval: ForegroundScanInterval) -> Self {
        self.foreground_scan_interval = interval;
        self
    }

    pub fn with_background_scan_interval(mut self, interval: BackgroundScanInterval) -> Self {
        self.background_scan_interval = interval;
        self
    }

    pub fn with_max_queued_payloads(mut self, max: MaxQueuedPayloads) -> Self {
        self.max_queued_payloads = max;
        self
    }

    /// Build from the raw integers a host UI hands over.
    pub fn from_raw(
        business_token: impl Into<String>,
        foreground_scan_interval: u32,
        background_scan_interval: u32,
        max_queued_payloads: u32,
    ) -> Result<Self> {
        Ok(Self {
            business_token: business_token.into(),
            foreground_scan_interval: foreground_scan_interval.try_into()?,
            background_scan_interval: background_scan_interval.try_into()?,
            max_queued_payloads: max_queued_payloads.try_into()?,
        })
    }

    /// Validate and produce the exact call the native module receives.
    pub fn to_request(&self) -> Result<ConfigureRequest> {
        let token = self.business_token.trim();
        if token.is_empty() {
            return Err(BridgeError::BusinessTokenRequired);
        }

        Ok(ConfigureRequest {
            business_token: token.to_string(),
            foreground_scan_interval: self.foreground_scan_interval.seconds(),
            background_scan_interval: self.background_scan_interval.seconds(),
            max_queued_payloads: self.max_queued_payloads.count(),
        })
    }
}

/// Validated arguments for `NativeBeaconModule::configure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    pub business_token: String,
    pub foreground_scan_interval: u32,
    pub background_scan_interval: u32,
    pub max_queued_payloads: u32,
}

// ============================================================================
// USER PROPERTIES
// ============================================================================

/// Free-form attributes the SDK attaches to uploaded detections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProperties(BTreeMap<String, String>);

impl UserProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.keys().any(|key| key.trim().is_empty()) {
            return Err(BridgeError::InvalidUserProperty(
                "property keys must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
