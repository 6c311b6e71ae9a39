//! The bridge facade
//!
//! `BeaconBridge` is what the host app talks to. Configuration is validated
//! here before anything reaches the native module; native rejections come back
//! unchanged. Native events enter through `handle_native_event`, are
//! normalized, and are delivered to listeners on the shared `EventEmitter`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::config::{SdkConfig, UserProperties};
use crate::error::{BridgeError, Result};
use crate::events::{normalize, EventEmitter, EventTopic};
use crate::logging;
use crate::native::NativeBeaconModule;
use crate::permissions::{orchestrator_for, PermissionBackend, PermissionOrchestrator, PermissionStatus};
use crate::settings::{BridgeSettings, Platform};

pub struct BeaconBridge {
    settings: BridgeSettings,
    module: Arc<dyn NativeBeaconModule>,
    permissions: Arc<dyn PermissionOrchestrator>,
    events: EventEmitter,
    configured: AtomicBool,
}

impl BeaconBridge {
    /// Validate settings and pick the permission strategy for the platform.
    /// The choice is fixed for the lifetime of the bridge.
    pub fn new(
        settings: BridgeSettings,
        module: Arc<dyn NativeBeaconModule>,
        permission_backend: Arc<dyn PermissionBackend>,
    ) -> Result<Self> {
        settings.validate()?;
        logging::init(&settings.log_filter, settings.log_format);

        let permissions = orchestrator_for(
            settings.platform,
            permission_backend,
            settings.permission_policy(),
        );

        tracing::info!(
            "BeaconBridge created for {} (os version {})",
            settings.platform,
            settings.os_version
        );

        Ok(Self {
            settings,
            module,
            permissions,
            events: EventEmitter::new(),
            configured: AtomicBool::new(false),
        })
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn platform(&self) -> Platform {
        self.settings.platform
    }

    pub fn permissions(&self) -> &dyn PermissionOrchestrator {
        self.permissions.as_ref()
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------------
    // Native calls
    // ------------------------------------------------------------------------

    pub async fn configure(&self, config: &SdkConfig) -> Result<()> {
        let request = config.to_request()?;

        tracing::info!(
            "Configuring SDK (fg {}s, bg {}s, queue {})",
            request.foreground_scan_interval,
            request.background_scan_interval,
            request.max_queued_payloads
        );
        self.module.configure(request).await?;

        self.configured.store(true, Ordering::Release);
        Ok(())
    }

    pub async fn start_scanning(&self) -> Result<()> {
        if !self.is_configured() {
            return Err(BridgeError::NotConfigured);
        }

        self.module.start_scanning().await?;
        tracing::info!("Scanning started");
        Ok(())
    }

    pub async fn stop_scanning(&self) -> Result<()> {
        self.module.stop_scanning().await?;
        tracing::info!("Scanning stopped");
        Ok(())
    }

    pub async fn is_scanning(&self) -> Result<bool> {
        Ok(self.module.is_scanning().await?)
    }

    pub async fn set_user_properties(&self, properties: UserProperties) -> Result<()> {
        properties.validate()?;
        self.module.set_user_properties(properties).await?;
        Ok(())
    }

    pub async fn clear_user_properties(&self) -> Result<()> {
        self.module.clear_user_properties().await?;
        Ok(())
    }

    /// iOS only. The SDK reports one flag, broadcast to every field.
    pub async fn native_permission_status(&self) -> Result<PermissionStatus> {
        self.require_native_handled("check_permissions")?;
        let granted = self.module.check_permissions().await?;
        Ok(PermissionStatus::uniform(granted))
    }

    /// iOS only. Runs the SDK's own consent flow.
    pub async fn request_native_permissions(&self) -> Result<PermissionStatus> {
        self.require_native_handled("request_permissions")?;
        let granted = self.module.request_permissions().await?;
        Ok(PermissionStatus::uniform(granted))
    }

    fn require_native_handled(&self, operation: &str) -> Result<()> {
        if self.settings.platform.is_native_handled() {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedOperation(format!(
                "{} is only available on ios; use permissions() on {}",
                operation, self.settings.platform
            )))
        }
    }

    // ------------------------------------------------------------------------
    // Native events
    // ------------------------------------------------------------------------

    /// Normalize one native event and deliver it. Returns false for a topic
    /// this bridge does not know; malformed payloads are still delivered with
    /// defaulted fields.
    pub fn handle_native_event(&self, topic: &str, payload: &Value) -> bool {
        let Some(topic) = EventTopic::from_name(topic) else {
            tracing::warn!("Dropping event on unknown topic '{}'", topic);
            return false;
        };

        let event = normalize::parse_event(topic, payload);
        let delivered = self.events.emit(&event);
        tracing::trace!("{} delivered to {} listener(s)", topic, delivered);
        true
    }

    pub fn handle_native_event_json(&self, topic: &str, payload: &str) -> bool {
        self.handle_native_event(topic, &normalize::parse_payload_str(payload))
    }
}

// ============================================================================
// TESTS
// ============================================================================
