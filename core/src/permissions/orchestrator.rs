//! Permission orchestration strategies
//!
//! Two implementations behind one trait, picked once at startup:
//! - `RuntimePermissions` sequences Android runtime prompts by API level
//! - `PassThroughPermissions` reports everything granted on iOS, where the
//!   native SDK has already obtained consent through its own flow

use std::sync::Arc;

use async_trait::async_trait;

use super::backend::{Permission, PermissionBackend, RequestOutcome};
use super::policy::PermissionPolicy;
use super::status::PermissionStatus;
use crate::settings::Platform;

/// Options for `PermissionOrchestrator::ensure_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsureOptions {
    pub ask_background: bool,
}

impl Default for EnsureOptions {
    fn default() -> Self {
        Self {
            ask_background: true,
        }
    }
}

/// None of these operations fail. OS errors degrade to "denied" for the
/// affected permission only.
#[async_trait]
pub trait PermissionOrchestrator: Send + Sync {
    /// Read-only snapshot; never prompts.
    async fn check_status(&self) -> PermissionStatus;

    /// Prompt for foreground permissions one dialog at a time, then merge with
    /// the pre-call snapshot so nothing regresses from granted to denied.
    async fn request_foreground(&self) -> PermissionStatus;

    async fn request_background(&self) -> bool;

    async fn ensure_all(&self, options: EnsureOptions) -> PermissionStatus {
        self.request_foreground().await;
        if options.ask_background {
            self.request_background().await;
        }
        self.check_status().await
    }
}

/// Select the strategy for `platform`.
pub fn orchestrator_for(
    platform: Platform,
    backend: Arc<dyn PermissionBackend>,
    policy: PermissionPolicy,
) -> Arc<dyn PermissionOrchestrator> {
    match platform {
        Platform::Android => Arc::new(RuntimePermissions::new(backend, policy)),
        Platform::Ios => Arc::new(PassThroughPermissions),
    }
}

// ============================================================================
// ANDROID
// ============================================================================

pub struct RuntimePermissions {
    backend: Arc<dyn PermissionBackend>,
    policy: PermissionPolicy,
}

impl RuntimePermissions {
    pub fn new(backend: Arc<dyn PermissionBackend>, policy: PermissionPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    async fn read(&self, permission: Permission) -> bool {
        if !self.policy.requires_prompt(permission) {
            return true;
        }

        match self.backend.check(permission).await {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!("Treating {} as denied: {}", permission, e);
                false
            }
        }
    }

    async fn prompt(&self, permission: Permission) -> bool {
        if !self.policy.requires_prompt(permission) {
            tracing::debug!(
                "Skipping {} prompt on API {}",
                permission,
                self.policy.os_version()
            );
            return true;
        }

        if self.read(permission).await {
            return true;
        }

        match self.backend.request(permission).await {
            Ok(outcome) => {
                tracing::debug!("{} request resolved: {:?}", permission, outcome);
                outcome.is_granted()
            }
            Err(e) => {
                tracing::warn!("Request for {} failed: {}", permission, e);
                false
            }
        }
    }
}

#[async_trait]
impl PermissionOrchestrator for RuntimePermissions {
    async fn check_status(&self) -> PermissionStatus {
        if !self.backend.is_available() {
            return PermissionStatus::all_granted();
        }

        let fine_or_coarse_location =
            self.read(Permission::FineLocation).await || self.read(Permission::CoarseLocation).await;

        PermissionStatus {
            fine_or_coarse_location,
            bluetooth_scan: self.read(Permission::BluetoothScan).await,
            bluetooth_connect: self.read(Permission::BluetoothConnect).await,
            notifications: self.read(Permission::PostNotifications).await,
            background_location: self.read(Permission::BackgroundLocation).await,
        }
    }

    async fn request_foreground(&self) -> PermissionStatus {
        let before = self.check_status().await;
        if !self.backend.is_available() {
            return before;
        }

        // Coarse is only asked for when fine was refused.
        let fine_or_coarse_location = self.prompt(Permission::FineLocation).await
            || self.prompt(Permission::CoarseLocation).await;
        let bluetooth_scan = self.prompt(Permission::BluetoothScan).await;
        let bluetooth_connect = self.prompt(Permission::BluetoothConnect).await;
        let notifications = self.prompt(Permission::PostNotifications).await;

        let fresh = PermissionStatus {
            fine_or_coarse_location,
            bluetooth_scan,
            bluetooth_connect,
            notifications,
            background_location: false,
        };

        let merged = before.merge(fresh);
        tracing::info!("Foreground permissions: {:?}", merged);
        merged
    }

    async fn request_background(&self) -> bool {
        if !self.backend.is_available() {
            return true;
        }

        let fine = self.read(Permission::FineLocation).await;
        if !fine && !self.policy.allows_independent_background() {
            tracing::debug!(
                "Background location needs fine location first on API {}",
                self.policy.os_version()
            );
            return false;
        }

        if !self.policy.requires_prompt(Permission::BackgroundLocation) {
            return true;
        }
        if self.read(Permission::BackgroundLocation).await {
            return true;
        }

        match self.backend.request(Permission::BackgroundLocation).await {
            Ok(RequestOutcome::Blocked) => {
                tracing::info!("Background location blocked; opening app settings");
                if let Err(e) = self.backend.open_settings().await {
                    tracing::warn!("{}", e);
                }
                false
            }
            Ok(outcome) => outcome.is_granted(),
            Err(e) => {
                tracing::warn!("Background location request failed: {}", e);
                false
            }
        }
    }
}

// ============================================================================
// IOS
// ============================================================================

/// Consent lives entirely in the native SDK on iOS. Callers must have run that
/// flow before using the bridge; nothing here checks the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughPermissions;

#[async_trait]
impl PermissionOrchestrator for PassThroughPermissions {
    async fn check_status(&self) -> PermissionStatus {
        PermissionStatus::all_granted()
    }

    async fn request_foreground(&self) -> PermissionStatus {
        PermissionStatus::all_granted()
    }

    async fn request_background(&self) -> bool {
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::backend::PermissionError;
    use crate::permissions::policy::PermissionThresholds;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Check(Permission),
        Request(Permission),
        OpenSettings,
    }

    #[derive(Default)]
    struct FakeBackend {
        unavailable: bool,
        granted: Mutex<HashSet<Permission>>,
        outcomes: HashMap<Permission, RequestOutcome>,
        failing: HashSet<Permission>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeBackend {
        fn granting(permissions: &[Permission]) -> Self {
            Self {
                granted: Mutex::new(permissions.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn with_outcome(mut self, permission: Permission, outcome: RequestOutcome) -> Self {
            self.outcomes.insert(permission, outcome);
            self
        }

        fn requests(&self) -> Vec<Permission> {
            self.calls
                .lock()
                .iter()
                .filter_map(|c| match c {
                    Call::Request(p) => Some(*p),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl PermissionBackend for FakeBackend {
        fn is_available(&self) -> bool {
            !self.unavailable
        }

        async fn check(&self, permission: Permission) -> Result<bool, PermissionError> {
            self.calls.lock().push(Call::Check(permission));
            if self.failing.contains(&permission) {
                return Err(PermissionError::CheckFailed {
                    permission,
                    reason: "binder died".into(),
                });
            }
            Ok(self.granted.lock().contains(&permission))
        }

        async fn request(&self, permission: Permission) -> Result<RequestOutcome, PermissionError> {
            self.calls.lock().push(Call::Request(permission));
            let outcome = self
                .outcomes
                .get(&permission)
                .copied()
                .unwrap_or(RequestOutcome::Denied);
            if outcome == RequestOutcome::Granted {
                self.granted.lock().insert(permission);
            }
            Ok(outcome)
        }

        async fn open_settings(&self) -> Result<(), PermissionError> {
            self.calls.lock().push(Call::OpenSettings);
            Ok(())
        }
    }

    fn android(backend: &Arc<FakeBackend>, os_version: u32) -> RuntimePermissions {
        RuntimePermissions::new(
            backend.clone(),
            PermissionPolicy::new(os_version, PermissionThresholds::default()),
        )
    }

    #[tokio::test]
    async fn test_ios_passes_through_without_touching_backend() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator_for(
            Platform::Ios,
            backend.clone(),
            PermissionPolicy::new(0, PermissionThresholds::default()),
        );

        assert_eq!(orchestrator.check_status().await, PermissionStatus::all_granted());
        assert_eq!(
            orchestrator.request_foreground().await,
            PermissionStatus::all_granted()
        );
        assert!(orchestrator.request_background().await);
        assert_eq!(
            orchestrator.ensure_all(EnsureOptions::default()).await,
            PermissionStatus::all_granted()
        );
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend_reads_all_granted() {
        let backend = Arc::new(FakeBackend {
            unavailable: true,
            ..Default::default()
        });
        let orchestrator = android(&backend, 34);

        assert_eq!(orchestrator.check_status().await, PermissionStatus::all_granted());
        assert!(orchestrator.request_background().await);
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_check_failure_only_affects_that_permission() {
        let backend = Arc::new(FakeBackend {
            failing: [Permission::BluetoothScan].into_iter().collect(),
            ..FakeBackend::granting(&[
                Permission::FineLocation,
                Permission::BluetoothScan,
                Permission::BluetoothConnect,
                Permission::PostNotifications,
                Permission::BackgroundLocation,
            ])
        });
        let status = android(&backend, 34).check_status().await;

        assert!(!status.bluetooth_scan);
        assert!(status.fine_or_coarse_location);
        assert!(status.bluetooth_connect);
        assert!(status.notifications);
        assert!(status.background_location);
    }

    #[tokio::test]
    async fn test_coarse_location_counts_as_location() {
        let backend = Arc::new(FakeBackend::granting(&[Permission::CoarseLocation]));
        let status = android(&backend, 34).check_status().await;
        assert!(status.fine_or_coarse_location);
    }

    #[tokio::test]
    async fn test_check_below_thresholds_is_granted() {
        let backend = Arc::new(FakeBackend::granting(&[Permission::FineLocation]));
        let status = android(&backend, 28).check_status().await;

        assert!(status.is_fully_granted());
        assert!(!backend
            .calls
            .lock()
            .contains(&Call::Check(Permission::BluetoothScan)));
    }

    #[tokio::test]
    async fn test_foreground_prompt_order_with_coarse_fallback() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_outcome(Permission::CoarseLocation, RequestOutcome::Granted)
                .with_outcome(Permission::BluetoothScan, RequestOutcome::Granted)
                .with_outcome(Permission::BluetoothConnect, RequestOutcome::Granted)
                .with_outcome(Permission::PostNotifications, RequestOutcome::Denied),
        );
        let status = android(&backend, 33).request_foreground().await;

        assert_eq!(
            backend.requests(),
            vec![
                Permission::FineLocation,
                Permission::CoarseLocation,
                Permission::BluetoothScan,
                Permission::BluetoothConnect,
                Permission::PostNotifications,
            ]
        );
        assert!(status.fine_or_coarse_location);
        assert!(status.bluetooth_scan);
        assert!(status.bluetooth_connect);
        assert!(!status.notifications);
        assert!(!status.background_location);
    }

    #[tokio::test]
    async fn test_fine_granted_skips_coarse() {
        let backend = Arc::new(
            FakeBackend::default().with_outcome(Permission::FineLocation, RequestOutcome::Granted),
        );
        android(&backend, 33).request_foreground().await;

        let requests = backend.requests();
        assert_eq!(requests[0], Permission::FineLocation);
        assert!(!requests.contains(&Permission::CoarseLocation));
    }

    #[tokio::test]
    async fn test_prompts_skipped_below_introduction() {
        let backend = Arc::new(
            FakeBackend::default().with_outcome(Permission::FineLocation, RequestOutcome::Granted),
        );
        let status = android(&backend, 30).request_foreground().await;

        assert_eq!(backend.requests(), vec![Permission::FineLocation]);
        assert!(status.bluetooth_scan);
        assert!(status.bluetooth_connect);
        assert!(status.notifications);
    }

    #[tokio::test]
    async fn test_already_granted_not_prompted_again() {
        let backend = Arc::new(FakeBackend::granting(&[
            Permission::FineLocation,
            Permission::PostNotifications,
        ]));
        let status = android(&backend, 34).request_foreground().await;

        assert_eq!(
            backend.requests(),
            vec![Permission::BluetoothScan, Permission::BluetoothConnect]
        );
        assert!(status.fine_or_coarse_location);
        assert!(status.notifications);
    }

    #[tokio::test]
    async fn test_blocked_foreground_is_denied_without_settings() {
        let backend = Arc::new(
            FakeBackend::default().with_outcome(Permission::BluetoothScan, RequestOutcome::Blocked),
        );
        let status = android(&backend, 34).request_foreground().await;

        assert!(!status.bluetooth_scan);
        assert!(!backend.calls.lock().contains(&Call::OpenSettings));
    }

    #[tokio::test]
    async fn test_background_gated_on_fine_location() {
        for os_version in [24, 28, 29] {
            let backend = Arc::new(FakeBackend::default());
            let granted = android(&backend, os_version).request_background().await;

            assert!(!granted, "API {os_version}");
            assert!(backend.requests().is_empty(), "API {os_version}");
            assert!(!backend.calls.lock().contains(&Call::OpenSettings));
        }
    }

    #[tokio::test]
    async fn test_background_independent_on_newer_os() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_outcome(Permission::BackgroundLocation, RequestOutcome::Granted),
        );
        assert!(android(&backend, 30).request_background().await);
        assert_eq!(backend.requests(), vec![Permission::BackgroundLocation]);
    }

    #[tokio::test]
    async fn test_background_implicit_before_android_10() {
        let backend = Arc::new(FakeBackend::granting(&[Permission::FineLocation]));
        assert!(android(&backend, 28).request_background().await);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_background_blocked_opens_settings() {
        let backend = Arc::new(
            FakeBackend::granting(&[Permission::FineLocation])
                .with_outcome(Permission::BackgroundLocation, RequestOutcome::Blocked),
        );
        let granted = android(&backend, 31).request_background().await;

        assert!(!granted);
        let settings_calls = backend
            .calls
            .lock()
            .iter()
            .filter(|c| **c == Call::OpenSettings)
            .count();
        assert_eq!(settings_calls, 1);
    }

    #[tokio::test]
    async fn test_ensure_all_respects_ask_background() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_outcome(Permission::FineLocation, RequestOutcome::Granted)
                .with_outcome(Permission::BackgroundLocation, RequestOutcome::Granted),
        );
        let orchestrator = android(&backend, 34);

        let status = orchestrator
            .ensure_all(EnsureOptions {
                ask_background: false,
            })
            .await;
        assert!(!backend.requests().contains(&Permission::BackgroundLocation));
        assert!(!status.background_location);

        let status = orchestrator.ensure_all(EnsureOptions::default()).await;
        assert!(backend.requests().contains(&Permission::BackgroundLocation));
        assert!(status.background_location);
        assert!(status.fine_or_coarse_location);
    }
}
