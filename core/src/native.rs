// Boundary contract with the vendor SDK
//
// The host implements this trait over the platform glue (Kotlin/Swift). The
// bridge calls exactly these methods and nothing else.

use async_trait::async_trait;

use crate::config::{ConfigureRequest, UserProperties};
use crate::error::NativeError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NativeBeaconModule: Send + Sync {
    /// Must succeed before `start_scanning`.
    async fn configure(&self, request: ConfigureRequest) -> Result<(), NativeError>;

    async fn start_scanning(&self) -> Result<(), NativeError>;

    /// Idempotent on the native side.
    async fn stop_scanning(&self) -> Result<(), NativeError>;

    async fn is_scanning(&self) -> Result<bool, NativeError>;

    async fn set_user_properties(&self, properties: UserProperties) -> Result<(), NativeError>;

    async fn clear_user_properties(&self) -> Result<(), NativeError>;

    /// iOS only: every sub-permission collapsed into one flag.
    async fn check_permissions(&self) -> Result<bool, NativeError>;

    /// iOS only: runs the SDK's own consent flow.
    async fn request_permissions(&self) -> Result<bool, NativeError>;
}
