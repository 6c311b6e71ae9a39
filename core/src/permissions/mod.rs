//! Permission orchestration
//!
//! Answers "can the detection engine legally run right now" across Android
//! API levels, and drives the interactive consent flow when it cannot.

pub mod backend;
pub mod orchestrator;
pub mod policy;
pub mod status;

pub use backend::{Permission, PermissionBackend, PermissionError, RequestOutcome};
pub use orchestrator::{
    orchestrator_for, EnsureOptions, PassThroughPermissions, PermissionOrchestrator,
    RuntimePermissions,
};
pub use policy::{PermissionPolicy, PermissionThresholds};
pub use status::PermissionStatus;
