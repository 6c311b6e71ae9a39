// beacon-bridge-mobile: native mobile bindings for iOS and Android
// This crate exports the Beacon Bridge Core API via UniFFI

pub use beacon_bridge_core::*;
