//! Native payload normalization
//!
//! Native bridges on two OS ecosystems disagree on payload shape: fields get
//! renamed between SDK versions and partial payloads show up during low-level
//! failures. Every parser here is total. It accepts any `serde_json::Value`,
//! matches it exhaustively and falls back to defaults instead of failing.
//!
//! Field-level helpers take `Option<&Value>` so a missing key and an explicit
//! `null` go through the same path. Event-level parsers take the whole payload.

use serde_json::{Map, Value};

use super::types::{
    BackgroundDetectionEvent, Beacon, BeaconMetadata, BridgeEvent, ErrorEvent, EventTopic,
    Proximity, SyncLifecycleEvent, SyncPhase,
};

// ============================================================================
// PRIMITIVES
// ============================================================================

/// The one numeric coercion rule used for every numeric field.
///
/// Finite numbers pass through. Strings are trimmed and parsed and must come
/// out finite. Everything else maps to `fallback`.
pub fn parse_number(raw: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_)) | None => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(fallback)
}

/// `parse_number`, truncated toward zero.
pub fn parse_integer(raw: Option<&Value>, fallback: i64) -> i64 {
    parse_number(raw, fallback as f64).trunc() as i64
}

/// Case-insensitive match against the known buckets; `Unknown` otherwise.
///
/// Shared by beacon parsing and every other proximity-bearing payload.
pub fn parse_proximity(raw: Option<&Value>) -> Proximity {
    match raw {
        Some(Value::String(s)) => parse_proximity_str(s),
        Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_))
        | None => Proximity::Unknown,
    }
}

pub fn parse_proximity_str(raw: &str) -> Proximity {
    match raw.trim().to_ascii_lowercase().as_str() {
        "immediate" => Proximity::Immediate,
        "near" => Proximity::Near,
        "far" => Proximity::Far,
        "bt-only" | "bt_only" | "btonly" => Proximity::BtOnly,
        _ => Proximity::Unknown,
    }
}

/// Strings and numbers as text; `None` for anything else.
fn parse_text(raw: Option<&Value>) -> Option<String> {
    match raw {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_)) | None => None,
    }
}

/// Booleans, `"true"`/`"false"` in any case, and numbers (non-zero is true).
fn parse_bool(raw: Option<&Value>) -> Option<bool> {
    match raw {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => None,
    }
}

/// The `timestamp` field, falling back to `fallback`.
fn parse_timestamp(fields: &Map<String, Value>, fallback: i64) -> i64 {
    parse_integer(fields.get("timestamp"), fallback)
}

// ============================================================================
// BEACONS
// ============================================================================

/// Absent for null, primitives and arrays. Optional fields are `Some` exactly
/// when their key exists, even if the value is falsy.
pub fn parse_metadata(raw: Option<&Value>) -> Option<BeaconMetadata> {
    match raw {
        Some(Value::Object(fields)) => Some(BeaconMetadata {
            firmware_version: parse_text(fields.get("firmwareVersion")).unwrap_or_default(),
            battery_level: parse_integer(fields.get("batteryLevel"), 0),
            movements: parse_integer(fields.get("movements"), 0),
            temperature: parse_number(fields.get("temperature"), 0.0),
            tx_power: fields.get("txPower").map(|v| parse_integer(Some(v), 0)),
            rssi_from_ble: fields.get("rssiFromBLE").map(|v| parse_integer(Some(v), 0)),
            is_connectable: fields
                .get("isConnectable")
                .map(|v| parse_bool(Some(v)).unwrap_or(false)),
        }),
        Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_))
        | None => None,
    }
}

/// Best effort: a non-object element still yields a fully defaulted beacon.
pub fn parse_beacon(raw: &Value) -> Beacon {
    let empty = Map::new();
    let fields = match raw {
        Value::Object(fields) => fields,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            tracing::debug!("Beacon entry is not an object, defaulting: {}", raw);
            &empty
        }
    };

    Beacon {
        uuid: parse_text(fields.get("uuid")).unwrap_or_default(),
        major: parse_integer(fields.get("major"), 0),
        minor: parse_integer(fields.get("minor"), 0),
        rssi: parse_integer(fields.get("rssi"), 0),
        proximity: parse_proximity(fields.get("proximity")),
        accuracy: parse_number(fields.get("accuracy"), 0.0),
        timestamp: parse_timestamp(fields, 0),
        metadata: parse_metadata(fields.get("metadata")),
    }
}

/// A bare list or `{"beacons": [...]}`. Any other shape is an empty batch.
pub fn parse_beacon_batch(raw: &Value) -> Vec<Beacon> {
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(fields) => match fields.get("beacons") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => &[],
    };

    items.iter().map(parse_beacon).collect()
}

fn closest_proximity(beacons: &[Beacon]) -> Proximity {
    beacons
        .iter()
        .map(|b| b.proximity)
        .min_by_key(Proximity::rank)
        .unwrap_or_default()
}

fn latest_timestamp(beacons: &[Beacon]) -> i64 {
    beacons.iter().map(|b| b.timestamp).max().unwrap_or(0)
}

// ============================================================================
// LIFECYCLE EVENTS
// ============================================================================

fn parse_sync_phase(raw: Option<&Value>) -> SyncPhase {
    let Some(text) = parse_text(raw) else {
        return SyncPhase::Unknown;
    };
    match text.trim().to_ascii_lowercase().as_str() {
        "started" | "start" => SyncPhase::Started,
        "completed" | "complete" | "success" => SyncPhase::Completed,
        "failed" | "failure" | "error" => SyncPhase::Failed,
        _ => SyncPhase::Unknown,
    }
}

/// Record form, or a bare phase string.
pub fn parse_sync_lifecycle(raw: &Value) -> SyncLifecycleEvent {
    match raw {
        Value::String(_) => SyncLifecycleEvent {
            phase: parse_sync_phase(Some(raw)),
            ..Default::default()
        },
        Value::Object(fields) => SyncLifecycleEvent {
            phase: parse_sync_phase(fields.get("phase").or_else(|| fields.get("status"))),
            queued_payloads: parse_integer(fields.get("queuedPayloads"), 0),
            sent_payloads: parse_integer(fields.get("sentPayloads"), 0),
            message: parse_text(fields.get("message")),
            timestamp: parse_timestamp(fields, 0),
        },
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => {
            SyncLifecycleEvent::default()
        }
    }
}

/// Record form, a bare count, or a bare beacon list.
pub fn parse_background_detection(raw: &Value) -> BackgroundDetectionEvent {
    match raw {
        Value::Number(_) | Value::String(_) => BackgroundDetectionEvent {
            beacon_count: parse_integer(Some(raw), 0),
            ..Default::default()
        },
        Value::Array(_) => {
            let beacons = parse_beacon_batch(raw);
            BackgroundDetectionEvent {
                beacon_count: beacons.len() as i64,
                closest_proximity: closest_proximity(&beacons),
                timestamp: latest_timestamp(&beacons),
            }
        }
        Value::Object(fields) => {
            let beacons = parse_beacon_batch(raw);
            let proximity = fields
                .get("closestProximity")
                .or_else(|| fields.get("proximity"));
            BackgroundDetectionEvent {
                beacon_count: parse_integer(
                    fields.get("beaconCount").or_else(|| fields.get("count")),
                    beacons.len() as i64,
                ),
                closest_proximity: match proximity {
                    Some(_) => parse_proximity(proximity),
                    None => closest_proximity(&beacons),
                },
                timestamp: parse_timestamp(fields, latest_timestamp(&beacons)),
            }
        }
        Value::Null | Value::Bool(_) => BackgroundDetectionEvent::default(),
    }
}

/// A bare boolean, `{isScanning}` / `{scanning}`, or a boolean-like string.
pub fn parse_scanning_state(raw: &Value) -> bool {
    match raw {
        Value::Bool(scanning) => *scanning,
        Value::Object(fields) => {
            parse_bool(fields.get("isScanning").or_else(|| fields.get("scanning")))
                .unwrap_or(false)
        }
        Value::String(_) | Value::Number(_) => parse_bool(Some(raw)).unwrap_or(false),
        Value::Null | Value::Array(_) => false,
    }
}

/// Record form, or a bare message string.
pub fn parse_error(raw: &Value) -> ErrorEvent {
    let non_blank = |text: Option<String>| text.filter(|t| !t.trim().is_empty());

    match raw {
        Value::String(message) => ErrorEvent {
            message: non_blank(Some(message.clone()))
                .unwrap_or_else(|| ErrorEvent::UNKNOWN_MESSAGE.to_string()),
            ..Default::default()
        },
        Value::Object(fields) => {
            let defaults = ErrorEvent::default();
            ErrorEvent {
                code: non_blank(parse_text(fields.get("code"))).unwrap_or(defaults.code),
                message: non_blank(parse_text(
                    fields.get("message").or_else(|| fields.get("error")),
                ))
                .unwrap_or(defaults.message),
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => ErrorEvent::default(),
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

pub fn parse_event(topic: EventTopic, raw: &Value) -> BridgeEvent {
    match topic {
        EventTopic::BeaconsDetected => BridgeEvent::Beacons(parse_beacon_batch(raw)),
        EventTopic::SyncLifecycle => BridgeEvent::SyncLifecycle(parse_sync_lifecycle(raw)),
        EventTopic::BackgroundDetection => {
            BridgeEvent::BackgroundDetection(parse_background_detection(raw))
        }
        EventTopic::ScanningStateChanged => BridgeEvent::ScanningState(parse_scanning_state(raw)),
        EventTopic::Error => BridgeEvent::Error(parse_error(raw)),
    }
}

/// Decode a raw JSON string from the native side. Invalid JSON is `Null`.
pub fn parse_payload_str(payload: &str) -> Value {
    serde_json::from_str(payload).unwrap_or_else(|e| {
        tracing::debug!("Payload is not valid JSON ({}), treating as null", e);
        Value::Null
    })
}

// ============================================================================
// TESTS
// ============================================================================
