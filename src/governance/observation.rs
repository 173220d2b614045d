//! Observation Record Model
//!
//! Canonical types for market-observation records and the violations the
//! validators emit against them. An `Observation` is the validated, typed
//! form; untrusted input stays as raw `serde_json::Value` documents and is
//! only ever consumed by the schema validator.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Signal type emitted by a feed. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    PriceObserved,
    VisibilityObserved,
    InventoryProxyObserved,
    InputProxyObserved,
}

impl SignalType {
    pub const ALL: [SignalType; 4] = [
        SignalType::PriceObserved,
        SignalType::VisibilityObserved,
        SignalType::InventoryProxyObserved,
        SignalType::InputProxyObserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::PriceObserved => "price_observed",
            SignalType::VisibilityObserved => "visibility_observed",
            SignalType::InventoryProxyObserved => "inventory_proxy_observed",
            SignalType::InputProxyObserved => "input_proxy_observed",
        }
    }

    /// Whether a raw string names a member of the closed set.
    pub fn is_valid(s: &str) -> bool {
        Self::ALL.iter().any(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single observation. Closed set.
///
/// `inferred` is accepted by the schema but never produced by a feed stub;
/// the control plane forbids inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationStatus {
    Observed,
    Missing,
    Blocked,
    Stale,
    Inferred,
}

impl ObservationStatus {
    pub const ALL: [ObservationStatus; 5] = [
        ObservationStatus::Observed,
        ObservationStatus::Missing,
        ObservationStatus::Blocked,
        ObservationStatus::Stale,
        ObservationStatus::Inferred,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationStatus::Observed => "observed",
            ObservationStatus::Missing => "missing",
            ObservationStatus::Blocked => "blocked",
            ObservationStatus::Stale => "stale",
            ObservationStatus::Inferred => "inferred",
        }
    }

    /// Whether a raw string names a member of the closed set.
    pub fn is_valid(s: &str) -> bool {
        Self::ALL.iter().any(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ObservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure mode of a feed. Closed set, one value per feed at any time.
///
/// The only way a mode changes is an explicit controller call. Feed stubs,
/// validators, and timers never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    Observed,
    Missing,
    Blocked,
    Stale,
}

impl FailureMode {
    pub const ALL: [FailureMode; 4] = [
        FailureMode::Observed,
        FailureMode::Missing,
        FailureMode::Blocked,
        FailureMode::Stale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Observed => "observed",
            FailureMode::Missing => "missing",
            FailureMode::Blocked => "blocked",
            FailureMode::Stale => "stale",
        }
    }

    /// Fail-closed parse: an unrecognized string is `None`, never a default.
    pub fn parse(s: &str) -> Option<FailureMode> {
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FailureMode> for ObservationStatus {
    fn from(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Observed => ObservationStatus::Observed,
            FailureMode::Missing => ObservationStatus::Missing,
            FailureMode::Blocked => ObservationStatus::Blocked,
            FailureMode::Stale => ObservationStatus::Stale,
        }
    }
}

/// Provenance block carried by every observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub collection_method: String,
    pub freshness_class: String,
    pub reliability_class: String,
    /// Present only on degraded observations; explains what was NOT done
    /// (no retry, no inference, no bypass).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_notes: Option<String>,
}

/// A validated observation record.
///
/// Field order matches the canonical document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observation_time: String,
    pub market_object: String,
    pub actor_id: String,
    pub signal_type: SignalType,
    pub signal_value: Option<f64>,
    pub observation_status: ObservationStatus,
    pub provenance: Provenance,
}

impl Observation {
    /// Render as a raw document, the form the schema validator consumes.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Current UTC time in RFC 3339, the default `observation_time`.
pub fn utc_now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A single validation violation.
///
/// `locus` is a record index (`record[3]`) or a file path or a frame id.
/// Violations for one input set form a set, not a sequence: two runs that
/// produce the same violations in different orders are equivalent. `Ord` is
/// derived so a result set can be canonicalized by sorting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub locus: String,
    pub message: String,
}

impl Violation {
    pub fn record(index: usize, message: impl Into<String>) -> Self {
        Self {
            locus: format!("record[{}]", index),
            message: message.into(),
        }
    }

    pub fn frame(frame_id: &str, message: impl Into<String>) -> Self {
        Self {
            locus: frame_id.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.locus, self.message)
    }
}
