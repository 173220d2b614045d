//! Feed Stub Adapters
//!
//! Each stub renders a schema-compliant observation purely from its current
//! failure mode and the call arguments. No real data source is ever
//! consulted; every value is synthetic and deterministic given the mode.
//! The per-mode rendering rules are a documented contract that downstream
//! consumers test against, down to the exact provenance strings.
//!
//! The mode is pushed by the controller; the stub itself never changes it.
//! No retries, no auto-recovery, no inference.

use crate::governance::observation::{
    utc_now_rfc3339, FailureMode, Observation, Provenance, SignalType,
};

/// Marker prefixed to every synthetic provenance value.
pub const STUB_MARKER: &str = "[STUB_VALUE]";

/// Stub adapter for one feed. Emits a fixed signal type.
#[derive(Debug, Clone)]
pub struct FeedStub {
    name: String,
    /// Short label used in the observed-mode source tag
    /// (`visibility_feed` → `[STUB_VALUE]_visibility_source`).
    short_name: String,
    signal_type: SignalType,
    mode: FailureMode,
}

impl FeedStub {
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        signal_type: SignalType,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            signal_type,
            mode: FailureMode::Observed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.mode
    }

    /// Controller push. The stub holds a cached copy of the register entry;
    /// nothing else writes it.
    pub(crate) fn set_failure_mode(&mut self, mode: FailureMode) {
        self.mode = mode;
    }

    /// Render an observation under the current failure mode.
    ///
    /// `observation_time` defaults to the current UTC time. Everything else
    /// is a pure function of the mode and the arguments.
    pub fn fetch(
        &self,
        market_object: &str,
        actor_id: &str,
        observation_time: Option<&str>,
    ) -> Observation {
        let observation_time = observation_time
            .map(str::to_string)
            .unwrap_or_else(utc_now_rfc3339);

        let (signal_value, provenance) = match self.mode {
            FailureMode::Observed => (
                // Placeholder value, explicitly marked as stub output.
                Some(0.0),
                Provenance {
                    source: format!("{}_{}_source", STUB_MARKER, self.short_name),
                    collection_method: format!("{}_manual_stub", STUB_MARKER),
                    freshness_class: "stub".to_string(),
                    reliability_class: "stub".to_string(),
                    failure_notes: None,
                },
            ),
            FailureMode::Missing => (
                None,
                Provenance {
                    source: format!("{}_unavailable", STUB_MARKER),
                    collection_method: "none".to_string(),
                    freshness_class: "unknown".to_string(),
                    reliability_class: "unknown".to_string(),
                    failure_notes: Some(
                        "Data source did not respond. No inference attempted.".to_string(),
                    ),
                },
            ),
            FailureMode::Blocked => (
                None,
                Provenance {
                    source: format!("{}_blocked", STUB_MARKER),
                    collection_method: "none".to_string(),
                    freshness_class: "unknown".to_string(),
                    reliability_class: "unknown".to_string(),
                    failure_notes: Some(
                        "Access denied by data source. No bypass attempted.".to_string(),
                    ),
                },
            ),
            FailureMode::Stale => (
                // Old value, not refreshed.
                Some(0.0),
                Provenance {
                    source: format!("{}_stale_cache", STUB_MARKER),
                    collection_method: format!("{}_cached", STUB_MARKER),
                    freshness_class: "stale".to_string(),
                    reliability_class: "degraded".to_string(),
                    failure_notes: Some(
                        "Data exceeds freshness threshold. No refresh attempted.".to_string(),
                    ),
                },
            ),
        };

        Observation {
            observation_time,
            market_object: market_object.to_string(),
            actor_id: actor_id.to_string(),
            signal_type: self.signal_type,
            signal_value,
            observation_status: self.mode.into(),
            provenance,
        }
    }
}
