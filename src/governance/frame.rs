//! Frame Admissibility Validator
//!
//! A frame is a named analytical lens with a fixed allow-list of signal
//! types it may consume. The rule table is immutable, externally supplied
//! configuration; absence of a rule is never permissive.

use crate::governance::observation::Violation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable frame → allowed-signal-types rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRules {
    frames: BTreeMap<String, BTreeSet<String>>,
}

impl FrameRules {
    pub fn empty() -> Self {
        Self {
            frames: BTreeMap::new(),
        }
    }

    /// Add a frame and its allow-list.
    pub fn with_frame<I, S>(mut self, frame_id: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frames.insert(
            frame_id.into(),
            allowed.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// The rule table shipped with the pipeline.
    pub fn builtin() -> Self {
        Self::empty()
            .with_frame("market_aggressiveness", ["price_observed"])
            .with_frame("visibility_dominance", ["visibility_observed"])
            .with_frame("efficiency_stress", ["input_proxy_observed"])
    }

    /// Load an externally supplied table from a JSON document of the form
    /// `{"frame_id": ["signal_type", ...], ...}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn allowed(&self, frame_id: &str) -> Option<&BTreeSet<String>> {
        self.frames.get(frame_id)
    }

    pub fn contains(&self, frame_id: &str) -> bool {
        self.frames.contains_key(frame_id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for FrameRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of a frame admissibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameVerdict {
    Admissible,
    NotAdmissible,
}

impl FrameVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameVerdict::Admissible => "ADMISSIBLE",
            FrameVerdict::NotAdmissible => "NOT_ADMISSIBLE",
        }
    }

    pub fn is_admissible(&self) -> bool {
        matches!(self, FrameVerdict::Admissible)
    }
}

/// Check that a frame only consumes signal types it is permitted to consume.
///
/// Signal types arrive as raw strings so unvalidated input can be checked;
/// a string no frame allows is simply never admissible. An unknown frame id
/// is `NOT_ADMISSIBLE` with one violation naming the id, regardless of the
/// signal list — including an empty one. All disallowed types are collected
/// into a single violation, in encounter order.
pub fn validate_frame(
    rules: &FrameRules,
    frame_id: &str,
    signal_types: &[String],
) -> (FrameVerdict, Vec<Violation>) {
    let Some(allowed) = rules.allowed(frame_id) else {
        return (
            FrameVerdict::NotAdmissible,
            vec![Violation::frame(
                frame_id,
                format!("unknown frame_id \"{}\"", frame_id),
            )],
        );
    };

    let disallowed: Vec<&str> = signal_types
        .iter()
        .map(String::as_str)
        .filter(|s| !allowed.contains(*s))
        .collect();

    if disallowed.is_empty() {
        (FrameVerdict::Admissible, Vec::new())
    } else {
        (
            FrameVerdict::NotAdmissible,
            vec![Violation::frame(
                frame_id,
                format!("disallowed signal types: {}", disallowed.join(", ")),
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allowed_signal_is_admissible() {
        let (verdict, violations) = validate_frame(
            &FrameRules::builtin(),
            "market_aggressiveness",
            &strings(&["price_observed", "price_observed"]),
        );
        assert_eq!(verdict, FrameVerdict::Admissible);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_unknown_frame_is_fail_closed() {
        let rules = FrameRules::builtin();
        for signals in [vec![], strings(&["price_observed"])] {
            let (verdict, violations) = validate_frame(&rules, "momentum_surge", &signals);
            assert_eq!(verdict, FrameVerdict::NotAdmissible);
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains("momentum_surge"));
        }
    }

    #[test]
    fn test_disallowed_types_collected_into_one_violation() {
        let (verdict, violations) = validate_frame(
            &FrameRules::builtin(),
            "visibility_dominance",
            &strings(&["price_observed", "visibility_observed", "input_proxy_observed"]),
        );
        assert_eq!(verdict, FrameVerdict::NotAdmissible);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "disallowed signal types: price_observed, input_proxy_observed"
        );
    }

    #[test]
    fn test_empty_signal_list_for_known_frame_is_admissible() {
        let (verdict, _) =
            validate_frame(&FrameRules::builtin(), "efficiency_stress", &[]);
        assert_eq!(verdict, FrameVerdict::Admissible);
    }

    #[test]
    fn test_unrecognized_signal_string_never_admissible() {
        let (verdict, violations) = validate_frame(
            &FrameRules::builtin(),
            "market_aggressiveness",
            &strings(&["null"]),
        );
        assert_eq!(verdict, FrameVerdict::NotAdmissible);
        assert!(violations[0].message.contains("null"));
    }

    #[test]
    fn test_rules_from_json() {
        let rules = FrameRules::from_json(
            r#"{"liquidity_watch": ["inventory_proxy_observed", "price_observed"]}"#,
        )
        .unwrap();
        assert!(rules.contains("liquidity_watch"));
        let (verdict, _) = validate_frame(
            &rules,
            "liquidity_watch",
            &strings(&["inventory_proxy_observed"]),
        );
        assert_eq!(verdict, FrameVerdict::Admissible);
        assert!(!rules.contains("market_aggressiveness"));
    }
}
