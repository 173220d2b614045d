//! Observation Schema Validator
//!
//! Validates untrusted raw documents against the canonical observation
//! schema. Each record is checked independently; a malformed record degrades
//! to a localized violation, never a failed run. The result set is identical
//! under sequential and parallel execution.

use crate::governance::accel::{run_units, ExecMode};
use crate::governance::observation::{ObservationStatus, SignalType, Violation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The seven top-level fields every observation must carry.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "observation_time",
    "market_object",
    "actor_id",
    "signal_type",
    "signal_value",
    "provenance",
    "observation_status",
];

/// The four sub-fields every provenance block must carry.
pub const REQUIRED_PROVENANCE_FIELDS: [&str; 4] = [
    "source",
    "collection_method",
    "freshness_class",
    "reliability_class",
];

/// Outcome of a schema validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaVerdict {
    Valid,
    Invalid,
}

impl SchemaVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVerdict::Valid => "VALID",
            SchemaVerdict::Invalid => "INVALID",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SchemaVerdict::Valid)
    }
}

/// Check one record. Pure function of `(index, record)`.
///
/// A missing `signal_type`/`observation_status` yields both the
/// missing-field violation and the invalid-value violation, and an absent
/// or non-object provenance flags all four sub-fields.
fn check_record(index: usize, record: &Value) -> Vec<Violation> {
    let Some(obj) = record.as_object() else {
        return vec![Violation::record(index, "record is not a JSON object")];
    };

    let mut violations = Vec::new();

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            violations.push(Violation::record(
                index,
                format!("missing required field \"{}\"", field),
            ));
        }
    }

    let signal_ok = obj
        .get("signal_type")
        .and_then(Value::as_str)
        .map(SignalType::is_valid)
        .unwrap_or(false);
    if !signal_ok {
        violations.push(Violation::record(index, "invalid signal_type"));
    }

    let status_ok = obj
        .get("observation_status")
        .and_then(Value::as_str)
        .map(ObservationStatus::is_valid)
        .unwrap_or(false);
    if !status_ok {
        violations.push(Violation::record(index, "invalid observation_status"));
    }

    let provenance = obj.get("provenance").and_then(Value::as_object);
    for field in REQUIRED_PROVENANCE_FIELDS {
        let present = provenance.map(|p| p.contains_key(field)).unwrap_or(false);
        if !present {
            violations.push(Violation::record(
                index,
                format!("missing provenance field \"{}\"", field),
            ));
        }
    }

    violations
}

/// Validate a sequence of raw observation documents.
///
/// Verdict is `VALID` iff the violation set is empty. Never panics on
/// malformed input.
pub fn validate_schema(records: &[Value], mode: ExecMode) -> (SchemaVerdict, Vec<Violation>) {
    let violations = run_units(records, check_record, mode);
    if violations.is_empty() {
        (SchemaVerdict::Valid, violations)
    } else {
        (SchemaVerdict::Invalid, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_record() -> Value {
        json!({
            "observation_time": "2026-02-01T09:30:00Z",
            "market_object": "widget_pro",
            "actor_id": "acme_corp",
            "signal_type": "price_observed",
            "signal_value": 19.99,
            "observation_status": "observed",
            "provenance": {
                "source": "retail_site",
                "collection_method": "page_capture",
                "freshness_class": "fresh",
                "reliability_class": "high"
            }
        })
    }

    #[test]
    fn test_complete_record_is_valid() {
        let (verdict, violations) =
            validate_schema(&[complete_record()], ExecMode::Sequential);
        assert_eq!(verdict, SchemaVerdict::Valid);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_each_missing_top_level_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut record = complete_record();
            record.as_object_mut().unwrap().remove(field);
            let (verdict, violations) = validate_schema(&[record], ExecMode::Sequential);
            assert_eq!(verdict, SchemaVerdict::Invalid, "field {}", field);
            assert!(
                violations.iter().any(|v| {
                    v.locus == "record[0]"
                        && v.message.contains(&format!("\"{}\"", field))
                }),
                "no violation naming {}",
                field
            );
        }
    }

    #[test]
    fn test_each_missing_provenance_field_is_named() {
        for field in REQUIRED_PROVENANCE_FIELDS {
            let mut record = complete_record();
            record["provenance"].as_object_mut().unwrap().remove(field);
            let (verdict, violations) = validate_schema(&[record], ExecMode::Sequential);
            assert_eq!(verdict, SchemaVerdict::Invalid);
            assert!(violations
                .iter()
                .any(|v| v.message.contains("provenance")
                    && v.message.contains(&format!("\"{}\"", field))));
        }
    }

    #[test]
    fn test_unknown_signal_type_flagged() {
        let mut record = complete_record();
        record["signal_type"] = json!("efficiency_derived");
        let (verdict, violations) = validate_schema(&[record], ExecMode::Sequential);
        assert_eq!(verdict, SchemaVerdict::Invalid);
        assert!(violations.iter().any(|v| v.message == "invalid signal_type"));
    }

    #[test]
    fn test_unknown_status_flagged() {
        let mut record = complete_record();
        record["observation_status"] = json!("retrying");
        let (verdict, violations) = validate_schema(&[record], ExecMode::Sequential);
        assert_eq!(verdict, SchemaVerdict::Invalid);
        assert!(violations
            .iter()
            .any(|v| v.message == "invalid observation_status"));
    }

    #[test]
    fn test_non_object_record_is_a_violation_not_a_crash() {
        let (verdict, violations) =
            validate_schema(&[json!([1, 2, 3]), json!("text"), json!(null)], ExecMode::Sequential);
        assert_eq!(verdict, SchemaVerdict::Invalid);
        assert_eq!(violations.len(), 3);
        assert!(violations
            .iter()
            .all(|v| v.message == "record is not a JSON object"));
    }

    #[test]
    fn test_violation_indices_track_records() {
        let mut bad = complete_record();
        bad.as_object_mut().unwrap().remove("actor_id");
        let (_, violations) =
            validate_schema(&[complete_record(), bad], ExecMode::Sequential);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].locus, "record[1]");
    }

    #[test]
    fn test_empty_input_is_valid() {
        let (verdict, violations) = validate_schema(&[], ExecMode::Parallel);
        assert_eq!(verdict, SchemaVerdict::Valid);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_missing_signal_type_flags_both_rules() {
        let mut record = complete_record();
        record.as_object_mut().unwrap().remove("signal_type");
        let (_, violations) = validate_schema(&[record], ExecMode::Sequential);
        assert!(violations
            .iter()
            .any(|v| v.message.contains("missing required field \"signal_type\"")));
        assert!(violations.iter().any(|v| v.message == "invalid signal_type"));
    }
}
