//! Validation Orchestrator
//!
//! Composes the three validators and the controller status into a single
//! report, and offers the A/B entry point that runs the full report under
//! both execution modes and asserts set-equality of the results.

use crate::governance::accel::ExecMode;
use crate::governance::controller::FailureModeController;
use crate::governance::ephemerality::{scan_ephemerality, PatternSet};
use crate::governance::frame::{validate_frame, FrameRules};
use crate::governance::report::{
    AbComparisonReport, CanonicalRunResults, EphemeralitySection, FrameSection, SchemaSection,
    ValidationReport, EQUIVALENCE_VIOLATION_CLASS,
};
use crate::governance::schema::validate_schema;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

/// Orchestrates validation of one artifact under one frame.
///
/// Owns the immutable rule tables; the execution mode and the optional
/// controller are supplied per call.
pub struct ValidationOrchestrator {
    frame_rules: FrameRules,
    patterns: PatternSet,
}

impl ValidationOrchestrator {
    pub fn new(frame_rules: FrameRules, patterns: PatternSet) -> Self {
        Self {
            frame_rules,
            patterns,
        }
    }

    /// Built-in frame rule table and forbidden-pattern list.
    pub fn with_defaults() -> Self {
        Self::new(FrameRules::builtin(), PatternSet::default())
    }

    pub fn frame_rules(&self) -> &FrameRules {
        &self.frame_rules
    }

    /// Run all validators against an artifact.
    ///
    /// The artifact is a JSON array of raw observation documents; an
    /// unreadable or unparsable artifact is a usage error, not a data
    /// violation. The ephemerality scan covers the artifact's parent
    /// directory. When a controller is supplied, its current feed modes are
    /// included in the report.
    pub fn run_full_validation(
        &self,
        artifact_path: &Path,
        frame_id: &str,
        mode: ExecMode,
        controller: Option<&FailureModeController>,
    ) -> Result<ValidationReport> {
        let raw = fs::read_to_string(artifact_path)
            .with_context(|| format!("failed to read artifact {}", artifact_path.display()))?;
        let records: Vec<Value> = serde_json::from_str(&raw).with_context(|| {
            format!(
                "artifact {} is not a JSON array of records",
                artifact_path.display()
            )
        })?;
        debug!(
            "Validating {} ({} record(s)) against frame {} [{}]",
            artifact_path.display(),
            records.len(),
            frame_id,
            mode
        );

        let (schema_result, schema_violations) = validate_schema(&records, mode);

        let signal_types = extract_signal_types(&records);
        let (frame_result, frame_violations) =
            validate_frame(&self.frame_rules, frame_id, &signal_types);

        let artifact_dir = artifact_path.parent().unwrap_or_else(|| Path::new("."));
        let (ephemeral_result, ephemeral_map) =
            scan_ephemerality(artifact_dir, &self.patterns, mode);

        Ok(ValidationReport {
            artifact: artifact_path.display().to_string(),
            frame: frame_id.to_string(),
            exec_mode: mode,
            schema_validation: SchemaSection {
                result: schema_result,
                violations: schema_violations,
            },
            frame_admissibility: FrameSection {
                result: frame_result,
                violations: frame_violations,
            },
            ephemerality_check: EphemeralitySection {
                result: ephemeral_result,
                violations: ephemeral_map
                    .into_iter()
                    .map(|(path, patterns)| (path.display().to_string(), patterns))
                    .collect(),
            },
            feed_modes: controller.map(FailureModeController::get_all_modes),
        })
    }

    /// Run the full validation sequentially and in parallel and compare the
    /// canonicalized results.
    ///
    /// A mismatch is fatal to the comparison and distinct from any data
    /// violation: it means the parallel path itself is defective.
    pub fn run_ab_comparison(
        &self,
        artifact_path: &Path,
        frame_id: &str,
        controller: Option<&FailureModeController>,
    ) -> Result<AbComparisonReport> {
        let baseline =
            self.run_full_validation(artifact_path, frame_id, ExecMode::Sequential, controller)?;
        let accelerated =
            self.run_full_validation(artifact_path, frame_id, ExecMode::Parallel, controller)?;

        let sequential = CanonicalRunResults::from_report(&baseline);
        let parallel = CanonicalRunResults::from_report(&accelerated);
        let diff = diff_results(&sequential, &parallel);
        let identical = diff.is_empty();
        if !identical {
            error!(
                "{} on {}: {}",
                EQUIVALENCE_VIOLATION_CLASS,
                artifact_path.display(),
                diff.join("; ")
            );
        }

        Ok(AbComparisonReport {
            artifact: artifact_path.display().to_string(),
            frame: frame_id.to_string(),
            sequential,
            parallel,
            identical,
            diff,
        })
    }
}

impl Default for ValidationOrchestrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Signal-type strings as the raw records carry them. A record with no
/// usable `signal_type` contributes its JSON rendering (`null`, a number,
/// ...), which no frame allows, preserving fail-closed admissibility.
fn extract_signal_types(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|record| match record.get("signal_type") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "null".to_string(),
        })
        .collect()
}

/// Section-by-section comparison, one diff entry per divergent section.
fn diff_results(sequential: &CanonicalRunResults, parallel: &CanonicalRunResults) -> Vec<String> {
    let mut diff = Vec::new();
    if sequential.schema != parallel.schema {
        diff.push(format!(
            "{}: schema verdict differs (sequential={}, parallel={})",
            EQUIVALENCE_VIOLATION_CLASS,
            sequential.schema.as_str(),
            parallel.schema.as_str()
        ));
    }
    if sequential.schema_violations != parallel.schema_violations {
        diff.push(format!(
            "{}: schema violation sets differ ({} vs {})",
            EQUIVALENCE_VIOLATION_CLASS,
            sequential.schema_violations.len(),
            parallel.schema_violations.len()
        ));
    }
    if sequential.frame != parallel.frame {
        diff.push(format!(
            "{}: frame verdict differs (sequential={}, parallel={})",
            EQUIVALENCE_VIOLATION_CLASS,
            sequential.frame.as_str(),
            parallel.frame.as_str()
        ));
    }
    if sequential.frame_violations != parallel.frame_violations {
        diff.push(format!(
            "{}: frame violation sets differ ({} vs {})",
            EQUIVALENCE_VIOLATION_CLASS,
            sequential.frame_violations.len(),
            parallel.frame_violations.len()
        ));
    }
    if sequential.ephemeral != parallel.ephemeral {
        diff.push(format!(
            "{}: ephemerality verdict differs (sequential={}, parallel={})",
            EQUIVALENCE_VIOLATION_CLASS,
            sequential.ephemeral.as_str(),
            parallel.ephemeral.as_str()
        ));
    }
    diff
}
