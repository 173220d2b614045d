//! Governance Report Types
//!
//! Structured documents emitted by the orchestrator and the failure-mode
//! controller. Data violations live inside these reports; they are the
//! system's primary output, not errors.

use crate::governance::accel::{canonicalize, ExecMode};
use crate::governance::ephemerality::EphemeralityVerdict;
use crate::governance::frame::FrameVerdict;
use crate::governance::observation::{FailureMode, Violation};
use crate::governance::schema::SchemaVerdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fatal classification for a sequential/parallel result mismatch. Distinct
/// from every data-violation verdict: it indicates a defect in the parallel
/// execution path itself, not in the data under test.
pub const EQUIVALENCE_VIOLATION_CLASS: &str = "EQUIVALENCE_VIOLATION";

/// Schema validation section of a full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSection {
    pub result: SchemaVerdict,
    pub violations: Vec<Violation>,
}

/// Frame admissibility section of a full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSection {
    pub result: FrameVerdict,
    pub violations: Vec<Violation>,
}

/// Ephemerality section of a full report. Violations map offending file
/// paths to the patterns they matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralitySection {
    pub result: EphemeralityVerdict,
    pub violations: BTreeMap<String, Vec<String>>,
}

/// Full validation report for one artifact under one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub artifact: String,
    pub frame: String,
    /// Execution mode this report was produced under.
    pub exec_mode: ExecMode,
    pub schema_validation: SchemaSection,
    pub frame_admissibility: FrameSection,
    pub ephemerality_check: EphemeralitySection,
    /// Current feed failure modes, when a controller was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_modes: Option<BTreeMap<String, FailureMode>>,
}

/// Canonicalized (order-independent) results of one full run, the unit of
/// comparison for the A/B check. The ephemerality section contributes its
/// verdict: the scan re-reads the filesystem per run, so its file map is
/// compared by outcome rather than by content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRunResults {
    pub schema: SchemaVerdict,
    pub schema_violations: Vec<Violation>,
    pub frame: FrameVerdict,
    pub frame_violations: Vec<Violation>,
    pub ephemeral: EphemeralityVerdict,
}

impl CanonicalRunResults {
    pub fn from_report(report: &ValidationReport) -> Self {
        Self {
            schema: report.schema_validation.result,
            schema_violations: canonicalize(report.schema_validation.violations.clone()),
            frame: report.frame_admissibility.result,
            frame_violations: canonicalize(report.frame_admissibility.violations.clone()),
            ephemeral: report.ephemerality_check.result,
        }
    }
}

/// A/B comparison of the same validation run under both execution modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbComparisonReport {
    pub artifact: String,
    pub frame: String,
    pub sequential: CanonicalRunResults,
    pub parallel: CanonicalRunResults,
    pub identical: bool,
    /// Empty when identical; otherwise each entry carries the
    /// `EQUIVALENCE_VIOLATION` class and names the section that diverged.
    pub diff: Vec<String>,
}

impl AbComparisonReport {
    /// A mismatch is fatal to the comparison: the parallel path is buggy.
    pub fn is_equivalence_violation(&self) -> bool {
        !self.identical
    }
}

/// Constraints the control plane declares by construction. Exposed for
/// audit, not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConstraints {
    pub no_randomness: bool,
    pub no_retries: bool,
    pub no_auto_recovery: bool,
}

impl Default for ControlConstraints {
    fn default() -> Self {
        Self {
            no_randomness: true,
            no_retries: true,
            no_auto_recovery: true,
        }
    }
}

/// Controller status for audit surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub controller: String,
    pub modes: BTreeMap<String, FailureMode>,
    pub constraints: ControlConstraints,
}
