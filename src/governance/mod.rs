//! Market-Observation Pipeline Governance
//!
//! Validates that observation artifacts conform to the canonical schema,
//! that analytical frames only consume signal types they are permitted to
//! consume, and that no persisted artifact carries forbidden computed-only
//! fields. A companion control plane injects deterministic, manually
//! selected failure modes into feed stubs so downstream consumers can be
//! tested against degraded inputs without live dependencies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ValidationOrchestrator                       │
//! │  (composes validators, A/B equivalence self-check)              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌─────────────┐        ┌─────────────┐        ┌─────────────┐
//! │ Schema      │        │ Frame       │        │ Ephemerality│
//! │ Validator   │        │ Validator   │        │ Scanner     │
//! └──────┬──────┘        └─────────────┘        └──────┬──────┘
//!        │                                             │
//!        └──────────────────┬──────────────────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Equivalence Layer                           │
//! │  run_units(units, check, mode) — sequential ≡ parallel          │
//! └─────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────┐   pushes mode    ┌─────────────────────┐
//! │ FailureModeController│ ───────────────▶ │ FeedStub (per feed) │
//! │ (register + config)  │                  │ mode → Observation  │
//! └─────────────────────┘                  └─────────────────────┘
//! ```
//!
//! # Determinism Guarantees
//!
//! - **Validators**: pure functions from input to verdict + violation set
//! - **Equivalence layer**: sequential and parallel runs are set-equal;
//!   only wall-clock may differ
//! - **Control plane**: no randomness, no retries, no auto-recovery; a
//!   mode changes only by explicit command and survives restart
//! - **Feed stubs**: fully synthetic rendering, no external data sources

pub mod accel;
pub mod controller;
pub mod ephemerality;
pub mod feed_stub;
pub mod frame;
pub mod observation;
pub mod orchestrator;
pub mod report;
pub mod schema;

// Re-exports for convenience
pub use accel::{canonicalize, run_units, ExecMode};
pub use controller::{ControllerError, FailureModeController, FEEDS};
pub use ephemerality::{
    scan_ephemerality, EphemeralityVerdict, PatternSet, DEFAULT_FORBIDDEN_PATTERNS,
};
pub use feed_stub::{FeedStub, STUB_MARKER};
pub use frame::{validate_frame, FrameRules, FrameVerdict};
pub use observation::{
    FailureMode, Observation, ObservationStatus, Provenance, SignalType, Violation,
};
pub use orchestrator::ValidationOrchestrator;
pub use report::{
    AbComparisonReport, CanonicalRunResults, ControlConstraints, StatusReport, ValidationReport,
    EQUIVALENCE_VIOLATION_CLASS,
};
pub use schema::{validate_schema, SchemaVerdict, REQUIRED_FIELDS, REQUIRED_PROVENANCE_FIELDS};
