//! Observation Governance Backend Library
//!
//! Exposes the governance modules for use by tests and downstream tools.

pub mod governance;

// Re-export the main entry points at crate root for convenience
pub use governance::controller::FailureModeController;
pub use governance::orchestrator::ValidationOrchestrator;
