//! Failure-Mode Controller
//!
//! Process-wide register of feed → failure mode, mutated only by explicit
//! external command. No randomness, no retries, no auto-recovery: a mode
//! stays set until the next explicit call, across restarts.
//!
//! The controller is an explicitly constructed instance passed by reference
//! to whatever needs it; tests build independent controllers over
//! independent config stores. It exclusively owns the register and is its
//! sole writer; each feed stub holds a cached copy pushed on startup and on
//! every mutation.
//!
//! Mutation is persist-then-apply: the new register is written to the
//! config store first, and only on success do the in-memory register and
//! the stub caches change. A failed persist surfaces an error and leaves
//! every observable state untouched.

use crate::governance::feed_stub::FeedStub;
use crate::governance::observation::{FailureMode, Observation, SignalType};
use crate::governance::report::{ControlConstraints, StatusReport};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The fixed feed set: `(feed name, short label, emitted signal type)`.
pub const FEEDS: [(&str, &str, SignalType); 3] = [
    ("price_feed", "price", SignalType::PriceObserved),
    ("visibility_feed", "visibility", SignalType::VisibilityObserved),
    ("input_proxy_feed", "input_proxy", SignalType::InputProxyObserved),
];

/// Usage and persistence errors raised by the controller.
#[derive(Debug, Clone)]
pub enum ControllerError {
    /// Feed name outside the fixed feed set.
    UnknownFeed { name: String },
    /// Mode string outside the closed failure-mode set.
    InvalidMode { mode: String },
    /// Config store write failed; no state was applied.
    Persist { path: PathBuf, reason: String },
    /// Persisted config exists but cannot be read or parsed.
    CorruptConfig { path: PathBuf, reason: String },
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFeed { name } => write!(f, "Unknown feed: {}", name),
            Self::InvalidMode { mode } => write!(f, "Invalid failure mode: {}", mode),
            Self::Persist { path, reason } => {
                write!(f, "Failed to persist config to {}: {}", path.display(), reason)
            }
            Self::CorruptConfig { path, reason } => {
                write!(f, "Corrupt config at {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ControllerError {}

/// Persisted per-feed entry: `{"failure_mode": <mode>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FeedEntry {
    failure_mode: FailureMode,
}

/// Persisted config document: `{"feeds": {<name>: {"failure_mode": ...}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ControlConfig {
    feeds: BTreeMap<String, FeedEntry>,
}

struct ControllerState {
    modes: BTreeMap<String, FailureMode>,
    stubs: BTreeMap<String, FeedStub>,
}

/// Central register of feed failure modes with synchronous persistence.
pub struct FailureModeController {
    config_path: PathBuf,
    state: Mutex<ControllerState>,
}

impl FailureModeController {
    /// Construct over a config store path. A fresh store starts every feed
    /// at `observed`; an existing one is restored verbatim. A store that
    /// exists but does not parse is a fail-closed error, never a default.
    pub fn new(config_path: impl Into<PathBuf>) -> Result<Self, ControllerError> {
        let config_path = config_path.into();

        let mut modes = BTreeMap::new();
        let mut stubs = BTreeMap::new();
        for (name, short_name, signal_type) in FEEDS {
            modes.insert(name.to_string(), FailureMode::Observed);
            stubs.insert(name.to_string(), FeedStub::new(name, short_name, signal_type));
        }

        if config_path.exists() {
            let config = Self::load_config(&config_path)?;
            for (name, entry) in &config.feeds {
                // Entries for feeds outside the fixed set are ignored.
                if let Some(mode) = modes.get_mut(name) {
                    *mode = entry.failure_mode;
                } else {
                    warn!("Ignoring persisted mode for unknown feed {}", name);
                }
            }
            debug!(
                "Restored {} feed mode(s) from {}",
                config.feeds.len(),
                config_path.display()
            );
        }

        for (name, mode) in &modes {
            if let Some(stub) = stubs.get_mut(name) {
                stub.set_failure_mode(*mode);
            }
        }

        Ok(Self {
            config_path,
            state: Mutex::new(ControllerState { modes, stubs }),
        })
    }

    fn load_config(path: &Path) -> Result<ControlConfig, ControllerError> {
        let raw = fs::read_to_string(path).map_err(|e| ControllerError::CorruptConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ControllerError::CorruptConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the full register synchronously: serialize, write a sibling
    /// temp file, rename over the store. A reader of the store sees the old
    /// document or the new one, never a torn write.
    fn persist(&self, modes: &BTreeMap<String, FailureMode>) -> Result<(), ControllerError> {
        let config = ControlConfig {
            feeds: modes
                .iter()
                .map(|(name, mode)| (name.clone(), FeedEntry { failure_mode: *mode }))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&config).map_err(|e| ControllerError::Persist {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.config_path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| ControllerError::Persist {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp, &self.config_path).map_err(|e| ControllerError::Persist {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Set the failure mode for one feed.
    ///
    /// Fails with `UnknownFeed` for a name outside the fixed set. Persists
    /// the full register before applying; on persist failure nothing
    /// changes. The only transition in the state machine is this call.
    pub fn set_failure_mode(
        &self,
        feed_name: &str,
        mode: FailureMode,
    ) -> Result<(), ControllerError> {
        let mut state = self.state.lock();
        if !state.modes.contains_key(feed_name) {
            return Err(ControllerError::UnknownFeed {
                name: feed_name.to_string(),
            });
        }

        let mut prospective = state.modes.clone();
        prospective.insert(feed_name.to_string(), mode);
        self.persist(&prospective)?;

        state.modes = prospective;
        if let Some(stub) = state.stubs.get_mut(feed_name) {
            stub.set_failure_mode(mode);
        }
        info!("Set failure mode {} = {}", feed_name, mode);
        Ok(())
    }

    /// As `set_failure_mode`, from an untrusted mode string. Fail-closed:
    /// an unrecognized string is `InvalidMode`, never silently accepted.
    pub fn set_failure_mode_str(
        &self,
        feed_name: &str,
        mode: &str,
    ) -> Result<(), ControllerError> {
        if !self.state.lock().modes.contains_key(feed_name) {
            return Err(ControllerError::UnknownFeed {
                name: feed_name.to_string(),
            });
        }
        let mode = FailureMode::parse(mode).ok_or_else(|| ControllerError::InvalidMode {
            mode: mode.to_string(),
        })?;
        self.set_failure_mode(feed_name, mode)
    }

    /// Current mode of one feed.
    pub fn get_failure_mode(&self, feed_name: &str) -> Result<FailureMode, ControllerError> {
        self.state
            .lock()
            .modes
            .get(feed_name)
            .copied()
            .ok_or_else(|| ControllerError::UnknownFeed {
                name: feed_name.to_string(),
            })
    }

    /// Snapshot of the full register. Never torn: the register is only
    /// written under the same lock.
    pub fn get_all_modes(&self) -> BTreeMap<String, FailureMode> {
        self.state.lock().modes.clone()
    }

    /// Render an observation from the named feed's stub under its current
    /// mode.
    pub fn fetch(
        &self,
        feed_name: &str,
        market_object: &str,
        actor_id: &str,
        observation_time: Option<&str>,
    ) -> Result<Observation, ControllerError> {
        let state = self.state.lock();
        let stub = state
            .stubs
            .get(feed_name)
            .ok_or_else(|| ControllerError::UnknownFeed {
                name: feed_name.to_string(),
            })?;
        Ok(stub.fetch(market_object, actor_id, observation_time))
    }

    /// Signal type the named feed emits.
    pub fn feed_signal_type(&self, feed_name: &str) -> Result<SignalType, ControllerError> {
        let state = self.state.lock();
        state
            .stubs
            .get(feed_name)
            .map(FeedStub::signal_type)
            .ok_or_else(|| ControllerError::UnknownFeed {
                name: feed_name.to_string(),
            })
    }

    /// Full mode mapping plus the constraints the control plane declares by
    /// construction.
    pub fn get_status_report(&self) -> StatusReport {
        StatusReport {
            controller: "failure_mode_control".to_string(),
            modes: self.get_all_modes(),
            constraints: ControlConstraints::default(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
