//! Computed-View Ephemerality Scanner
//!
//! Derived/computed fields (latency, volatility, share-of-voice, efficiency
//! terms) must stay ephemeral: they may be computed in memory but never
//! persisted. The scanner walks an artifact tree and tests every file's
//! text against a fixed, ordered list of forbidden patterns.
//!
//! The search is a deliberately coarse substring/regex match with no scoping
//! to field names: the word `latency` inside an unrelated comment still
//! trips the scan. Narrowing it would change observable verdicts.

use crate::governance::accel::{run_units, ExecMode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Patterns denoting computed-only fields, in fixed order.
pub const DEFAULT_FORBIDDEN_PATTERNS: [&str; 4] =
    ["latency", "volatility", "share_of_voice", "efficiency_"];

/// Compiled, ordered forbidden-pattern list.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Compile an externally supplied pattern list. Fail-closed: one bad
    /// pattern rejects the whole list.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            let regex = Regex::new(&pattern)?;
            compiled.push((pattern, regex));
        }
        Ok(Self { patterns: compiled })
    }

    /// Pattern strings in scan order.
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All patterns matching the given text, in scan order.
    fn matches(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        let mut patterns = Vec::new();
        for pattern in DEFAULT_FORBIDDEN_PATTERNS {
            if let Ok(regex) = Regex::new(pattern) {
                patterns.push((pattern.to_string(), regex));
            }
        }
        Self { patterns }
    }
}

/// Outcome of an ephemerality scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EphemeralityVerdict {
    EphemeralOk,
    EphemeralViolation,
}

impl EphemeralityVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            EphemeralityVerdict::EphemeralOk => "EPHEMERAL_OK",
            EphemeralityVerdict::EphemeralViolation => "EPHEMERAL_VIOLATION",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, EphemeralityVerdict::EphemeralOk)
    }
}

/// Every regular file reachable under `root`. Directory symlinks are not
/// followed; file symlinks are scanned. Sorted for a deterministic unit
/// list (traversal order carries no semantics).
fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            let file_type = meta.file_type();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() {
                if let Ok(target) = fs::metadata(&path) {
                    if target.is_file() {
                        files.push(path);
                    }
                }
            }
        }
    }
    files.sort();
    files
}

/// Test one file against the pattern list. A file unreadable as text
/// contributes no match; the scan is best-effort and never fatal.
fn scan_file(path: &Path, patterns: &PatternSet) -> Vec<String> {
    let Ok(bytes) = fs::read(path) else {
        return Vec::new();
    };
    patterns.matches(&String::from_utf8_lossy(&bytes))
}

/// Scan every file under `root` for forbidden computed-field patterns.
///
/// Returns the verdict and a map of offending file → matched patterns (in
/// scan order). Verdict is `EPHEMERAL_VIOLATION` iff any file matched at
/// least one pattern. Files are independent units, so the result is
/// identical under sequential and parallel execution.
pub fn scan_ephemerality(
    root: &Path,
    patterns: &PatternSet,
    mode: ExecMode,
) -> (EphemeralityVerdict, BTreeMap<PathBuf, Vec<String>>) {
    let files = collect_files(root);
    debug!(
        "Ephemerality scan of {}: {} file(s), {} pattern(s)",
        root.display(),
        files.len(),
        patterns.len()
    );

    let matched: Vec<(PathBuf, Vec<String>)> = run_units(
        &files,
        |_, path: &PathBuf| {
            let matches = scan_file(path, patterns);
            if matches.is_empty() {
                Vec::new()
            } else {
                vec![(path.clone(), matches)]
            }
        },
        mode,
    );

    let violations: BTreeMap<PathBuf, Vec<String>> = matched.into_iter().collect();
    if violations.is_empty() {
        (EphemeralityVerdict::EphemeralOk, violations)
    } else {
        (EphemeralityVerdict::EphemeralViolation, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clean_tree_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("observations.json"), r#"[{"signal_value": 1.0}]"#).unwrap();
        let (verdict, violations) =
            scan_ephemerality(dir.path(), &PatternSet::default(), ExecMode::Sequential);
        assert_eq!(verdict, EphemeralityVerdict::EphemeralOk);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_latency_text_trips_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let offender = dir.path().join("report.txt");
        fs::write(&offender, "...latency_ms: 12...").unwrap();
        let (verdict, violations) =
            scan_ephemerality(dir.path(), &PatternSet::default(), ExecMode::Sequential);
        assert_eq!(verdict, EphemeralityVerdict::EphemeralViolation);
        assert_eq!(violations.get(&offender).map(Vec::as_slice), Some(&["latency".to_string()][..]));
    }

    #[test]
    fn test_scan_recurses_and_collects_every_matching_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("derived").join("views");
        fs::create_dir_all(&nested).unwrap();
        let offender = nested.join("summary.md");
        fs::write(&offender, "volatility up, efficiency_index flat").unwrap();
        let (verdict, violations) =
            scan_ephemerality(dir.path(), &PatternSet::default(), ExecMode::Sequential);
        assert_eq!(verdict, EphemeralityVerdict::EphemeralViolation);
        assert_eq!(
            violations.get(&offender),
            Some(&vec!["volatility".to_string(), "efficiency_".to_string()])
        );
    }

    #[test]
    fn test_pattern_order_is_preserved_in_matches() {
        let dir = tempfile::tempdir().unwrap();
        let offender = dir.path().join("all.txt");
        fs::write(&offender, "efficiency_x share_of_voice volatility latency").unwrap();
        let (_, violations) =
            scan_ephemerality(dir.path(), &PatternSet::default(), ExecMode::Sequential);
        assert_eq!(
            violations.get(&offender),
            Some(&vec![
                "latency".to_string(),
                "volatility".to_string(),
                "share_of_voice".to_string(),
                "efficiency_".to_string(),
            ])
        );
    }

    #[test]
    fn test_binary_file_scanned_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x42]).unwrap();
        let (verdict, _) =
            scan_ephemerality(dir.path(), &PatternSet::default(), ExecMode::Sequential);
        assert_eq!(verdict, EphemeralityVerdict::EphemeralOk);
    }

    #[test]
    fn test_missing_root_is_empty_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never_created");
        let (verdict, violations) =
            scan_ephemerality(&gone, &PatternSet::default(), ExecMode::Parallel);
        assert_eq!(verdict, EphemeralityVerdict::EphemeralOk);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_sequential_and_parallel_verdicts_agree() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..24 {
            let text = if i % 5 == 0 {
                format!("file {} mentions volatility", i)
            } else {
                format!("file {} is clean", i)
            };
            fs::write(dir.path().join(format!("f{:02}.txt", i)), text).unwrap();
        }
        let patterns = PatternSet::default();
        let seq = scan_ephemerality(dir.path(), &patterns, ExecMode::Sequential);
        let par = scan_ephemerality(dir.path(), &patterns, ExecMode::Parallel);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_bad_external_pattern_rejected() {
        assert!(PatternSet::new(["[unclosed"]).is_err());
        let set = PatternSet::new(["latency", "share_of_voice"]).unwrap();
        assert_eq!(set.pattern_names(), vec!["latency", "share_of_voice"]);
    }
}
