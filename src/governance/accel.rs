//! Execution Equivalence Layer
//!
//! Runs a validator's per-unit check either sequentially or across the rayon
//! worker pool, selected per call. The contract: both paths yield set-equal
//! results for every input; the only permissible observable difference is
//! wall-clock time.
//!
//! The check receives `(index, &unit)` by shared reference and nothing else,
//! so a unit's result cannot depend on any other unit's presence, value, or
//! processing order. Cross-unit state is unrepresentable here, which is what
//! makes the parallel path legal.
//!
//! The mode is an explicit argument captured for the duration of one call;
//! there is no process-wide toggle to race against an in-flight run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Execution mode for a single validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    /// Units processed one at a time in input order. Baseline.
    Sequential,
    /// Units partitioned across the worker pool. Accelerated.
    Parallel,
}

impl ExecMode {
    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecMode::Parallel)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecMode::Sequential => "sequential",
            ExecMode::Parallel => "parallel",
        }
    }
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Sequential
    }
}

impl std::fmt::Display for ExecMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run `check` over every unit, flattening the per-unit results.
///
/// Parallel execution only engages above one unit; a single unit gains
/// nothing from the pool.
pub fn run_units<U, R, C>(units: &[U], check: C, mode: ExecMode) -> Vec<R>
where
    U: Sync,
    R: Send,
    C: Fn(usize, &U) -> Vec<R> + Sync + Send,
{
    if mode.is_parallel() && units.len() > 1 {
        units
            .par_iter()
            .enumerate()
            .flat_map_iter(|(index, unit)| check(index, unit))
            .collect()
    } else {
        units
            .iter()
            .enumerate()
            .flat_map(|(index, unit)| check(index, unit))
            .collect()
    }
}

/// Canonical (order-independent) form of a result set: sorted ascending.
///
/// Two runs are equivalent iff their canonicalized results are equal.
pub fn canonicalize<T: Ord>(mut results: Vec<T>) -> Vec<T> {
    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(index: usize, unit: &u64) -> Vec<(usize, u64)> {
        // Emits a per-unit result count that varies by value, exercising
        // uneven work distribution across workers.
        (0..(unit % 3)).map(|k| (index, unit * 10 + k)).collect()
    }

    #[test]
    fn test_sequential_and_parallel_are_set_equal() {
        let units: Vec<u64> = (0..257).map(|i| i * 7 + 3).collect();
        let seq = canonicalize(run_units(&units, expand, ExecMode::Sequential));
        let par = canonicalize(run_units(&units, expand, ExecMode::Parallel));
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_and_single_unit_inputs() {
        let none: Vec<u64> = vec![];
        assert!(run_units(&none, expand, ExecMode::Parallel).is_empty());

        let one = vec![5u64];
        assert_eq!(
            run_units(&one, expand, ExecMode::Parallel),
            run_units(&one, expand, ExecMode::Sequential)
        );
    }

    #[test]
    fn test_sequential_preserves_input_order() {
        let units = vec![2u64, 5, 8];
        let results = run_units(&units, expand, ExecMode::Sequential);
        let indices: Vec<usize> = results.iter().map(|(i, _)| *i).collect();
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_canonicalize_sorts() {
        assert_eq!(canonicalize(vec![3, 1, 2]), vec![1, 2, 3]);
        assert_eq!(canonicalize(Vec::<i32>::new()), Vec::<i32>::new());
    }
}
