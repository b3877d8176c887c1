//! Checking many logs at once.
//!
//! Every log gets its own [`Validator`](crate::Validator); results come back
//! in input order. With the `parallel` feature the logs are analyzed on the
//! rayon thread pool.

use crate::error::CheckResult;
use crate::report::Summary;
use crate::validator::{analyze_str, Bounds};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Read and analyze one log file without printing anything.
pub fn analyze_file(path: &Path, bounds: Bounds) -> CheckResult<Summary> {
    let log = std::fs::read_to_string(path)?;
    let summary = analyze_str(&log, bounds)?;
    debug!(path = %path.display(), "Log is consistent");
    Ok(summary)
}

/// Analyze several log files against the same bounds.
pub fn analyze_files(paths: &[PathBuf], bounds: Bounds) -> Vec<CheckResult<Summary>> {
    #[cfg(feature = "parallel")]
    let results = paths
        .par_iter()
        .map(|path| analyze_file(path, bounds))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = paths
        .iter()
        .map(|path| analyze_file(path, bounds))
        .collect();

    results
}
