//! Reporting.
//!
//! The summary (ferry snapshot plus vehicle counts) is printed however an
//! analysis ends: success, violation, or failure to read the log. This is
//! done by [`ReportGuard`], which writes the report when dropped.

use crate::error::{CheckResult, Error};
use crate::ferry::FerryRecord;
use crate::trace::{NoopObserver, Observer};
use crate::validator::{Bounds, Validator, Warning};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::info;

/// Final state of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ferry: FerryRecord,
    /// Trucks started.
    pub trucks: u32,
    /// Cars started.
    pub cars: u32,
    pub warnings: Vec<Warning>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ferry = &self.ferry;
        writeln!(f, "Ferry:")?;
        writeln!(f, "\tLast visited port: {}", ferry.port)?;
        writeln!(f, "\tState: {:?}", ferry.state)?;
        writeln!(f, "\tTrucks on board: {}", ferry.loaded.trucks)?;
        writeln!(f, "\tCars on board: {}", ferry.loaded.cars)?;
        writeln!(f, "\tMeasured capacity: {}", ferry.measured_capacity)?;
        writeln!(f, "\tTrips taken: {}", ferry.trips)?;
        writeln!(f, "Trucks started: {}", self.trucks)?;
        write!(f, "Cars started: {}", self.cars)
    }
}

/// Output format of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Pending,
    Passed,
    Failed(String),
}

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    error: Option<&'a str>,
    summary: &'a Summary,
}

/// Wraps a [`Validator`] and writes its report when dropped.
///
/// Dereferences to the validator, so the analysis runs through the guard.
/// An outcome never recorded with [`ReportGuard::pass`] counts as a failure.
pub struct ReportGuard<'a, W: Write> {
    validator: &'a mut Validator,
    out: &'a mut W,
    format: ReportFormat,
    outcome: Outcome,
    warnings_written: bool,
}

impl<'a, W: Write> ReportGuard<'a, W> {
    pub fn new(validator: &'a mut Validator, out: &'a mut W, format: ReportFormat) -> Self {
        Self {
            validator,
            out,
            format,
            outcome: Outcome::Pending,
            warnings_written: false,
        }
    }

    pub fn pass(&mut self) {
        self.outcome = Outcome::Passed;
    }

    /// Record a failure. Text reports print it right away, after any
    /// warnings raised so far and ahead of the summary.
    pub fn fail(&mut self, message: impl fmt::Display) {
        let message = message.to_string();
        if self.format == ReportFormat::Text {
            let _ = self.write_warnings();
            let _ = writeln!(self.out, "{message}");
        }
        self.outcome = Outcome::Failed(message);
    }

    fn write_warnings(&mut self) -> std::io::Result<()> {
        if self.warnings_written {
            return Ok(());
        }
        self.warnings_written = true;
        for warning in self.validator.warnings() {
            writeln!(self.out, "Warning: {warning}")?;
        }
        Ok(())
    }

    fn write_report(&mut self) -> Result<(), Error> {
        let summary = self.validator.summary();
        match self.format {
            ReportFormat::Text => {
                self.write_warnings()?;
                writeln!(self.out, "{summary}")?;
            }
            ReportFormat::Json => {
                let report = JsonReport {
                    passed: self.outcome == Outcome::Passed,
                    error: match &self.outcome {
                        Outcome::Failed(message) => Some(message.as_str()),
                        _ => None,
                    },
                    summary: &summary,
                };
                serde_json::to_writer_pretty(&mut *self.out, &report)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Deref for ReportGuard<'_, W> {
    type Target = Validator;

    fn deref(&self) -> &Validator {
        &*self.validator
    }
}

impl<W: Write> DerefMut for ReportGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut Validator {
        &mut *self.validator
    }
}

impl<W: Write> Drop for ReportGuard<'_, W> {
    fn drop(&mut self) {
        if let Err(err) = self.write_report() {
            tracing::error!(error = %err, "Failed to write report");
        }
    }
}

/// Write the "Analyzing file ..." line.
pub fn write_header<W: Write>(out: &mut W, path: &Path, bounds: &Bounds) -> std::io::Result<()> {
    write!(out, "Analyzing file '{}'", path.display())?;
    if bounds.checks_anything() {
        writeln!(out, ", checking against {bounds}")
    } else {
        writeln!(out, ", skipping ferry capacity and vehicle amount checks")
    }
}

/// Analyze a log file, printing a text report to `out`.
pub fn check_file<W: Write>(path: &Path, bounds: Bounds, out: &mut W) -> CheckResult<Summary> {
    check_file_with(path, bounds, ReportFormat::Text, &mut NoopObserver, out)
}

/// Analyze a log file with a chosen report format and observer.
///
/// The report is written to `out` on every path, including when the file
/// cannot be read.
pub fn check_file_with<W, O>(
    path: &Path,
    bounds: Bounds,
    format: ReportFormat,
    observer: &mut O,
    out: &mut W,
) -> CheckResult<Summary>
where
    W: Write,
    O: Observer + ?Sized,
{
    info!(path = %path.display(), %bounds, "Analyzing log");
    if format == ReportFormat::Text {
        write_header(out, path, &bounds)?;
    }

    let mut validator = Validator::new(bounds);
    let outcome = {
        let mut guard = ReportGuard::new(&mut validator, out, format);
        let log = match std::fs::read_to_string(path) {
            Ok(log) => log,
            Err(err) => {
                guard.fail(format_args!("Failed to read '{}': {err}", path.display()));
                return Err(err.into());
            }
        };

        let outcome = guard.run(log.lines(), observer);
        match &outcome {
            Ok(()) => guard.pass(),
            Err(violation) => guard.fail(violation),
        }
        outcome
    };

    let summary = validator.conclude(outcome)?;
    info!(
        lines = validator.lines(),
        trips = summary.ferry.trips,
        "Log is consistent"
    );
    if format == ReportFormat::Text {
        writeln!(out, "No errors found")?;
    }
    Ok(summary)
}
