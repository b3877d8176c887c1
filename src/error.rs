//! Typed errors for ferry-log-check.
//!
//! A [`Violation`] is the verdict of a failed analysis: where in the log the
//! problem was found plus a [`ViolationKind`] describing it. Everything else
//! (I/O, JSON output, running the simulation) is reported through [`Error`].

use crate::event::{Location, Port, VehicleId, VehicleKind};
use crate::report::Summary;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Top-level error type for ferry-log-check operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The log violates the protocol.
    #[error("{0}")]
    Analysis(#[from] Failure),

    /// Error while running the simulation binary.
    #[cfg(feature = "run")]
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Error building a configuration.
    #[error("Configuration error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    /// 1-based line number.
    Line(usize),

    /// Detected by the end-of-log checks, after `lines` lines were read.
    EndOfLog { lines: usize },
}

impl Position {
    /// Line number to report; end-of-log checks point one past the last line.
    pub fn line(&self) -> usize {
        match *self {
            Position::Line(line) => line,
            Position::EndOfLog { lines } => lines + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "line {line}"),
            Position::EndOfLog { lines } => write!(f, "end of log (after line {lines})"),
        }
    }
}

/// A protocol violation found in a log, with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error on {position}: {kind}")]
pub struct Violation {
    pub position: Position,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(position: Position, kind: impl Into<ViolationKind>) -> Self {
        Self {
            position,
            kind: kind.into(),
        }
    }
}

/// The five families of violations. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ViolationKind {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sequencing(#[from] SequencingError),

    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Count(#[from] CountMismatch),

    #[error(transparent)]
    Termination(#[from] IncompleteTermination),
}

/// A line that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("Expected 3 ':'-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("Line index is '{0}', expected a number")]
    InvalidIndex(String),

    #[error("Invalid process '{0}'")]
    UnknownActor(String),

    #[error("Invalid event '{0}'")]
    UnknownEvent(String),
}

/// Line indices out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SequencingError {
    #[error("Line index is '{index}', does not follow '{previous}' on the previous line")]
    NotConsecutive { index: u64, previous: u64 },

    #[error("Line index is '{index}', does not match the line number")]
    PositionMismatch { index: u64 },
}

/// A transition or guard of the ferry or vehicle automata failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolViolation {
    #[error("Ferry acted after finishing")]
    FerryActedAfterFinish,

    #[error("Ferry started twice")]
    FerryStartedTwice,

    #[error("Ferry finished without arriving to a port")]
    FerryFinishedWithoutArriving,

    #[error("Ferry finished without leaving port {port}")]
    FerryFinishedInPort { port: Location },

    #[error("Ferry must arrive to port 0 after starting, not port {port}")]
    FerryFirstArrivalNotZero { port: Port },

    #[error("Ferry arrived to the same port it departed from (port {port})")]
    FerryArrivedAtSamePort { port: Port },

    #[error("Ferry arrived to port {port} without leaving port {from}")]
    FerryArrivedWithoutLeaving { port: Port, from: Location },

    #[error("Ferry left port {port} twice")]
    FerryLeftTwice { port: Port },

    #[error("Ferry left port {port} without arriving at it first")]
    FerryLeftWithoutArriving { port: Port },

    #[error("Ferry left the wrong port (expected port {expected}, got port {found})")]
    FerryLeftWrongPort { expected: Location, found: Port },

    #[error("Ferry left port while it still had {trucks} trucks and {cars} cars to unload")]
    FerryLeftWithCargo { trucks: u32, cars: u32 },

    #[error("{vehicle} acted before starting")]
    VehicleNotStarted { vehicle: VehicleId },

    #[error("{vehicle} started twice")]
    VehicleStartedTwice { vehicle: VehicleId },

    #[error("{vehicle} arrived when it shouldn't have")]
    VehicleUnexpectedArrival { vehicle: VehicleId },

    #[error("{vehicle} boarded while not waiting to board")]
    BoardedWhileNotWaiting { vehicle: VehicleId },

    #[error("{vehicle} boarded while the ferry is not at a port")]
    BoardedWhileFerryAway { vehicle: VehicleId },

    #[error("{vehicle} boarded at port {port} while the ferry is at port {ferry}")]
    BoardedAtWrongPort {
        vehicle: VehicleId,
        port: Location,
        ferry: Location,
    },

    #[error("{vehicle} boarded while the ferry still had {trucks} trucks and {cars} cars to unload")]
    BoardedBeforeUnloaded {
        vehicle: VehicleId,
        trucks: u32,
        cars: u32,
    },

    #[error("Ferry capacity exceeded (expected {capacity}, measured {measured})")]
    CapacityExceeded { capacity: u32, measured: u32 },

    #[error("{vehicle} left while not on board")]
    LeftWhileNotAboard { vehicle: VehicleId },

    #[error("{vehicle} left after another vehicle boarded (all vehicles must leave before any can board)")]
    LeftAfterBoarding { vehicle: VehicleId },

    #[error("{vehicle} left at the same port it started in (port {port})")]
    LeftAtOriginPort { vehicle: VehicleId, port: Port },

    #[error("{vehicle} left at port {port} while the ferry is at port {ferry}")]
    LeftAtWrongPort {
        vehicle: VehicleId,
        port: Port,
        ferry: Location,
    },

    #[error("Ferry unloaded more {} than it loaded", .kind.plural())]
    UnloadUnderflow { kind: VehicleKind },
}

/// Vehicle counts disagree with the expected bounds, or ids are not dense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CountMismatch {
    #[error("Too many {} started (expected {expected}, found {found})", .kind.plural())]
    TooMany {
        kind: VehicleKind,
        expected: u32,
        found: u32,
    },

    #[error("Too few {} started (expected {expected}, found {found})", .kind.plural())]
    TooFew {
        kind: VehicleKind,
        expected: u32,
        found: u32,
    },

    #[error("'{kind}' processes have a gap in their ids (found {count} processes, highest id is {highest})")]
    IdGap {
        kind: VehicleKind,
        count: u32,
        highest: u32,
    },
}

/// The log ended before every process terminated properly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IncompleteTermination {
    #[error("Ferry didn't finish on the last line")]
    FerryNotFinished,

    #[error("{vehicle} didn't reach its destination")]
    VehicleNotArrived { vehicle: VehicleId },
}

/// A failed analysis: the violation plus the state reached when it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{violation}")]
pub struct Failure {
    pub violation: Violation,
    pub summary: Summary,
}

/// Error running the simulation binary.
#[cfg(feature = "run")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Executable missing or not runnable.
    #[error("Executable not found: {path}: {reason}")]
    NotFound {
        path: std::path::PathBuf,
        reason: String,
    },

    /// The simulation did not exit within the configured timeout.
    #[error("Timeout: simulation did not finish within {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The simulation exited with a failure status.
    #[error("Simulation failed (exit code: {code:?})")]
    NonZeroExit { code: Option<i32> },

    /// IO error while spawning or waiting for the process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "run")]
impl RunError {
    /// Process exit status to report for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::NonZeroExit { code: Some(code) } => *code,
            _ => 1,
        }
    }
}

/// Error from a generated configuration builder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    #[error("{builder}: missing required field '{field}'")]
    MissingRequiredField {
        builder: &'static str,
        field: &'static str,
    },
}

/// Result type alias using ferry-log-check's Error.
pub type CheckResult<T> = std::result::Result<T, Error>;
