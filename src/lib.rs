//! ferry-log-check: validates logs of the ferry synchronization exercise.
//!
//! A simulation runs one ferry process and many truck (`N`) and car (`O`)
//! processes that cross between port 0 and port 1. Every process writes
//! numbered lines such as `5: N 1: boarding` to a shared log. This crate
//! checks after the fact that the recorded interleaving is one the protocol
//! allows:
//!
//! - line indices run 1, 2, 3, ... without gaps
//! - the ferry and every vehicle only take legal transitions
//! - vehicles board only at the ferry's port and only once everyone who
//!   arrived on it has left
//! - the ferry never carries more than its capacity (trucks weigh 3, cars 1)
//! - at the end the ferry has finished and every vehicle has crossed
//!
//! The first violation stops the analysis.
//!
//! # Quick Start
//!
//! ```
//! use ferry_log_check::{analyze_str, Bounds};
//!
//! let log = "\
//! 1: P: started
//! 2: P: arrived to 0
//! 3: N 1: started
//! 4: N 1: arrived to 0
//! 5: N 1: boarding
//! 6: P: leaving 0
//! 7: P: arrived to 1
//! 8: N 1: leaving in 1
//! 9: P: leaving 1
//! 10: P: finish
//! ";
//!
//! let summary = analyze_str(log, Bounds::new().trucks(1).cars(0)).unwrap();
//! assert_eq!(summary.trucks, 1);
//! assert_eq!(summary.ferry.trips, 2);
//! ```
//!
//! To check a file and print the report the way the `ferry-check` binary
//! does, use [`check_file`].

pub mod batch;
mod builder;
pub mod error;
pub mod event;
pub mod ferry;
pub mod report;
#[cfg(feature = "run")]
pub mod runner;
pub mod trace;
pub mod validator;
pub mod vehicle;

// Re-export core types for convenience
pub use batch::{analyze_file, analyze_files};
pub use error::{
    BuilderError, CheckResult, CountMismatch, Error, Failure, FormatError, IncompleteTermination,
    Position, ProtocolViolation, SequencingError, Violation, ViolationKind,
};
#[cfg(feature = "run")]
pub use error::RunError;
pub use event::{
    parse_line, Action, FerryEvent, Location, LogEntry, Port, VehicleEvent, VehicleId, VehicleKind,
};
pub use ferry::{FerryRecord, FerryState};
pub use report::{check_file, check_file_with, ReportFormat, ReportGuard, Summary};
#[cfg(feature = "run")]
pub use runner::{RunConfig, DEFAULT_LOG};
pub use trace::{NoopObserver, Observer, SnapshotEmitter};
pub use validator::{analyze, analyze_str, Bounds, Validator, Warning};
pub use vehicle::{VehicleRecord, VehicleState};
