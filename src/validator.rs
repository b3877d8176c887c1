//! Validation engine.
//!
//! Folds the log lines one by one through the ferry and vehicle automata,
//! stopping at the first violation, then runs the end-of-log consistency
//! checks.

use crate::error::{
    CountMismatch, Failure, IncompleteTermination, Position, ProtocolViolation, SequencingError,
    Violation, ViolationKind,
};
use crate::event::{split_line, Action, FerryEvent, LogEntry, VehicleEvent, VehicleId, VehicleKind};
use crate::ferry::{FerryRecord, FerryState, Tally};
use crate::report::Summary;
use crate::trace::{NoopObserver, Observer};
use crate::vehicle::{VehicleRecord, VehicleState};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Expected simulation parameters. `None` means "do not check".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bounds {
    /// Expected number of trucks (N).
    pub trucks: Option<u32>,
    /// Expected number of cars (O).
    pub cars: Option<u32>,
    /// Ferry capacity in car units (K).
    pub capacity: Option<u32>,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trucks(mut self, trucks: u32) -> Self {
        self.trucks = Some(trucks);
        self
    }

    pub fn cars(mut self, cars: u32) -> Self {
        self.cars = Some(cars);
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn expected(&self, kind: VehicleKind) -> Option<u32> {
        match kind {
            VehicleKind::Truck => self.trucks,
            VehicleKind::Car => self.cars,
        }
    }

    /// Whether any count or capacity check will run.
    pub fn checks_anything(&self) -> bool {
        (self.trucks.is_some() && self.cars.is_some()) || self.capacity.is_some()
    }

    /// Weight of all expected vehicles at once, if both counts are known.
    pub fn total_weight(&self) -> Option<u64> {
        let trucks = u64::from(self.trucks?) * u64::from(VehicleKind::Truck.weight());
        let cars = u64::from(self.cars?) * u64::from(VehicleKind::Car.weight());
        Some(trucks + cars)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = [("N", self.trucks), ("O", self.cars), ("K", self.capacity)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
            .collect();
        f.write_str(&params.join(", "))
    }
}

/// Non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum Warning {
    /// The expected vehicles could not all fit at once, yet the ferry never
    /// ran full.
    CapacityUnderutilized { capacity: u32, measured: u32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CapacityUnderutilized { capacity, measured } => write!(
                f,
                "Ferry didn't fully utilize its capacity (expected {capacity}, measured {measured})"
            ),
        }
    }
}

/// State of one analysis run.
///
/// Holds every automaton plus the cross-cutting counters. Nothing is shared
/// between validators, so one process can check any number of logs.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    bounds: Bounds,
    ferry: FerryRecord,
    vehicles: BTreeMap<VehicleId, VehicleRecord>,
    started: Tally,
    previous_index: u64,
    lines: usize,
    finished_on: Option<usize>,
    warnings: Vec<Warning>,
}

impl Validator {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn ferry(&self) -> &FerryRecord {
        &self.ferry
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleRecord> {
        self.vehicles.get(&id)
    }

    /// All vehicles seen so far, trucks first, each kind by ascending id.
    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.vehicles.values()
    }

    /// Number of vehicles started, per kind.
    pub fn started(&self) -> Tally {
        self.started
    }

    /// Number of lines accepted so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Snapshot for the reporter.
    pub fn summary(&self) -> Summary {
        Summary {
            ferry: self.ferry.clone(),
            trucks: self.started.trucks,
            cars: self.started.cars,
            warnings: self.warnings.clone(),
        }
    }

    /// Process every line, then run the end-of-log checks.
    ///
    /// `observer` is called after each accepted line.
    pub fn run<'a, I, O>(&mut self, lines: I, observer: &mut O) -> Result<(), Violation>
    where
        I: IntoIterator<Item = &'a str>,
        O: Observer + ?Sized,
    {
        for line in lines {
            let entry = self.process_line(line)?;
            observer.on_entry(&entry, self);
        }
        self.finish()
    }

    /// Validate the next line of the log.
    pub fn process_line(&mut self, line: &str) -> Result<LogEntry, Violation> {
        let line_no = self.lines + 1;
        let at = |kind: ViolationKind| Violation::new(Position::Line(line_no), kind);

        let raw = split_line(line).map_err(|e| at(e.into()))?;
        if raw.index != self.previous_index + 1 {
            return Err(at(SequencingError::NotConsecutive {
                index: raw.index,
                previous: self.previous_index,
            }
            .into()));
        }
        if raw.index != line_no as u64 {
            return Err(at(SequencingError::PositionMismatch { index: raw.index }.into()));
        }
        self.previous_index = raw.index;
        self.lines = line_no;

        let entry = raw.entry().map_err(|e| at(e.into()))?;
        self.dispatch(entry.action, line_no).map_err(at)?;

        debug!(line = line_no, entry = %entry, "Accepted log entry");
        Ok(entry)
    }

    fn dispatch(&mut self, action: Action, line_no: usize) -> Result<(), ViolationKind> {
        match action {
            Action::Ferry(event) => {
                self.ferry.apply(event)?;
                if event == FerryEvent::Finish {
                    self.finished_on = Some(line_no);
                }
                Ok(())
            }
            Action::Vehicle(id, event) => self.apply_vehicle(id, event),
        }
    }

    fn apply_vehicle(&mut self, id: VehicleId, event: VehicleEvent) -> Result<(), ViolationKind> {
        if event == VehicleEvent::Started {
            if self.vehicles.contains_key(&id) {
                return Err(ProtocolViolation::VehicleStartedTwice { vehicle: id }.into());
            }
            self.vehicles.insert(id, VehicleRecord::new(id));
            let found = self.started.increment(id.kind);
            if let Some(expected) = self.bounds.expected(id.kind) {
                if found > expected {
                    return Err(CountMismatch::TooMany {
                        kind: id.kind,
                        expected,
                        found,
                    }
                    .into());
                }
            }
            return Ok(());
        }

        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or(ProtocolViolation::VehicleNotStarted { vehicle: id })?;
        vehicle.apply(event, &mut self.ferry)?;

        if event == VehicleEvent::Boarding {
            if let Some(capacity) = self.bounds.capacity {
                let measured = self.ferry.measured_capacity;
                if measured > capacity {
                    return Err(ProtocolViolation::CapacityExceeded { capacity, measured }.into());
                }
            }
        }
        Ok(())
    }

    /// End-of-log checks: vehicle counts, capacity use, termination of every
    /// process and dense ids.
    pub fn finish(&mut self) -> Result<(), Violation> {
        let at = Position::EndOfLog { lines: self.lines };

        if let (Some(_), Some(_)) = (self.bounds.trucks, self.bounds.cars) {
            for kind in VehicleKind::ALL {
                self.check_count(kind).map_err(|e| Violation::new(at, e))?;
            }
            self.check_utilization();
        }

        if self.ferry.state != FerryState::Finished || self.finished_on != Some(self.lines) {
            return Err(Violation::new(at, IncompleteTermination::FerryNotFinished));
        }

        for kind in VehicleKind::ALL {
            if let Some(vehicle) = self
                .vehicles_of(kind)
                .find(|v| v.state != VehicleState::Left)
            {
                return Err(Violation::new(
                    at,
                    IncompleteTermination::VehicleNotArrived {
                        vehicle: vehicle.id,
                    },
                ));
            }

            let count = self.started.get(kind);
            let highest = self.vehicles_of(kind).map(|v| v.id.id).max().unwrap_or(0);
            if count != highest {
                return Err(Violation::new(
                    at,
                    CountMismatch::IdGap {
                        kind,
                        count,
                        highest,
                    },
                ));
            }
        }
        Ok(())
    }

    fn vehicles_of(&self, kind: VehicleKind) -> impl Iterator<Item = &VehicleRecord> {
        self.vehicles.values().filter(move |v| v.id.kind == kind)
    }

    fn check_count(&self, kind: VehicleKind) -> Result<(), CountMismatch> {
        let Some(expected) = self.bounds.expected(kind) else {
            return Ok(());
        };
        let found = self.started.get(kind);
        if found < expected {
            return Err(CountMismatch::TooFew {
                kind,
                expected,
                found,
            });
        }
        if found > expected {
            return Err(CountMismatch::TooMany {
                kind,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn check_utilization(&mut self) {
        let (Some(capacity), Some(total)) = (self.bounds.capacity, self.bounds.total_weight())
        else {
            return;
        };
        let measured = self.ferry.measured_capacity;
        if total > u64::from(capacity) && measured < capacity {
            let warning = Warning::CapacityUnderutilized { capacity, measured };
            warn!(capacity, measured, "{warning}");
            self.warnings.push(warning);
        }
    }

    /// Turn the outcome of [`Validator::run`] into the public result type.
    pub fn conclude(&self, outcome: Result<(), Violation>) -> Result<Summary, Failure> {
        match outcome {
            Ok(()) => Ok(self.summary()),
            Err(violation) => Err(Failure {
                violation,
                summary: self.summary(),
            }),
        }
    }
}

/// Analyze a complete log given as lines.
pub fn analyze<'a, I>(lines: I, bounds: Bounds) -> Result<Summary, Failure>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut validator = Validator::new(bounds);
    let outcome = validator.run(lines, &mut NoopObserver);
    validator.conclude(outcome)
}

/// Analyze a complete log given as one string.
pub fn analyze_str(log: &str, bounds: Bounds) -> Result<Summary, Failure> {
    analyze(log.lines(), bounds)
}
