//! Ferry automaton.
//!
//! ```text
//! Unknown -> Started -> ArrivedUnloading <-> EnRoute -> Finished
//!                             |                ^
//!                             v                |
//!                       ArrivedBoarding -------+
//! ```
//!
//! Boarding and unloading of vehicles is driven from the vehicle side
//! ([`crate::vehicle`]), which calls back into [`FerryRecord::board`] and
//! [`FerryRecord::unload`].

use crate::error::ProtocolViolation;
use crate::event::{FerryEvent, Location, Port, VehicleKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FerryState {
    #[default]
    Unknown,
    Started,
    ArrivedUnloading,
    ArrivedBoarding,
    EnRoute,
    Finished,
}

impl FerryState {
    /// Moored at a port, either unloading or boarding.
    pub fn is_docked(self) -> bool {
        matches!(self, FerryState::ArrivedUnloading | FerryState::ArrivedBoarding)
    }
}

/// Per-kind vehicle counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub trucks: u32,
    pub cars: u32,
}

impl Tally {
    pub fn get(&self, kind: VehicleKind) -> u32 {
        match kind {
            VehicleKind::Truck => self.trucks,
            VehicleKind::Car => self.cars,
        }
    }

    fn slot_mut(&mut self, kind: VehicleKind) -> &mut u32 {
        match kind {
            VehicleKind::Truck => &mut self.trucks,
            VehicleKind::Car => &mut self.cars,
        }
    }

    /// Add one vehicle of `kind` and return the new count.
    pub fn increment(&mut self, kind: VehicleKind) -> u32 {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Remove one vehicle of `kind`; `None` if there was none.
    pub fn decrement(&mut self, kind: VehicleKind) -> Option<u32> {
        let slot = self.slot_mut(kind);
        *slot = slot.checked_sub(1)?;
        Some(*slot)
    }

    pub fn total(&self) -> u32 {
        self.trucks.saturating_add(self.cars)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Occupied space in car units (a truck counts as three cars).
    pub fn weight(&self) -> u32 {
        VehicleKind::ALL
            .iter()
            .map(|&kind| self.get(kind).saturating_mul(kind.weight()))
            .fold(0, u32::saturating_add)
    }
}

/// State of the single ferry process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FerryRecord {
    /// Last port visited; `Dock` before the first arrival.
    pub port: Location,
    pub state: FerryState,
    /// Vehicles currently on board.
    pub loaded: Tally,
    /// Highest weighted load observed so far.
    pub measured_capacity: u32,
    /// Completed departures.
    pub trips: u32,
}

impl FerryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ferry event, checking its guards.
    pub fn apply(&mut self, event: FerryEvent) -> Result<(), ProtocolViolation> {
        if self.state == FerryState::Finished {
            return Err(ProtocolViolation::FerryActedAfterFinish);
        }

        match event {
            FerryEvent::Started => {
                if self.state != FerryState::Unknown {
                    return Err(ProtocolViolation::FerryStartedTwice);
                }
                self.state = FerryState::Started;
            }

            FerryEvent::Finish => match self.state {
                FerryState::Unknown | FerryState::Started => {
                    return Err(ProtocolViolation::FerryFinishedWithoutArriving);
                }
                FerryState::EnRoute => self.state = FerryState::Finished,
                _ => return Err(ProtocolViolation::FerryFinishedInPort { port: self.port }),
            },

            FerryEvent::ArrivedTo(port) => self.arrive(port)?,

            FerryEvent::Leaving(port) => self.leave(port)?,
        }
        Ok(())
    }

    fn arrive(&mut self, port: Port) -> Result<(), ProtocolViolation> {
        if self.port == Location::Dock && port != Port::Zero {
            return Err(ProtocolViolation::FerryFirstArrivalNotZero { port });
        }
        if self.port == Location::At(port) {
            return Err(ProtocolViolation::FerryArrivedAtSamePort { port });
        }
        if !matches!(self.state, FerryState::Started | FerryState::EnRoute) {
            return Err(ProtocolViolation::FerryArrivedWithoutLeaving {
                port,
                from: self.port,
            });
        }

        self.port = Location::At(port);
        self.state = FerryState::ArrivedUnloading;
        Ok(())
    }

    fn leave(&mut self, port: Port) -> Result<(), ProtocolViolation> {
        if self.state == FerryState::EnRoute && self.port == Location::At(port) {
            return Err(ProtocolViolation::FerryLeftTwice { port });
        }
        if !self.state.is_docked() {
            return Err(ProtocolViolation::FerryLeftWithoutArriving { port });
        }
        if self.port != Location::At(port) {
            return Err(ProtocolViolation::FerryLeftWrongPort {
                expected: self.port,
                found: port,
            });
        }
        if self.state == FerryState::ArrivedUnloading && !self.loaded.is_empty() {
            return Err(ProtocolViolation::FerryLeftWithCargo {
                trucks: self.loaded.trucks,
                cars: self.loaded.cars,
            });
        }

        self.state = FerryState::EnRoute;
        self.trips += 1;
        Ok(())
    }

    /// Whether vehicles from the previous crossing are still aboard while
    /// the ferry is unloading.
    pub fn unloading_pending(&self) -> bool {
        self.state == FerryState::ArrivedUnloading && !self.loaded.is_empty()
    }

    /// Take one vehicle aboard. Returns the updated measured capacity.
    pub(crate) fn board(&mut self, kind: VehicleKind) -> u32 {
        self.state = FerryState::ArrivedBoarding;
        self.loaded.increment(kind);
        self.measured_capacity = self.measured_capacity.max(self.loaded.weight());
        self.measured_capacity
    }

    /// Let one vehicle off.
    pub(crate) fn unload(&mut self, kind: VehicleKind) -> Result<(), ProtocolViolation> {
        self.loaded
            .decrement(kind)
            .map(|_| ())
            .ok_or(ProtocolViolation::UnloadUnderflow { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_port_zero() -> FerryRecord {
        let mut ferry = FerryRecord::new();
        ferry.apply(FerryEvent::Started).unwrap();
        ferry.apply(FerryEvent::ArrivedTo(Port::Zero)).unwrap();
        ferry
    }

    #[test]
    fn full_round_trip() {
        let mut ferry = at_port_zero();
        assert_eq!(ferry.state, FerryState::ArrivedUnloading);
        assert_eq!(ferry.port, Location::At(Port::Zero));

        ferry.apply(FerryEvent::Leaving(Port::Zero)).unwrap();
        ferry.apply(FerryEvent::ArrivedTo(Port::One)).unwrap();
        ferry.apply(FerryEvent::Leaving(Port::One)).unwrap();
        ferry.apply(FerryEvent::Finish).unwrap();

        assert_eq!(ferry.state, FerryState::Finished);
        assert_eq!(ferry.trips, 2);
    }

    #[test]
    fn cannot_start_twice() {
        let mut ferry = FerryRecord::new();
        ferry.apply(FerryEvent::Started).unwrap();
        assert_eq!(
            ferry.apply(FerryEvent::Started),
            Err(ProtocolViolation::FerryStartedTwice)
        );
    }

    #[test]
    fn first_arrival_must_be_port_zero() {
        let mut ferry = FerryRecord::new();
        ferry.apply(FerryEvent::Started).unwrap();
        assert_eq!(
            ferry.apply(FerryEvent::ArrivedTo(Port::One)),
            Err(ProtocolViolation::FerryFirstArrivalNotZero { port: Port::One })
        );
    }

    #[test]
    fn arrival_requires_a_departure() {
        let mut ferry = at_port_zero();
        assert_eq!(
            ferry.apply(FerryEvent::ArrivedTo(Port::Zero)),
            Err(ProtocolViolation::FerryArrivedAtSamePort { port: Port::Zero })
        );
        assert_eq!(
            ferry.apply(FerryEvent::ArrivedTo(Port::One)),
            Err(ProtocolViolation::FerryArrivedWithoutLeaving {
                port: Port::One,
                from: Location::At(Port::Zero),
            })
        );
    }

    #[test]
    fn leaving_guards() {
        let mut ferry = at_port_zero();
        assert_eq!(
            ferry.apply(FerryEvent::Leaving(Port::One)),
            Err(ProtocolViolation::FerryLeftWrongPort {
                expected: Location::At(Port::Zero),
                found: Port::One,
            })
        );

        ferry.apply(FerryEvent::Leaving(Port::Zero)).unwrap();
        assert_eq!(
            ferry.apply(FerryEvent::Leaving(Port::Zero)),
            Err(ProtocolViolation::FerryLeftTwice { port: Port::Zero })
        );
        assert_eq!(
            ferry.apply(FerryEvent::Leaving(Port::One)),
            Err(ProtocolViolation::FerryLeftWithoutArriving { port: Port::One })
        );
    }

    #[test]
    fn cannot_leave_before_unloading() {
        let mut ferry = at_port_zero();
        ferry.board(VehicleKind::Car);
        ferry.apply(FerryEvent::Leaving(Port::Zero)).unwrap();
        ferry.apply(FerryEvent::ArrivedTo(Port::One)).unwrap();

        assert!(ferry.unloading_pending());
        assert_eq!(
            ferry.apply(FerryEvent::Leaving(Port::One)),
            Err(ProtocolViolation::FerryLeftWithCargo { trucks: 0, cars: 1 })
        );
    }

    #[test]
    fn finish_guards() {
        let mut ferry = FerryRecord::new();
        ferry.apply(FerryEvent::Started).unwrap();
        assert_eq!(
            ferry.apply(FerryEvent::Finish),
            Err(ProtocolViolation::FerryFinishedWithoutArriving)
        );

        let mut ferry = at_port_zero();
        assert_eq!(
            ferry.apply(FerryEvent::Finish),
            Err(ProtocolViolation::FerryFinishedInPort {
                port: Location::At(Port::Zero)
            })
        );
    }

    #[test]
    fn nothing_after_finish() {
        let mut ferry = at_port_zero();
        ferry.apply(FerryEvent::Leaving(Port::Zero)).unwrap();
        ferry.apply(FerryEvent::Finish).unwrap();
        assert_eq!(
            ferry.apply(FerryEvent::ArrivedTo(Port::One)),
            Err(ProtocolViolation::FerryActedAfterFinish)
        );
    }

    #[test]
    fn measured_capacity_is_a_running_maximum() {
        let mut ferry = at_port_zero();
        assert_eq!(ferry.board(VehicleKind::Truck), 3);
        assert_eq!(ferry.board(VehicleKind::Car), 4);
        assert_eq!(ferry.state, FerryState::ArrivedBoarding);

        ferry.unload(VehicleKind::Truck).unwrap();
        assert_eq!(ferry.loaded.weight(), 1);
        assert_eq!(ferry.measured_capacity, 4);
    }

    #[test]
    fn unload_underflow_is_reported() {
        let mut ferry = at_port_zero();
        assert_eq!(
            ferry.unload(VehicleKind::Car),
            Err(ProtocolViolation::UnloadUnderflow {
                kind: VehicleKind::Car
            })
        );
    }
}
