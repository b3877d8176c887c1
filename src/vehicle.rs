//! Vehicle automaton: `Started -> Waiting -> Boarded -> Left`.
//!
//! One [`VehicleRecord`] exists per truck or car id. Creation on the
//! `started` event is handled by the validator, which also owns the per-kind
//! counters; everything after that goes through [`VehicleRecord::apply`].

use crate::error::ProtocolViolation;
use crate::event::{Location, VehicleEvent, VehicleId};
use crate::ferry::{FerryRecord, FerryState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VehicleState {
    #[default]
    Started,
    Waiting,
    Boarded,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRecord {
    pub id: VehicleId,
    /// Port the vehicle queued at; `Dock` until it arrives.
    pub port: Location,
    pub state: VehicleState,
}

impl VehicleRecord {
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            port: Location::Dock,
            state: VehicleState::Started,
        }
    }

    /// Apply an event of this vehicle. Boarding and leaving also update the
    /// ferry's load.
    pub fn apply(
        &mut self,
        event: VehicleEvent,
        ferry: &mut FerryRecord,
    ) -> Result<(), ProtocolViolation> {
        let vehicle = self.id;
        match event {
            VehicleEvent::Started => {
                return Err(ProtocolViolation::VehicleStartedTwice { vehicle });
            }

            VehicleEvent::ArrivedTo(port) => {
                if self.state != VehicleState::Started {
                    return Err(ProtocolViolation::VehicleUnexpectedArrival { vehicle });
                }
                self.state = VehicleState::Waiting;
                self.port = Location::At(port);
            }

            VehicleEvent::Boarding => {
                if self.state != VehicleState::Waiting {
                    return Err(ProtocolViolation::BoardedWhileNotWaiting { vehicle });
                }
                if !ferry.state.is_docked() {
                    return Err(ProtocolViolation::BoardedWhileFerryAway { vehicle });
                }
                if ferry.port != self.port {
                    return Err(ProtocolViolation::BoardedAtWrongPort {
                        vehicle,
                        port: self.port,
                        ferry: ferry.port,
                    });
                }
                if ferry.unloading_pending() {
                    return Err(ProtocolViolation::BoardedBeforeUnloaded {
                        vehicle,
                        trucks: ferry.loaded.trucks,
                        cars: ferry.loaded.cars,
                    });
                }
                self.state = VehicleState::Boarded;
                ferry.board(vehicle.kind);
            }

            VehicleEvent::LeavingIn(port) => {
                if self.state != VehicleState::Boarded {
                    return Err(ProtocolViolation::LeftWhileNotAboard { vehicle });
                }
                // unloading at a stop must be over before anyone boards
                if ferry.state == FerryState::ArrivedBoarding {
                    return Err(ProtocolViolation::LeftAfterBoarding { vehicle });
                }
                if self.port == Location::At(port) {
                    return Err(ProtocolViolation::LeftAtOriginPort { vehicle, port });
                }
                if ferry.port != Location::At(port) {
                    return Err(ProtocolViolation::LeftAtWrongPort {
                        vehicle,
                        port,
                        ferry: ferry.port,
                    });
                }
                self.state = VehicleState::Left;
                ferry.unload(vehicle.kind)?;
            }
        }
        Ok(())
    }
}
