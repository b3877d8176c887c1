//! Log line parsing.
//!
//! Every line of a simulation log has the shape `<index>: <actor>: <event>`,
//! for example `7: N 2: leaving in 1`. Parsing happens in two stages so the
//! engine can check line sequencing before the actor and event are
//! interpreted:
//!
//! 1. [`split_line`] separates the three fields and parses the index.
//! 2. [`RawLine::action`] turns the actor and event text into an [`Action`].

use crate::error::FormatError;
use serde::{Serialize, Serializer};
use std::fmt;

/// One of the two ferry terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    Zero,
    One,
}

impl Port {
    /// Parse a port number as written in the log (`"0"` or `"1"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0" => Some(Port::Zero),
            "1" => Some(Port::One),
            _ => None,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Zero => f.write_str("0"),
            Port::One => f.write_str("1"),
        }
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Last known position of the ferry or of a vehicle.
///
/// `Dock` is the initial marker before anything arrived anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    Dock,
    At(Port),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Dock => f.write_str("Dock"),
            Location::At(port) => port.fmt(f),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Vehicle kinds, written `N` (truck) and `O` (car) in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VehicleKind {
    Truck,
    Car,
}

impl VehicleKind {
    /// All kinds, in reporting order.
    pub const ALL: [VehicleKind; 2] = [VehicleKind::Truck, VehicleKind::Car];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(VehicleKind::Truck),
            "O" => Some(VehicleKind::Car),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            VehicleKind::Truck => "N",
            VehicleKind::Car => "O",
        }
    }

    /// Space a vehicle of this kind takes on the ferry, in car units.
    pub fn weight(self) -> u32 {
        match self {
            VehicleKind::Truck => 3,
            VehicleKind::Car => 1,
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            VehicleKind::Truck => "trucks",
            VehicleKind::Car => "cars",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Identity of a vehicle process: its kind plus its 1-based id.
///
/// Ordering is by kind first (trucks before cars), then by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VehicleId {
    pub kind: VehicleKind,
    pub id: u32,
}

impl VehicleId {
    pub fn truck(id: u32) -> Self {
        Self { kind: VehicleKind::Truck, id }
    }

    pub fn car(id: u32) -> Self {
        Self { kind: VehicleKind::Car, id }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Events the ferry process emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FerryEvent {
    Started,
    Finish,
    ArrivedTo(Port),
    Leaving(Port),
}

impl fmt::Display for FerryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FerryEvent::Started => f.write_str("started"),
            FerryEvent::Finish => f.write_str("finish"),
            FerryEvent::ArrivedTo(port) => write!(f, "arrived to {port}"),
            FerryEvent::Leaving(port) => write!(f, "leaving {port}"),
        }
    }
}

/// Events a truck or car process emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleEvent {
    Started,
    ArrivedTo(Port),
    Boarding,
    LeavingIn(Port),
}

impl fmt::Display for VehicleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleEvent::Started => f.write_str("started"),
            VehicleEvent::ArrivedTo(port) => write!(f, "arrived to {port}"),
            VehicleEvent::Boarding => f.write_str("boarding"),
            VehicleEvent::LeavingIn(port) => write!(f, "leaving in {port}"),
        }
    }
}

/// An event attributed to the actor that emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ferry(FerryEvent),
    Vehicle(VehicleId, VehicleEvent),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ferry(event) => write!(f, "P: {event}"),
            Action::Vehicle(id, event) => write!(f, "{id}: {event}"),
        }
    }
}

/// A fully parsed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub index: u64,
    pub action: Action,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.index, self.action)
    }
}

/// A line split into its three fields, with only the index interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub index: u64,
    pub actor: &'a str,
    pub event: &'a str,
}

impl RawLine<'_> {
    /// Interpret the actor and event fields.
    pub fn action(&self) -> Result<Action, FormatError> {
        let words: Vec<&str> = self.event.split_whitespace().collect();
        match parse_actor(self.actor)? {
            None => parse_ferry_event(&words).map(Action::Ferry),
            Some(id) => parse_vehicle_event(&words).map(|event| Action::Vehicle(id, event)),
        }
    }

    pub fn entry(&self) -> Result<LogEntry, FormatError> {
        Ok(LogEntry {
            index: self.index,
            action: self.action()?,
        })
    }
}

/// Split a line into index, actor and event fields.
pub fn split_line(line: &str) -> Result<RawLine<'_>, FormatError> {
    let fields: Vec<&str> = line.split(':').map(str::trim).collect();
    let &[index, actor, event] = fields.as_slice() else {
        return Err(FormatError::FieldCount {
            found: fields.len(),
        });
    };

    let index = index
        .parse::<u64>()
        .map_err(|_| FormatError::InvalidIndex(index.to_string()))?;

    Ok(RawLine {
        index,
        actor,
        event,
    })
}

/// Parse a complete line in one go.
pub fn parse_line(line: &str) -> Result<LogEntry, FormatError> {
    split_line(line)?.entry()
}

/// `None` is the ferry, `Some` a vehicle.
fn parse_actor(actor: &str) -> Result<Option<VehicleId>, FormatError> {
    let words: Vec<&str> = actor.split_whitespace().collect();
    match words.as_slice() {
        ["P"] => Ok(None),
        [code, id] => {
            let kind = VehicleKind::from_code(code)
                .ok_or_else(|| FormatError::UnknownActor(words.join(" ")))?;
            let id = parse_vehicle_number(id)
                .ok_or_else(|| FormatError::UnknownActor(words.join(" ")))?;
            Ok(Some(VehicleId { kind, id }))
        }
        _ => Err(FormatError::UnknownActor(words.join(" "))),
    }
}

fn parse_vehicle_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|&id| id > 0)
}

fn parse_ferry_event(words: &[&str]) -> Result<FerryEvent, FormatError> {
    let event = match words {
        ["started"] => Some(FerryEvent::Started),
        ["finish"] => Some(FerryEvent::Finish),
        ["arrived", "to", port] => Port::parse(port).map(FerryEvent::ArrivedTo),
        ["leaving", port] => Port::parse(port).map(FerryEvent::Leaving),
        _ => None,
    };
    event.ok_or_else(|| FormatError::UnknownEvent(words.join(" ")))
}

fn parse_vehicle_event(words: &[&str]) -> Result<VehicleEvent, FormatError> {
    let event = match words {
        ["started"] => Some(VehicleEvent::Started),
        ["arrived", "to", port] => Port::parse(port).map(VehicleEvent::ArrivedTo),
        ["boarding"] => Some(VehicleEvent::Boarding),
        ["leaving", "in", port] => Port::parse(port).map(VehicleEvent::LeavingIn),
        _ => None,
    };
    event.ok_or_else(|| FormatError::UnknownEvent(words.join(" ")))
}
