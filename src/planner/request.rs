use core::{
    fmt,
    ops::Range,
    };
use serde::{Deserialize, Serialize};
use std::string::String;

pub use crate::instruction::Location;


/// index of a request in the order it was added to the [Scheduler](super::Scheduler)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub usize);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// physical event of a transfer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// data leaves the source station
    Read,
    /// data lands in the destination station
    Write,
}

/// what a request's execution window is relative to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// absolute bus cycle
    Cycle(i64),
    /// resolved event of another request, which must be placed first
    Transfer {
        request: RequestId,
        edge: Edge,
    },
}

/**
    offsets in bus cycles relative to an [Anchor], the window covers `earliest .. latest`

    a window with `earliest == latest` is an exact offset: only `earliest` is accepted
*/
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub earliest: i64,
    pub latest: i64,
}
impl Window {
    pub const fn new(earliest: i64, latest: i64) -> Self {
        Self {earliest, latest}
    }
    pub const fn exact(offset: i64) -> Self {
        Self {earliest: offset, latest: offset}
    }
    pub fn is_ordered(&self) -> bool {
        self.earliest <= self.latest
    }
    /// placement priority, smallest windows are placed first
    pub fn size(&self) -> u64 {
        self.latest.abs_diff(self.earliest)
    }
    /// absolute cycles accepted when the anchor resolves to `base`, or `None` on overflow
    pub fn resolve(&self, base: i64) -> Option<Range<i64>> {
        let start = base.checked_add(self.earliest)?;
        let end = base.checked_add(self.latest)?;
        Some(start .. end.max(start.checked_add(1)?))
    }
}

/**
    one register-to-register copy the bus program must perform

    `edge` tells which of the two physical events of the copy the window constrains
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// label used in logs and errors
    pub name: Option<String>,
    pub source: Location,
    pub destination: Location,
    pub anchor: Anchor,
    pub window: Window,
    pub edge: Edge,
}
impl TransferRequest {
    pub fn new(source: Location, destination: Location, anchor: Anchor, window: Window, edge: Edge) -> Self {
        Self {name: None, source, destination, anchor, window, edge}
    }
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    /// request that must be placed before this one
    pub fn dependency(&self) -> Option<RequestId> {
        match self.anchor {
            Anchor::Transfer {request, ..} => Some(request),
            Anchor::Cycle(_) => None,
        }
    }
    /// station whose event is constrained by the window
    pub fn edge_station(&self) -> u8 {
        match self.edge {
            Edge::Write => self.destination.station,
            Edge::Read => self.source.station,
        }
    }
    /**
        true if the destination cannot be reached in the station sweep that starts at dispatch

        such a transfer completes during the following pass
    */
    pub fn wraps(&self) -> bool {
        self.destination.station <= self.source.station
    }
}

/// resolved state of a placed request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// bus time-slot occupied by the transfer
    pub dispatch_cycle: i64,
    /// cycle data leaves the source station
    pub read_cycle: i64,
    /// cycle data lands in the destination station
    pub write_cycle: i64,
    /// the transfer was moved one pass earlier and completes in the following pass
    pub wrapped: bool,
}
impl Placement {
    pub fn edge(&self, edge: Edge) -> i64 {
        match edge {
            Edge::Read => self.read_cycle,
            Edge::Write => self.write_cycle,
        }
    }
}

/// non-executable reservation of a bus time-slot logically belonging to a wrapped transfer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub dispatch_cycle: i64,
    /// the wrapped transfer this slot is shielding
    pub shields: RequestId,
}
