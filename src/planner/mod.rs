/*!
    compile-time planning of the bus program, in `std` environment.

    The central resource is the [Scheduler] which collects [TransferRequest]s and places each of them in a bus time-slot satisfying its timing window, then condenses the result into the [Program](crate::program::Program) the engine replays every tick.

    typical flow

    - describe the bus pipeline with a [BusTiming]
    - register transfer requests with [Scheduler::add], or load them from JSON descriptors with [Scheduler::add_descriptors] or [PlanConfig]
    - call [Scheduler::compile] once, it consumes the scheduler and returns a [Schedule] holding the placements and the encoded program

    The program is static: once uploaded nothing can retry or reorder a transfer, so every collision and timing constraint is resolved here, and a request set that cannot be fully placed produces no program at all.
*/

/// pipeline latencies of the bus
mod timing;
/// transfer requests and their resolved placements
mod request;
/// placement of requests in bus time-slots, this is the tricky part of the code
mod scheduler;
/// linear program emission from placed transfers
mod condenser;
/// JSON description of requests and bus settings
mod descriptor;


pub use timing::BusTiming;
pub use request::*;
pub use scheduler::{Scheduler, Schedule};
pub use condenser::condense;
pub use descriptor::*;


use std::string::String;
use thiserror::Error;

/// error raised while configuring or compiling a bus program
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid bus timing: {0}")]
    Timing(&'static str),
    #[error("execution window of request {request} ends before it starts ({earliest} > {latest})")]
    InvertedWindow {
        request: RequestId,
        earliest: i64,
        latest: i64,
    },
    #[error("request {request} addresses station {station} on a bus of {count} stations")]
    Station {
        request: RequestId,
        station: u8,
        count: u16,
    },
    #[error("request {0} is anchored to request {1} which was never added")]
    UnknownAnchor(RequestId, RequestId),
    #[error("resolved execution window of request {0} ends before cycle 0")]
    NegativeWindow(RequestId),
    #[error("execution window of request {0} overflows the cycle range")]
    CycleOverflow(RequestId),
    #[error("descriptor of instruction {index}: {reason}")]
    Descriptor {
        index: u32,
        reason: &'static str,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no free bus slot in the execution window of request {0}")]
    Placement(RequestId),
    #[error("request {0} depends on an anchor chain that never resolves")]
    Unresolved(RequestId),

    #[error("idle gap of {0} cycles does not fit a wait instruction")]
    WaitOverflow(u64),
    #[error("program of {size} instructions does not fit an instruction region of {capacity} words")]
    ProgramTooLarge {
        size: usize,
        capacity: usize,
    },
}
impl Error {
    /**
        true for errors caused by malformed configuration data rather than by the placement search

        neither kind is worth retrying: the compilation is deterministic for a given request set
    */
    pub fn is_configuration(&self) -> bool {
        !matches!(self,
            Self::Placement(_)
            | Self::Unresolved(_)
            | Self::WaitOverflow(_)
            | Self::ProgramTooLarge {..})
    }
    /// request the error is about, if any
    pub fn request(&self) -> Option<RequestId> {
        match *self {
            Self::InvertedWindow {request, ..}
            | Self::Station {request, ..} => Some(request),
            Self::UnknownAnchor(request, _)
            | Self::NegativeWindow(request)
            | Self::CycleOverflow(request)
            | Self::Placement(request)
            | Self::Unresolved(request) => Some(request),
            _ => None,
        }
    }
}

/// human readable name of a request for diagnostics
fn describe(id: RequestId, request: &TransferRequest) -> String {
    match &request.name {
        Some(name) => std::format!("{} ({})", id, name),
        None => std::format!("{}", id),
    }
}
