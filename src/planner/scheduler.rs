use log::*;
use std::{
    collections::BTreeMap,
    vec::Vec,
    };

use crate::program::Program;
use super::{
    Error,
    describe,
    condense,
    timing::BusTiming,
    request::*,
    };


/**
    collects transfer requests and compiles them into a static bus program

    a scheduler is used for one compilation only: [Self::compile] consumes it
*/
#[derive(Clone, Debug)]
pub struct Scheduler {
    timing: BusTiming,
    requests: Vec<TransferRequest>,
}

/// result of a successful compilation
#[derive(Clone, Debug)]
pub struct Schedule {
    timing: BusTiming,
    requests: Vec<TransferRequest>,
    placements: Vec<Placement>,
    placeholders: Vec<Placeholder>,
    order: Vec<RequestId>,
    program: Program,
}

/// what occupies a bus time-slot
#[derive(Copy, Clone, Debug)]
enum Occupant {
    Transfer(RequestId),
    Placeholder(RequestId),
}

/// placement state of one compilation
struct Placer<'s> {
    timing: &'s BusTiming,
    requests: &'s [TransferRequest],
    placements: Vec<Option<Placement>>,
    slots: BTreeMap<i64, Occupant>,
    order: Vec<RequestId>,
}


impl Scheduler {
    pub fn new(timing: BusTiming) -> Result<Self, Error> {
        timing.validate()?;
        Ok(Self {
            timing,
            requests: Vec::new(),
        })
    }
    pub fn timing(&self) -> &BusTiming {&self.timing}
    pub fn requests(&self) -> &[TransferRequest] {&self.requests}
    pub fn len(&self) -> usize {self.requests.len()}
    pub fn is_empty(&self) -> bool {self.requests.is_empty()}

    /// id the next added request will get
    pub fn next_id(&self) -> RequestId {
        RequestId(self.requests.len())
    }

    /**
        register a request for the next compilation

        malformed requests are rejected here and never reach placement. Anchors may reference requests not added yet, they are checked by [Self::compile]
    */
    pub fn add(&mut self, request: TransferRequest) -> Result<RequestId, Error> {
        let id = self.next_id();
        if !request.window.is_ordered() {
            return Err(Error::InvertedWindow {
                request: id,
                earliest: request.window.earliest,
                latest: request.window.latest,
                })
        }
        for station in [request.source.station, request.destination.station] {
            if !self.timing.contains(station) {
                return Err(Error::Station {
                    request: id,
                    station,
                    count: self.timing.station_count,
                    })
            }
        }
        trace!("added request {}", describe(id, &request));
        self.requests.push(request);
        Ok(id)
    }

    /**
        place every request and encode the resulting program

        requests with the tightest windows are placed first, a request anchored to another one waits until its anchor is placed. The first request that cannot be placed aborts the compilation.
    */
    pub fn compile(self) -> Result<Schedule, Error> {
        for (index, request) in self.requests.iter().enumerate() {
            if let Some(anchor) = request.dependency() {
                if anchor.0 >= self.requests.len()
                    {return Err(Error::UnknownAnchor(RequestId(index), anchor))}
            }
        }
        info!("placing {} transfers on a bus pass of {} cycles",
            self.requests.len(), self.timing.full_pass_length());

        let mut placer = Placer {
            timing: &self.timing,
            requests: &self.requests,
            placements: self.requests.iter().map(|_| None).collect(),
            slots: BTreeMap::new(),
            order: Vec::with_capacity(self.requests.len()),
        };
        placer.run()?;

        let program = condense(&self.timing, placer.transfers())?;
        let Placer {slots, placements, order, ..} = placer;
        let placeholders = slots.iter()
            .filter_map(|(&dispatch_cycle, occupant)| match *occupant {
                Occupant::Placeholder(shields) => Some(Placeholder {dispatch_cycle, shields}),
                Occupant::Transfer(_) => None,
                })
            .collect();
        // run() only returns once every request is placed
        let placements = placements.into_iter().flatten().collect();
        info!("bus program compiled: {} instructions, {} cycles per replay",
            program.len(), program.cycles());

        Ok(Schedule {
            timing: self.timing,
            requests: self.requests,
            placements,
            placeholders,
            order,
            program,
        })
    }
}

impl Placer<'_> {
    fn placed(&self, id: RequestId) -> bool {
        self.placements[id.0].is_some()
    }
    fn free(&self, cycle: i64) -> bool {
        !self.slots.contains_key(&cycle)
    }

    /// smallest-window-first placement, gated by anchor resolution
    fn run(&mut self) -> Result<(), Error> {
        let mut threshold = 0;
        loop {
            let mut progress = false;
            let mut next = None::<u64>;
            for index in 0 .. self.requests.len() {
                let id = RequestId(index);
                if self.placed(id)
                    {continue}
                let request = &self.requests[index];
                if let Some(anchor) = request.dependency() {
                    if !self.placed(anchor)
                        {continue}
                }
                let size = request.window.size();
                if size <= threshold {
                    self.place(id)?;
                    progress = true;
                }
                else {
                    next = Some(next.map_or(size, |next| next.min(size)));
                }
            }
            match next {
                Some(size) => threshold = size,
                None if progress => {},
                None => break,
            }
        }

        // everything left waits on an anchor that never got placed
        if let Some(index) = self.placements.iter().position(Option::is_none) {
            let id = self.circular(RequestId(index));
            error!("request {} is part of a circular anchor chain", describe(id, &self.requests[id.0]));
            return Err(Error::Unresolved(id));
        }
        Ok(())
    }

    /// follow the anchors of an unplaced request until one repeats, that one is on the loop
    fn circular(&self, start: RequestId) -> RequestId {
        let mut seen = std::vec![false; self.requests.len()];
        let mut id = start;
        while !seen[id.0] {
            seen[id.0] = true;
            match self.requests[id.0].dependency() {
                Some(anchor) => id = anchor,
                None => return start,
            }
        }
        id
    }

    /// find the earliest free bus slot satisfying the request's window
    fn place(&mut self, id: RequestId) -> Result<(), Error> {
        let timing = self.timing;
        let request = &self.requests[id.0];
        let base = match request.anchor {
            Anchor::Cycle(cycle) => cycle,
            Anchor::Transfer {request: anchor, edge} => self.placements[anchor.0]
                .ok_or(Error::Unresolved(id))?
                .edge(edge),
        };
        let latest = base.checked_add(request.window.latest) .ok_or(Error::CycleOverflow(id))?;
        if latest < 0
            {return Err(Error::NegativeWindow(id))}
        let window = request.window.resolve(base) .ok_or(Error::CycleOverflow(id))?;

        let pass = timing.full_pass_length();
        let delay = timing.station_delay(request.edge_station());
        // an edge earlier than its station delay would need a negative dispatch
        let candidates = window.start.max(delay) .. window.end;
        for cycle in candidates {
            let dispatch = cycle - delay;

            let placement = if request.wraps() {
                // the real transfer always runs one pass before its placeholder
                let (real, shadow) = match request.edge {
                    Edge::Write => (dispatch.checked_sub(pass), Some(dispatch)),
                    Edge::Read => (Some(dispatch), dispatch.checked_add(pass)),
                };
                let (Some(real), Some(shadow)) = (real, shadow)
                    else {return Err(Error::CycleOverflow(id))};
                if !self.free(real) || !self.free(shadow)
                    {continue}
                let placement = self.resolve(id, real, true)?;
                self.slots.insert(shadow, Occupant::Placeholder(id));
                debug!("placeholder at cycle {} shields request {}", shadow, id);
                placement
            }
            else {
                if !self.free(dispatch)
                    {continue}
                self.resolve(id, dispatch, false)?
            };
            self.slots.insert(placement.dispatch_cycle, Occupant::Transfer(id));
            self.placements[id.0] = Some(placement);
            self.order.push(id);
            debug!("placed request {} at cycle {} (read {}, write {})",
                describe(id, request),
                placement.dispatch_cycle, placement.read_cycle, placement.write_cycle);
            return Ok(());
        }

        error!("no free bus slot for request {} in cycles {:?}", describe(id, request), window);
        Err(Error::Placement(id))
    }

    fn resolve(&self, id: RequestId, dispatch: i64, wrapped: bool) -> Result<Placement, Error> {
        let request = &self.requests[id.0];
        let carry = if wrapped {self.timing.full_pass_length()} else {0};
        let read = dispatch.checked_add(self.timing.station_delay(request.source.station));
        let write = dispatch.checked_add(self.timing.station_delay(request.destination.station))
            .and_then(|write| write.checked_add(carry));
        match (read, write) {
            (Some(read_cycle), Some(write_cycle)) => Ok(Placement {
                dispatch_cycle: dispatch,
                read_cycle,
                write_cycle,
                wrapped,
                }),
            _ => Err(Error::CycleOverflow(id)),
        }
    }

    /// placed transfers in ascending dispatch order, placeholders excluded
    fn transfers(&self) -> impl Iterator<Item=(i64, &TransferRequest)> + '_ {
        self.slots.iter().filter_map(|(&cycle, occupant)| match *occupant {
            Occupant::Transfer(id) => Some((cycle, &self.requests[id.0])),
            Occupant::Placeholder(_) => None,
            })
    }
}


impl Schedule {
    pub fn timing(&self) -> &BusTiming {&self.timing}
    pub fn program(&self) -> &Program {&self.program}
    pub fn into_program(self) -> Program {self.program}
    pub fn placeholders(&self) -> &[Placeholder] {&self.placeholders}
    /// request ids in the order they were placed
    pub fn order(&self) -> &[RequestId] {&self.order}

    pub fn request(&self, id: RequestId) -> Option<&TransferRequest> {
        self.requests.get(id.0)
    }
    pub fn placement(&self, id: RequestId) -> Option<&Placement> {
        self.placements.get(id.0)
    }
    /// every request with its placement, in submission order
    pub fn placements(&self) -> impl Iterator<Item=(RequestId, &TransferRequest, &Placement)> + '_ {
        self.requests.iter()
            .zip(&self.placements)
            .enumerate()
            .map(|(index, (request, placement))| (RequestId(index), request, placement))
    }
    /**
        absolute cycles the request's window accepted, as resolved from its anchor

        it always contains the placed request's constrained edge, also for wrapped transfers
    */
    pub fn window(&self, id: RequestId) -> Option<core::ops::Range<i64>> {
        let request = self.requests.get(id.0)?;
        let base = match request.anchor {
            Anchor::Cycle(cycle) => cycle,
            Anchor::Transfer {request, edge} => self.placements.get(request.0)?.edge(edge),
        };
        request.window.resolve(base)
    }
}
