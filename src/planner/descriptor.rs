/*!
    JSON description of transfer requests, as emitted by the register map loader

    ```json
    {
        "instruction_index": 0,
        "name": "encoder.position",
        "source": {"station": 2, "address": 16},
        "destination": {"station": 0, "address": 4},
        "time_reference_cycle": 0,
        "time_reference_instruction": null,
        "time_reference_instruction_edge": null,
        "execution_window_earliest": 0,
        "execution_window_latest": 10,
        "edge": "write"
    }
    ```

    exactly one of `time_reference_cycle` and `time_reference_instruction` must be set, the latter refers to the `instruction_index` of another descriptor of the same batch
*/

use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    string::String,
    vec::Vec,
    };

use super::{
    Error,
    Scheduler,
    timing::BusTiming,
    request::*,
    };


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// identifier of the descriptor in its batch
    pub instruction_index: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub source: Location,
    pub destination: Location,
    #[serde(default)]
    pub time_reference_cycle: Option<i64>,
    #[serde(default)]
    pub time_reference_instruction: Option<u32>,
    #[serde(default)]
    pub time_reference_instruction_edge: Option<Edge>,
    pub execution_window_earliest: i64,
    pub execution_window_latest: i64,
    pub edge: Edge,
}

/// bus settings and transfer requests of one controller configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub timing: BusTiming,
    #[serde(default)]
    pub requests: Vec<RequestDescriptor>,
}

impl RequestDescriptor {
    fn error(&self, reason: &'static str) -> Error {
        Error::Descriptor {index: self.instruction_index, reason}
    }
    /// build the request, resolving instruction references with the given batch index
    fn request(&self, ids: &HashMap<u32, RequestId>) -> Result<TransferRequest, Error> {
        let anchor = match (self.time_reference_cycle, self.time_reference_instruction) {
            (Some(cycle), None) => Anchor::Cycle(cycle),
            (None, Some(reference)) => Anchor::Transfer {
                request: *ids.get(&reference)
                    .ok_or_else(|| self.error("time reference instruction is not declared"))?,
                edge: self.time_reference_instruction_edge
                    .ok_or_else(|| self.error("time reference instruction has no edge"))?,
                },
            (Some(_), Some(_)) => return Err(self.error("both a time reference cycle and instruction are set")),
            (None, None) => return Err(self.error("no time reference")),
        };
        let mut request = TransferRequest::new(
            self.source,
            self.destination,
            anchor,
            Window::new(self.execution_window_earliest, self.execution_window_latest),
            self.edge,
            );
        request.name = self.name.clone();
        Ok(request)
    }
}

/// convert a batch of descriptors, the first one getting id `first`
pub fn resolve_descriptors(descriptors: &[RequestDescriptor], first: RequestId) -> Result<Vec<TransferRequest>, Error> {
    let mut ids = HashMap::with_capacity(descriptors.len());
    for (offset, descriptor) in descriptors.iter().enumerate() {
        if ids.insert(descriptor.instruction_index, RequestId(first.0 + offset)).is_some()
            {return Err(descriptor.error("instruction index declared twice"))}
    }
    descriptors.iter()
        .map(|descriptor| descriptor.request(&ids))
        .collect()
}

/// parse a JSON array of descriptors into requests numbered from 0
pub fn load_requests(json: &str) -> Result<Vec<TransferRequest>, Error> {
    let descriptors: Vec<RequestDescriptor> = serde_json::from_str(json)?;
    resolve_descriptors(&descriptors, RequestId(0))
}

impl PlanConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.timing.validate()?;
        Ok(config)
    }
    /// scheduler loaded with every request of this configuration
    pub fn scheduler(&self) -> Result<Scheduler, Error> {
        let mut scheduler = Scheduler::new(self.timing)?;
        scheduler.add_descriptors(&self.requests)?;
        Ok(scheduler)
    }
}

impl Scheduler {
    /**
        add a batch of descriptors

        references between descriptors are resolved inside the batch only. Nothing is added if any descriptor is malformed.
    */
    pub fn add_descriptors(&mut self, descriptors: &[RequestDescriptor]) -> Result<Vec<RequestId>, Error> {
        let requests = resolve_descriptors(descriptors, self.next_id())?;
        let mut staged = self.clone();
        let ids = requests.into_iter()
            .map(|request| staged.add(request))
            .collect::<Result<Vec<_>, _>>()?;
        *self = staged;
        Ok(ids)
    }
}
