use serde::{Deserialize, Serialize};
use super::Error;


/**
    constants of the bus pipeline, fixed for one compilation

    a transfer dispatched at cycle `d` reaches station `s` at `d + dma_dispatch_cycles + (intra_station_cycles + inter_station_cycles) * s`, and the bus needs [Self::full_pass_length] cycles to sweep through every station
*/
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusTiming {
    /// number of stations on the bus, at most 256 since station indices are 8 bit
    pub station_count: u16,
    /// cycles spent inside each station
    pub intra_station_cycles: u32,
    /// cycles spent between two consecutive stations
    pub inter_station_cycles: u32,
    /// fixed latency between the engine dispatching an instruction and the bus starting it
    pub dma_dispatch_cycles: u32,
}

impl BusTiming {
    pub fn new(station_count: u16, intra_station_cycles: u32, inter_station_cycles: u32, dma_dispatch_cycles: u32) -> Result<Self, Error> {
        let timing = Self {station_count, intra_station_cycles, inter_station_cycles, dma_dispatch_cycles};
        timing.validate()?;
        Ok(timing)
    }
    pub fn validate(&self) -> Result<(), Error> {
        if self.station_count == 0
            {return Err(Error::Timing("bus has no station"))}
        if self.station_count > 256
            {return Err(Error::Timing("station indices are limited to 8 bits"))}
        if self.full_pass_length() == 0
            {return Err(Error::Timing("a bus pass must last at least one cycle"))}
        Ok(())
    }
    /// cycles between two consecutive stations, including the station itself
    pub fn station_cycles(&self) -> i64 {
        i64::from(self.intra_station_cycles) + i64::from(self.inter_station_cycles)
    }
    /// cycles for one complete sweep through all stations
    pub fn full_pass_length(&self) -> i64 {
        i64::from(self.station_count) * self.station_cycles() + i64::from(self.dma_dispatch_cycles)
    }
    /// delay between a dispatch and the moment the bus acts on the given station
    pub fn station_delay(&self, station: u8) -> i64 {
        i64::from(self.dma_dispatch_cycles) + self.station_cycles() * i64::from(station)
    }
    /// true if the station index exists on this bus
    pub fn contains(&self, station: u8) -> bool {
        u16::from(station) < self.station_count
    }
}
