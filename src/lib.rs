#![no_std]
#[cfg(feature = "std")]
extern crate std;

mod utils;


pub mod instruction;
pub mod program;
#[cfg(feature = "planner")]
pub mod planner;
