//! Batch execution module - vetting and the device run loop

mod runner;
mod safety;

pub use runner::*;
pub use safety::*;
