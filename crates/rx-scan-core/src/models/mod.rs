//! Domain models for the rx-scan system.

mod medicine;
mod prescription;
mod schedule;

pub use medicine::*;
pub use prescription::*;
pub use schedule::*;
