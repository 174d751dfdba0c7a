//! Pumping displacement
//!
//! - `segments` - take-from-bottom, shifts and same-fluid coalescing
//! - `simulator` - stage replay and snapshots

pub mod segments;
pub mod simulator;

pub use segments::{merge_adjacent, shift_down_by_volume, shift_up, take_from_bottom, Parcel};
pub use simulator::{DisplacementSimulator, DisplacementState};
