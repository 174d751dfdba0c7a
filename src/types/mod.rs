//! Shared data structures for the wellbore engine
//!
//! - Geometry: annulus and drill-string sections by measured depth
//! - Fluids: catalog specs, rheology, layers, mud steps, pump stages
//! - Survey: MD/TVD stations
//! - Advisories: degraded-condition flags attached to results

mod geometry;
mod fluid;
mod survey;
mod advisory;

pub use geometry::*;
pub use fluid::*;
pub use survey::*;
pub use advisory::*;
