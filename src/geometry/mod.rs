//! Wellbore geometry engine
//!
//! - `decomposer` - canonical boundary sets for a query range
//! - `capacity` - annular / string / open-hole volume integration
//! - `sections` - annulus section slicing and merging against the drill string

pub mod capacity;
pub mod decomposer;
pub mod sections;

pub use capacity::{circle_area, CapacityIntegrator, VolumeBreakdown, VolumeRates, WellVolumes};
pub use decomposer::{decompose, merged_boundaries, SubInterval};
pub use sections::{
    constant_od_over, merge_contiguous_by_od, normalize_sections, slice_section,
    DrillStringSignature, SectionNormalizer,
};
