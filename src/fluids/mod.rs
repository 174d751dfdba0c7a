//! Fluid column design
//!
//! - `resolution` - prioritized base-fluid density resolution
//! - `compositor` - per-domain fluid layer partition from mud steps
//! - `stages` - pump stages derived from a column, and the pumping timeline

pub mod compositor;
pub mod resolution;
pub mod stages;

pub use compositor::{overlay, FluidLayerCompositor, LayerColumn};
pub use resolution::{resolve_base_density, BaseFluid, DensitySource, ResolvedDensity};
pub use stages::{derive_pump_stages, PumpSchedule, StagePosition, StageTiming};
