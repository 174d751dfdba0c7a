//! Wellbore Engine: geometry, fluid column and pressure core for well control
//!
//! Deterministic calculations over a well's annulus and drill-string
//! geometry and the fluids occupying it.
//!
//! ## Architecture
//!
//! - **Geometry**: interval decomposition, capacity integration, section normalization
//! - **Fluids**: base-fluid resolution, layer compositing, pump stages
//! - **Displacement**: stage-by-stage replay of a pumping program
//! - **Hydraulics**: hydrostatics, power-law friction, SBP/BHP/ECD/TCP, surge and swab
//!
//! The numerical core never returns an error. Degraded inputs produce a safe
//! numeric default plus an [`Advisory`] on the result.

pub mod config;
pub mod displacement;
pub mod fluids;
pub mod geometry;
pub mod hydraulics;
pub mod scenario;
pub mod solver;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, EngineConfig};

// Re-export commonly used types
pub use types::{
    Advisory, AnnulusSection, Domain, DrillStringSection, FluidLayer, FluidSegment, FluidSpec,
    GeometryModel, MudStep, Placement, PumpStage, SurveyStation,
};

// Re-export engine components
pub use displacement::{DisplacementSimulator, DisplacementState};
pub use fluids::{derive_pump_stages, FluidLayerCompositor, LayerColumn, PumpSchedule};
pub use geometry::{CapacityIntegrator, SectionNormalizer, VolumeBreakdown, WellVolumes};
pub use hydraulics::{
    HydraulicsEngine, HydraulicsReport, SurgeSwabCalculator, SurgeSwabReport, SurveyProfile,
};

// Re-export storage and scenario input
pub use scenario::{Scenario, ScenarioError};
pub use storage::{LayerStore, MemoryLayerStore, SledLayerStore, StoreError};
