//! Pressure calculations
//!
//! - `survey` - MD to TVD interpolation
//! - `hydrostatic` - ρ·g·ΔTVD over fluid columns
//! - `rheology` - power-law parameter resolution
//! - `friction` - Mooney–Rabinowitsch friction gradients
//! - `engine` - SBP / BHP / ECD / TCP at a control depth
//! - `surge_swab` - trip-induced pressure sweep

pub mod engine;
pub mod friction;
pub mod hydrostatic;
pub mod rheology;
pub mod surge_swab;
pub mod survey;

pub use engine::{managed_sbp_kpa, HydraulicsEngine, HydraulicsReport};
pub use friction::{
    friction_gradient_pa_per_m, integrate_friction, wall_shear_rate, FrictionSegment,
};
pub use hydrostatic::{equivalent_density_kgm3, hydrostatic_kpa};
pub use rheology::{power_law_from_dials, resolve_power_law, ResolvedRheology, RheologySource};
pub use surge_swab::{
    classify_regime, clinging_constant, eccentricity_factor, generalized_reynolds, FlowRegime,
    SurgeSwabCalculator, SurgeSwabReport, SurgeSwabRow,
};
pub use survey::SurveyProfile;
