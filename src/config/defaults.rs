//! System-wide default constants.
//!
//! Centralises tolerances and physical constants shared across the engine.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Geometry
// ============================================================================

/// Boundary de-duplication tolerance (m).
pub const BOUNDARY_TOLERANCE_M: f64 = 1e-6;

/// Tolerance for OD/ID equality and section contiguity during merge (m).
pub const DIAMETER_TOLERANCE_M: f64 = 1e-9;

/// Contiguity tolerance when coalescing displacement segments (m).
pub const SEGMENT_CONTIGUITY_M: f64 = 1e-6;

// ============================================================================
// Physics
// ============================================================================

/// Standard gravity (m/s²).
pub const GRAVITY_MPS2: f64 = 9.80665;

/// Fann dial reading to shear stress: 1 lbf/100ft² = 0.4788 Pa.
pub const DIAL_TO_PA: f64 = 0.4788;

/// Shear rate at 600 rpm on a standard rotational viscometer (1/s).
pub const SHEAR_RATE_600_PER_S: f64 = 1022.0;

/// Litres per minute to m³/s.
pub const LPM_TO_M3_PER_S: f64 = 1.0 / 60_000.0;

/// Hard-default fluid density when neither an active fluid nor a base
/// density is configured (kg/m³).
pub const FALLBACK_DENSITY_KGM3: f64 = 1000.0;

// ============================================================================
// Root finding
// ============================================================================

/// Upper bound on bisection iterations anywhere in the engine.
pub const MAX_SOLVER_ITERATIONS: usize = 96;

/// Default relative tolerance for volume matching.
pub const SOLVER_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Relative volume mismatch tolerated before parcel lengths are rescaled
/// and before a string shortfall becomes its own parcel.
pub const VOLUME_MATCH_TOLERANCE: f64 = 1e-6;

/// Cap on the uniform length rescale applied after parcel placement.
pub const MAX_RESCALE_FACTOR: f64 = 10.0;

// ============================================================================
// Surge / swab
// ============================================================================

/// Peak-to-mean induced annular velocity ratio.
pub const PEAK_VELOCITY_FACTOR: f64 = 1.5;

/// Depth step for the surge/swab sweep (m).
pub const SURGE_SWAB_DEPTH_STEP_M: f64 = 30.0;

/// Row cap for one surge/swab sweep, bottom row included.
pub const MAX_SURGE_SWAB_ROWS: usize = 10_000;

/// Laminar upper bound is `LAMINAR_RE_BASE - RE_N_SLOPE * n`.
pub const LAMINAR_RE_BASE: f64 = 3470.0;

/// Turbulent lower bound is `TURBULENT_RE_BASE - RE_N_SLOPE * n`.
pub const TURBULENT_RE_BASE: f64 = 4270.0;

pub const RE_N_SLOPE: f64 = 1370.0;
