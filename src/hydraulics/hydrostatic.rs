//! Hydrostatic pressure of a fluid column

use super::survey::SurveyProfile;
use crate::config::defaults::GRAVITY_MPS2;
use crate::types::FluidInterval;

/// Hydrostatic pressure (kPa) at `limit_md` from a column of fluid intervals.
///
/// Each interval is clipped to `[0, limit_md]` and contributes ρ·g·ΔTVD.
pub fn hydrostatic_kpa<I: FluidInterval>(
    intervals: &[I],
    limit_md: f64,
    survey: &SurveyProfile,
) -> f64 {
    let pa: f64 = intervals
        .iter()
        .filter_map(|seg| {
            let span = seg.clipped(0.0, limit_md)?;
            let dtvd = survey.md_to_tvd(span.bottom_m) - survey.md_to_tvd(span.top_m);
            Some(seg.fluid().density_kgm3 * GRAVITY_MPS2 * dtvd)
        })
        .sum();
    pa / 1000.0
}

/// Pressure (kPa) expressed as an equivalent density over `tvd` (kg/m³).
///
/// Zero when `tvd` is not positive.
pub fn equivalent_density_kgm3(pressure_kpa: f64, tvd: f64) -> f64 {
    if tvd > 0.0 {
        pressure_kpa * 1000.0 / (GRAVITY_MPS2 * tvd)
    } else {
        0.0
    }
}
