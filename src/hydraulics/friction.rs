//! Power-law friction pressure loss
//!
//! Mooney–Rabinowitsch wall shear rate for a power-law fluid, applied per
//! geometry sub-interval of every fluid segment in a flow path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rheology::{resolve_power_law, RheologySource};
use crate::geometry::{circle_area, CapacityIntegrator, SubInterval};
use crate::types::{push_unique, Advisory, Domain, FluidInterval, PowerLaw};

/// Wall shear rate (1/s): ((3n+1)/4n)·8V/Dh.
pub fn wall_shear_rate(n: f64, velocity_mps: f64, hydraulic_diameter_m: f64) -> f64 {
    (3.0 * n + 1.0) / (4.0 * n) * 8.0 * velocity_mps / hydraulic_diameter_m
}

/// Frictional pressure gradient (Pa/m): 4·K·γwⁿ / Dh.
///
/// Zero for a non-positive velocity or diameter.
pub fn friction_gradient_pa_per_m(
    power_law: PowerLaw,
    velocity_mps: f64,
    hydraulic_diameter_m: f64,
) -> f64 {
    if !(velocity_mps > 0.0 && hydraulic_diameter_m > 0.0) || !power_law.is_usable() {
        return 0.0;
    }
    let gamma_w = wall_shear_rate(power_law.n, velocity_mps, hydraulic_diameter_m);
    let tau_w = power_law.k_pa_sn * gamma_w.powf(power_law.n);
    4.0 * tau_w / hydraulic_diameter_m
}

/// Flow area and hydraulic diameter of `domain` over one sub-interval.
pub fn flow_geometry(sub: &SubInterval<'_>, domain: Domain) -> Option<(f64, f64)> {
    match domain {
        Domain::String => sub.string.map(|s| (circle_area(s.inner_diameter_m), s.inner_diameter_m)),
        Domain::Annulus => sub.annulus.map(|a| {
            let od = sub.string_od_m();
            (
                (circle_area(a.inner_diameter_m) - circle_area(od)).max(0.0),
                a.inner_diameter_m - od,
            )
        }),
    }
    .filter(|(area, dh)| *area > 0.0 && *dh > 0.0)
}

/// Friction over one geometry piece of one fluid segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionSegment {
    pub domain: Domain,
    pub top_m: f64,
    pub bottom_m: f64,
    pub fluid: String,
    pub hydraulic_diameter_m: f64,
    pub velocity_mps: f64,
    pub gradient_pa_per_m: f64,
    pub pressure_kpa: f64,
    pub rheology: Option<RheologySource>,
}

/// Total friction (kPa) for `domain` down to `control_md` at `flow_rate_m3s`.
///
/// Fluids without usable rheology contribute 0 and raise `MissingRheology`.
pub fn integrate_friction<I: FluidInterval>(
    domain: Domain,
    intervals: &[I],
    control_md: f64,
    capacity: &CapacityIntegrator<'_>,
    flow_rate_m3s: f64,
    rows: &mut Vec<FrictionSegment>,
    advisories: &mut Vec<Advisory>,
) -> f64 {
    let mut total_kpa = 0.0;
    for seg in intervals {
        let Some(span) = seg.clipped(0.0, control_md) else {
            continue;
        };
        let fluid = seg.fluid();
        let resolved = resolve_power_law(fluid, domain);
        if resolved.is_none() {
            push_unique(
                advisories,
                Advisory::MissingRheology {
                    fluid: fluid.display_name(),
                    domain,
                },
            );
        }
        for sub in capacity.sub_intervals(span.top_m, span.bottom_m) {
            let Some((area, dh)) = flow_geometry(&sub, domain) else {
                continue;
            };
            let velocity = flow_rate_m3s / area;
            let gradient =
                resolved.map_or(0.0, |r| friction_gradient_pa_per_m(r.power_law, velocity, dh));
            let pressure_kpa = gradient * sub.length_m() / 1000.0;
            total_kpa += pressure_kpa;
            rows.push(FrictionSegment {
                domain,
                top_m: sub.top_m,
                bottom_m: sub.bottom_m,
                fluid: fluid.display_name(),
                hydraulic_diameter_m: dh,
                velocity_mps: velocity,
                gradient_pa_per_m: gradient,
                pressure_kpa,
                rheology: resolved.map(|r| r.source),
            });
        }
    }
    debug!(%domain, control_md, friction_kpa = total_kpa, "Friction integrated");
    total_kpa
}
