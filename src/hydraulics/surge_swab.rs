//! Trip surge and swab
//!
//! Sweeps the pipe bottom across a depth range. At each depth the annular
//! velocity induced by moving pipe drives the power-law friction gradient
//! over every annulus piece above the pipe bottom. Running in raises
//! pressure (surge), pulling out lowers it (swab).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::friction::friction_gradient_pa_per_m;
use super::hydrostatic::{equivalent_density_kgm3, hydrostatic_kpa};
use super::rheology::resolve_power_law;
use super::survey::SurveyProfile;
use crate::config::defaults::{
    BOUNDARY_TOLERANCE_M, LAMINAR_RE_BASE, MAX_SURGE_SWAB_ROWS, RE_N_SLOPE, SURGE_SWAB_DEPTH_STEP_M,
    TURBULENT_RE_BASE,
};
use crate::config::{PipeEnd, SurgeSwabConfig};
use crate::geometry::{circle_area, CapacityIntegrator};
use crate::types::{push_unique, Advisory, Domain, FluidInterval, PowerLaw};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    Laminar,
    Transitional,
    Turbulent,
}

/// Clinging constant for diameter ratio `alpha` = pipe OD / hole ID.
///
/// Kc = 1/(2·ln(1/α)) − α²/(1 − α²), clamped to [0, 1].
pub fn clinging_constant(alpha: f64) -> f64 {
    if !(alpha > 0.0) {
        return 0.0;
    }
    if alpha >= 1.0 {
        return 0.5;
    }
    let a2 = alpha * alpha;
    (1.0 / (2.0 * (1.0 / alpha).ln()) - a2 / (1.0 - a2)).clamp(0.0, 1.0)
}

/// Haciislamoglu eccentric-annulus friction multiplier, clamped to [0.1, 1].
pub fn eccentricity_factor(n: f64, eccentricity: f64, alpha: f64) -> f64 {
    let e = eccentricity.clamp(0.0, 1.0);
    if e == 0.0 || !(n > 0.0) {
        return 1.0;
    }
    let sqrt_n = n.sqrt();
    let r = 1.0 - 0.072 * (e / n) * alpha.powf(0.8454) - 1.5 * e * e * sqrt_n * alpha.powf(0.1852)
        + 0.96 * e.powi(3) * sqrt_n * alpha.powf(0.2527);
    r.clamp(0.1, 1.0)
}

/// Metzner–Reed generalized Reynolds number.
pub fn generalized_reynolds(
    density_kgm3: f64,
    velocity_mps: f64,
    hydraulic_diameter_m: f64,
    power_law: PowerLaw,
) -> f64 {
    let PowerLaw { k_pa_sn: k, n } = power_law;
    if !(velocity_mps > 0.0 && hydraulic_diameter_m > 0.0) || !power_law.is_usable() {
        return 0.0;
    }
    density_kgm3 * velocity_mps.powf(2.0 - n) * hydraulic_diameter_m.powf(n)
        / (k * 8f64.powf(n - 1.0) * ((3.0 * n + 1.0) / (4.0 * n)).powf(n))
}

/// Laminar below 3470 − 1370n, turbulent above 4270 − 1370n.
pub fn classify_regime(reynolds: f64, n: f64) -> FlowRegime {
    if reynolds < LAMINAR_RE_BASE - RE_N_SLOPE * n {
        FlowRegime::Laminar
    } else if reynolds > TURBULENT_RE_BASE - RE_N_SLOPE * n {
        FlowRegime::Turbulent
    } else {
        FlowRegime::Transitional
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgeSwabRow {
    pub depth_md: f64,
    pub depth_tvd: f64,
    pub hydrostatic_kpa: f64,
    pub surge_kpa: f64,
    pub swab_kpa: f64,
    pub surge_emw_kgm3: f64,
    pub swab_emw_kgm3: f64,
    /// Most turbulent regime seen above the pipe bottom; `None` without flow.
    pub surge_regime: Option<FlowRegime>,
    pub swab_regime: Option<FlowRegime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurgeSwabReport {
    pub rows: Vec<SurgeSwabRow>,
    pub max_surge_kpa: f64,
    pub max_surge_depth_md: Option<f64>,
    pub max_swab_kpa: f64,
    pub max_swab_depth_md: Option<f64>,
    pub advisories: Vec<Advisory>,
}

/// Pressure change and worst regime for one trip speed.
#[derive(Debug, Clone, Copy, Default)]
struct TripLoss {
    pressure_kpa: f64,
    regime: Option<FlowRegime>,
}

pub struct SurgeSwabCalculator<'a> {
    capacity: CapacityIntegrator<'a>,
    survey: &'a SurveyProfile,
    config: &'a SurgeSwabConfig,
}

impl<'a> SurgeSwabCalculator<'a> {
    pub const fn new(
        capacity: CapacityIntegrator<'a>,
        survey: &'a SurveyProfile,
        config: &'a SurgeSwabConfig,
    ) -> Self {
        Self {
            capacity,
            survey,
            config,
        }
    }

    fn depth_stations(&self, top_md: f64, bottom_md: f64) -> Vec<f64> {
        let step = if self.config.depth_step_m > 0.0 {
            self.config.depth_step_m
        } else {
            SURGE_SWAB_DEPTH_STEP_M
        };
        let span = bottom_md - top_md;
        let count = ((span / step).ceil() as usize).min(MAX_SURGE_SWAB_ROWS - 1);
        let mut depths: Vec<f64> = (0..count)
            .map(|i| top_md + i as f64 * step)
            .take_while(|&d| d < bottom_md - BOUNDARY_TOLERANCE_M)
            .collect();
        depths.push(bottom_md);
        depths
    }

    /// Friction from pipe moving at `pipe_speed_mps` with its bottom at `depth`.
    fn trip_loss<A: FluidInterval>(
        &self,
        annulus: &[A],
        depth: f64,
        pipe_speed_mps: f64,
        advisories: &mut Vec<Advisory>,
    ) -> TripLoss {
        let mut loss = TripLoss::default();
        if !(pipe_speed_mps > 0.0) {
            return loss;
        }
        for seg in annulus {
            let Some(span) = seg.clipped(0.0, depth) else {
                continue;
            };
            let fluid = seg.fluid();
            let Some(resolved) = resolve_power_law(fluid, Domain::Annulus) else {
                push_unique(
                    advisories,
                    Advisory::MissingRheology {
                        fluid: fluid.display_name(),
                        domain: Domain::Annulus,
                    },
                );
                continue;
            };
            let pl = resolved.power_law;
            for sub in self.capacity.sub_intervals(span.top_m, span.bottom_m) {
                let (Some(hole), Some(pipe)) = (sub.annulus, sub.string) else {
                    continue;
                };
                let (hole_id, od) = (hole.inner_diameter_m, pipe.outer_diameter_m);
                let annular_area = (circle_area(hole_id) - circle_area(od)).max(0.0);
                let dh = hole_id - od;
                if !(annular_area > 0.0 && dh > 0.0) {
                    continue;
                }
                let displaced_area = match self.config.pipe_end {
                    PipeEnd::Closed => circle_area(od),
                    PipeEnd::Open => {
                        (circle_area(od) - circle_area(pipe.inner_diameter_m)).max(0.0)
                    }
                };
                let alpha = od / hole_id;
                let kc = self
                    .config
                    .clinging_constant
                    .map_or_else(|| clinging_constant(alpha), |k| k.clamp(0.0, 1.0));
                let mean_velocity = pipe_speed_mps * (kc + displaced_area / annular_area);
                let velocity = self.config.peak_velocity_factor * mean_velocity;

                let gradient = friction_gradient_pa_per_m(pl, velocity, dh)
                    * eccentricity_factor(pl.n, self.config.eccentricity, alpha);
                loss.pressure_kpa += gradient * sub.length_m() / 1000.0;

                let re = generalized_reynolds(fluid.density_kgm3, velocity, dh, pl);
                let regime = classify_regime(re, pl.n);
                loss.regime = Some(loss.regime.map_or(regime, |r| r.max(regime)));
            }
        }
        loss
    }

    /// Sweep the pipe bottom from `top_md` to `bottom_md` inclusive.
    pub fn sweep<A: FluidInterval>(
        &self,
        annulus: &[A],
        top_md: f64,
        bottom_md: f64,
    ) -> SurgeSwabReport {
        let mut report = SurgeSwabReport::default();
        if bottom_md < top_md {
            warn!(top_md, bottom_md, "Surge/swab range is inverted, nothing to sweep");
            report.advisories.push(Advisory::DegenerateInterval {
                top_m: top_md,
                bottom_m: bottom_md,
            });
            return report;
        }
        if let Some(advisory) = self.survey.advisory() {
            push_unique(&mut report.advisories, advisory);
        }

        for depth in self.depth_stations(top_md, bottom_md) {
            let tvd = self.survey.md_to_tvd(depth);
            let hydrostatic = hydrostatic_kpa(annulus, depth, self.survey);
            let surge = self.trip_loss(
                annulus,
                depth,
                self.config.trip_in_speed_mps,
                &mut report.advisories,
            );
            let swab = self.trip_loss(
                annulus,
                depth,
                self.config.trip_out_speed_mps,
                &mut report.advisories,
            );

            if surge.pressure_kpa > report.max_surge_kpa || report.max_surge_depth_md.is_none() {
                report.max_surge_kpa = surge.pressure_kpa;
                report.max_surge_depth_md = Some(depth);
            }
            if swab.pressure_kpa > report.max_swab_kpa || report.max_swab_depth_md.is_none() {
                report.max_swab_kpa = swab.pressure_kpa;
                report.max_swab_depth_md = Some(depth);
            }

            report.rows.push(SurgeSwabRow {
                depth_md: depth,
                depth_tvd: tvd,
                hydrostatic_kpa: hydrostatic,
                surge_kpa: surge.pressure_kpa,
                swab_kpa: swab.pressure_kpa,
                surge_emw_kgm3: equivalent_density_kgm3(hydrostatic + surge.pressure_kpa, tvd),
                swab_emw_kgm3: equivalent_density_kgm3(hydrostatic - swab.pressure_kpa, tvd),
                surge_regime: surge.regime,
                swab_regime: swab.regime,
            });
        }

        debug!(
            rows = report.rows.len(),
            max_surge_kpa = report.max_surge_kpa,
            max_swab_kpa = report.max_swab_kpa,
            "Surge/swab sweep complete"
        );
        report
    }
}
