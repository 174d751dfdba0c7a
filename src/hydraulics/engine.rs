//! Circulating hydraulics
//!
//! Combines hydrostatic columns, friction in both flow paths and surface
//! back-pressure into BHP, ECD and total circulating pressure at a control
//! depth.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::friction::{integrate_friction, FrictionSegment};
use super::hydrostatic::{equivalent_density_kgm3, hydrostatic_kpa};
use super::survey::SurveyProfile;
use crate::config::defaults::{GRAVITY_MPS2, LPM_TO_M3_PER_S};
use crate::config::{HydraulicsConfig, PressureMode};
use crate::geometry::CapacityIntegrator;
use crate::types::{push_unique, Advisory, Domain, FluidInterval};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydraulicsReport {
    pub control_md: f64,
    pub control_tvd: f64,
    pub flow_rate_lpm: f64,
    pub pressure_mode: PressureMode,
    pub annulus_hydrostatic_kpa: f64,
    pub string_hydrostatic_kpa: f64,
    pub annulus_friction_kpa: f64,
    pub string_friction_kpa: f64,
    pub sbp_kpa: f64,
    /// Annulus hydrostatic plus SBP. Friction is not included.
    pub bhp_kpa: f64,
    pub ecd_kgm3: f64,
    pub tcp_kpa: f64,
    pub segments: Vec<FrictionSegment>,
    pub advisories: Vec<Advisory>,
}

/// SBP needed to hold `target_ecd_kgm3` at `control_tvd`, floored at 0.
pub fn managed_sbp_kpa(
    target_ecd_kgm3: f64,
    control_tvd: f64,
    hydrostatic_kpa: f64,
    friction_kpa: f64,
) -> f64 {
    let target_kpa = target_ecd_kgm3 * GRAVITY_MPS2 * control_tvd / 1000.0;
    (target_kpa - hydrostatic_kpa - friction_kpa).max(0.0)
}

pub struct HydraulicsEngine<'a> {
    capacity: CapacityIntegrator<'a>,
    survey: &'a SurveyProfile,
    config: &'a HydraulicsConfig,
}

impl<'a> HydraulicsEngine<'a> {
    pub const fn new(
        capacity: CapacityIntegrator<'a>,
        survey: &'a SurveyProfile,
        config: &'a HydraulicsConfig,
    ) -> Self {
        Self {
            capacity,
            survey,
            config,
        }
    }

    /// Evaluate the well with the given fluid columns. Control depth defaults
    /// to `bit_md`.
    pub fn evaluate<A, S>(&self, annulus: &[A], string: &[S], bit_md: f64) -> HydraulicsReport
    where
        A: FluidInterval,
        S: FluidInterval,
    {
        let control_md = self.config.control_depth_md.unwrap_or(bit_md).max(0.0);
        let control_tvd = self.survey.md_to_tvd(control_md);
        let flow_rate_m3s = self.config.flow_rate_lpm.max(0.0) * LPM_TO_M3_PER_S;

        let mut advisories = Vec::new();
        if let Some(advisory) = self.survey.advisory() {
            push_unique(&mut advisories, advisory);
        }

        let annulus_hydrostatic_kpa = hydrostatic_kpa(annulus, control_md, self.survey);
        let string_hydrostatic_kpa = hydrostatic_kpa(string, control_md, self.survey);

        let mut segments = Vec::new();
        let (annulus_friction_kpa, string_friction_kpa) = if flow_rate_m3s > 0.0 {
            (
                integrate_friction(
                    Domain::Annulus,
                    annulus,
                    control_md,
                    &self.capacity,
                    flow_rate_m3s,
                    &mut segments,
                    &mut advisories,
                ),
                integrate_friction(
                    Domain::String,
                    string,
                    control_md,
                    &self.capacity,
                    flow_rate_m3s,
                    &mut segments,
                    &mut advisories,
                ),
            )
        } else {
            (0.0, 0.0)
        };

        let sbp_kpa = match (self.config.pressure_mode, self.config.target_ecd_kgm3) {
            (PressureMode::Managed, Some(target)) => {
                managed_sbp_kpa(target, control_tvd, annulus_hydrostatic_kpa, annulus_friction_kpa)
            }
            (PressureMode::Managed, None) => {
                warn!("Managed pressure mode without a target ECD, using applied SBP");
                self.config.applied_sbp_kpa.max(0.0)
            }
            (PressureMode::Conventional, _) => self.config.applied_sbp_kpa.max(0.0),
        };

        let bhp_kpa = annulus_hydrostatic_kpa + sbp_kpa;
        let circulating_kpa = annulus_hydrostatic_kpa + annulus_friction_kpa + sbp_kpa;
        let ecd_kgm3 = equivalent_density_kgm3(circulating_kpa, control_tvd);
        let tcp_kpa = string_friction_kpa + annulus_friction_kpa + sbp_kpa;

        debug!(
            control_md,
            control_tvd,
            bhp_kpa,
            ecd_kgm3,
            tcp_kpa,
            sbp_kpa,
            "Hydraulics evaluated"
        );

        HydraulicsReport {
            control_md,
            control_tvd,
            flow_rate_lpm: self.config.flow_rate_lpm,
            pressure_mode: self.config.pressure_mode,
            annulus_hydrostatic_kpa,
            string_hydrostatic_kpa,
            annulus_friction_kpa,
            string_friction_kpa,
            sbp_kpa,
            bhp_kpa,
            ecd_kgm3,
            tcp_kpa,
            segments,
            advisories,
        }
    }
}
