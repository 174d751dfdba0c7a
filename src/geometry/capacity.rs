//! Capacity integration
//!
//! Sums cross-sectional area × length over decomposed sub-intervals:
//!
//! - Open hole: π/4·ID_ann²
//! - Annular: max(0, π/4·(ID_ann² − OD_str²)), interference flagged when OD > ID
//! - String capacity (bore): π/4·ID_str²
//! - String wet displacement: π/4·OD_str²
//! - String metal (dry) displacement: max(0, π/4·(OD_str² − ID_str²))
//!
//! Wherever the string spans the range, annular + capacity + metal = open hole.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

use super::decomposer::{decompose, SubInterval};
use crate::solver::{bisect_monotonic, RootSolve, SolverSettings};
use crate::types::{Advisory, AnnulusSection, DrillStringSection, GeometryModel};

/// Area of a circle of diameter `d` (m²).
pub fn circle_area(d: f64) -> f64 {
    PI / 4.0 * d * d
}

/// Volume totals over a query range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeBreakdown {
    pub top_m: f64,
    pub bottom_m: f64,
    /// Full query length, including any uncovered length.
    pub length_m: f64,
    pub annular_m3: f64,
    pub string_capacity_m3: f64,
    pub string_displacement_m3: f64,
    pub string_metal_m3: f64,
    pub open_hole_m3: f64,
    /// Length with no covering annulus section (contributes no volume).
    pub uncovered_length_m: f64,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

/// Per-metre capacities over the query range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeRates {
    pub annular_m3_per_m: f64,
    pub string_capacity_m3_per_m: f64,
    pub string_displacement_m3_per_m: f64,
    pub string_metal_m3_per_m: f64,
    pub open_hole_m3_per_m: f64,
}

impl VolumeBreakdown {
    pub fn rates(&self) -> VolumeRates {
        if self.length_m <= 0.0 {
            return VolumeRates::default();
        }
        let l = self.length_m;
        VolumeRates {
            annular_m3_per_m: self.annular_m3 / l,
            string_capacity_m3_per_m: self.string_capacity_m3 / l,
            string_displacement_m3_per_m: self.string_displacement_m3 / l,
            string_metal_m3_per_m: self.string_metal_m3 / l,
            open_hole_m3_per_m: self.open_hole_m3 / l,
        }
    }

    pub fn has_interference(&self) -> bool {
        self.advisories
            .iter()
            .any(|a| matches!(a, Advisory::GeometryInterference { .. }))
    }

    fn accumulate(&mut self, sub: &SubInterval<'_>) {
        let len = sub.length_m();
        let Some(hole) = sub.annulus else {
            self.uncovered_length_m += len;
            return;
        };
        let hole_id = hole.inner_diameter_m;
        let (str_id, str_od) = sub
            .string
            .map_or((0.0, 0.0), |s| (s.inner_diameter_m, s.outer_diameter_m));

        if str_od > hole_id {
            warn!(
                top_m = sub.top_m,
                bottom_m = sub.bottom_m,
                string_od_m = str_od,
                hole_id_m = hole_id,
                "Drill string OD exceeds hole ID"
            );
            self.advisories.push(Advisory::GeometryInterference {
                top_m: sub.top_m,
                bottom_m: sub.bottom_m,
                string_od_m: str_od,
                hole_id_m: hole_id,
            });
        }

        self.open_hole_m3 += circle_area(hole_id) * len;
        self.annular_m3 += (circle_area(hole_id) - circle_area(str_od)).max(0.0) * len;
        self.string_capacity_m3 += circle_area(str_id) * len;
        self.string_displacement_m3 += circle_area(str_od) * len;
        self.string_metal_m3 += (circle_area(str_od) - circle_area(str_id)).max(0.0) * len;
    }
}

/// Whole-well volume summary from surface to bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WellVolumes {
    pub bit_depth_m: f64,
    /// Surface-to-bit volume.
    pub string_capacity_m3: f64,
    /// Bottoms-up volume.
    pub annular_m3: f64,
    pub string_metal_m3: f64,
    pub open_hole_m3: f64,
    /// String capacity plus annular volume.
    pub circulating_m3: f64,
}

/// Capacity integrator over one annulus / drill-string snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CapacityIntegrator<'a> {
    annulus: &'a [AnnulusSection],
    strings: &'a [DrillStringSection],
}

impl<'a> CapacityIntegrator<'a> {
    pub fn new(geometry: &'a GeometryModel) -> Self {
        Self {
            annulus: &geometry.annulus,
            strings: &geometry.drill_string,
        }
    }

    pub const fn from_parts(
        annulus: &'a [AnnulusSection],
        strings: &'a [DrillStringSection],
    ) -> Self {
        Self { annulus, strings }
    }

    pub const fn annulus(&self) -> &'a [AnnulusSection] {
        self.annulus
    }

    pub const fn strings(&self) -> &'a [DrillStringSection] {
        self.strings
    }

    /// Sub-intervals of `[top, bottom]` with their covering sections.
    pub fn sub_intervals(&self, top: f64, bottom: f64) -> Vec<SubInterval<'a>> {
        decompose(top, bottom, self.annulus, self.strings)
    }

    /// All volume terms over `[top, bottom]`; all zero when `bottom <= top`.
    pub fn integrate(&self, top: f64, bottom: f64) -> VolumeBreakdown {
        let mut out = VolumeBreakdown {
            top_m: top,
            bottom_m: bottom,
            ..VolumeBreakdown::default()
        };
        if !(bottom > top) {
            out.advisories.push(Advisory::DegenerateInterval { top_m: top, bottom_m: bottom });
            return out;
        }
        out.length_m = bottom - top;
        for sub in self.sub_intervals(top, bottom) {
            out.accumulate(&sub);
        }
        out
    }

    /// Annular volume over `[top, bottom]`.
    pub fn annular_volume(&self, top: f64, bottom: f64) -> f64 {
        self.sum_area(top, bottom, |sub| {
            sub.annulus.map_or(0.0, |a| {
                (circle_area(a.inner_diameter_m) - circle_area(sub.string_od_m())).max(0.0)
            })
        })
    }

    /// String bore volume over `[top, bottom]`.
    pub fn string_capacity_volume(&self, top: f64, bottom: f64) -> f64 {
        self.sum_area(top, bottom, |sub| match (sub.annulus, sub.string) {
            (Some(_), Some(s)) => circle_area(s.inner_diameter_m),
            _ => 0.0,
        })
    }

    fn sum_area<F>(&self, top: f64, bottom: f64, area: F) -> f64
    where
        F: Fn(&SubInterval<'a>) -> f64,
    {
        if !(bottom > top) {
            return 0.0;
        }
        self.sub_intervals(top, bottom)
            .iter()
            .map(|sub| area(sub) * sub.length_m())
            .sum()
    }

    /// Length from surface whose string capacity equals `volume_m3`.
    pub fn length_for_string_volume_from_surface(
        &self,
        volume_m3: f64,
        bit_md: f64,
        settings: SolverSettings,
    ) -> RootSolve {
        bisect_monotonic(
            |len| self.string_capacity_volume(0.0, len),
            volume_m3,
            0.0,
            bit_md,
            settings,
        )
    }

    /// Length above the bit whose annular volume equals `volume_m3`.
    pub fn length_for_annulus_volume_from_bit(
        &self,
        volume_m3: f64,
        bit_md: f64,
        settings: SolverSettings,
    ) -> RootSolve {
        bisect_monotonic(
            |len| self.annular_volume(bit_md - len, bit_md),
            volume_m3,
            0.0,
            bit_md,
            settings,
        )
    }

    /// Length above the bit whose string capacity equals `volume_m3`.
    pub fn length_for_string_volume_from_bit(
        &self,
        volume_m3: f64,
        bit_md: f64,
        settings: SolverSettings,
    ) -> RootSolve {
        bisect_monotonic(
            |len| self.string_capacity_volume(bit_md - len, bit_md),
            volume_m3,
            0.0,
            bit_md,
            settings,
        )
    }

    /// Surface-to-bit summary.
    pub fn well_volumes(&self, bit_md: f64) -> WellVolumes {
        let v = self.integrate(0.0, bit_md);
        WellVolumes {
            bit_depth_m: bit_md,
            string_capacity_m3: v.string_capacity_m3,
            annular_m3: v.annular_m3,
            string_metal_m3: v.string_metal_m3,
            open_hole_m3: v.open_hole_m3,
            circulating_m3: v.string_capacity_m3 + v.annular_m3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolveStatus;

    fn simple_well() -> GeometryModel {
        GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 1000.0, 0.3)],
            vec![DrillStringSection::new(1, "dp", 0.0, 1000.0, 0.08, 0.1)],
        )
    }

    fn rel_close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_annular_volume_scenario() {
        let g = simple_well();
        let v = CapacityIntegrator::new(&g).integrate(0.0, 1000.0);
        let expected = PI / 4.0 * (0.09 - 0.01) * 1000.0;
        assert!(rel_close(v.annular_m3, expected, 1e-12));
        assert!((v.annular_m3 - 62.83).abs() < 0.01);
        assert!(rel_close(v.string_capacity_m3, circle_area(0.08) * 1000.0, 1e-12));
        assert!(!v.has_interference());
    }

    #[test]
    fn test_string_capacity_independent_of_od() {
        let mut g = simple_well();
        let before = CapacityIntegrator::new(&g).integrate(0.0, 1000.0).string_capacity_m3;
        g.drill_string[0].outer_diameter_m = 0.2;
        let after = CapacityIntegrator::new(&g).integrate(0.0, 1000.0).string_capacity_m3;
        assert_eq!(before, after);
    }

    #[test]
    fn test_volume_identity_when_string_spans_range() {
        let g = GeometryModel::new(
            vec![
                AnnulusSection::new("casing", 0.0, 700.0, 0.3153),
                AnnulusSection::new("liner", 700.0, 1200.0, 0.2244),
                AnnulusSection::new("open hole", 1200.0, 2000.0, 0.2159),
            ],
            vec![
                DrillStringSection::new(1, "dp", 0.0, 1800.0, 0.1086, 0.127),
                DrillStringSection::new(2, "hwdp", 1800.0, 1950.0, 0.0762, 0.127),
                DrillStringSection::new(3, "dc", 1950.0, 2000.0, 0.0714, 0.1651),
            ],
        );
        let v = CapacityIntegrator::new(&g).integrate(350.0, 1990.0);
        let sum = v.annular_m3 + v.string_capacity_m3 + v.string_metal_m3;
        assert!(rel_close(sum, v.open_hole_m3, 1e-9), "{sum} vs {}", v.open_hole_m3);
    }

    #[test]
    fn test_interference_flagged_not_corrected() {
        let g = GeometryModel::new(
            vec![AnnulusSection::new("tight", 0.0, 100.0, 0.1)],
            vec![DrillStringSection::new(1, "dc", 0.0, 100.0, 0.05, 0.12)],
        );
        let v = CapacityIntegrator::new(&g).integrate(0.0, 100.0);
        assert_eq!(v.annular_m3, 0.0);
        assert!(v.has_interference());
        assert!(v.string_displacement_m3 > v.open_hole_m3, "displacement keeps the true OD");
    }

    #[test]
    fn test_degenerate_interval_is_zero() {
        let g = simple_well();
        let v = CapacityIntegrator::new(&g).integrate(500.0, 500.0);
        assert_eq!(v.annular_m3, 0.0);
        assert_eq!(v.length_m, 0.0);
        assert_eq!(v.rates(), VolumeRates::default());
        assert!(matches!(v.advisories[0], Advisory::DegenerateInterval { .. }));
    }

    #[test]
    fn test_uncovered_length_contributes_nothing() {
        let g = GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 500.0, 0.3)],
            vec![DrillStringSection::new(1, "dp", 0.0, 1000.0, 0.08, 0.1)],
        );
        let v = CapacityIntegrator::new(&g).integrate(0.0, 1000.0);
        assert_eq!(v.uncovered_length_m, 500.0);
        assert!(rel_close(v.string_capacity_m3, circle_area(0.08) * 500.0, 1e-12));
        assert!(rel_close(v.rates().string_capacity_m3_per_m, circle_area(0.08) * 0.5, 1e-12));
    }

    #[test]
    fn test_length_for_volume_round_trip() {
        let g = simple_well();
        let c = CapacityIntegrator::new(&g);
        let target = c.string_capacity_volume(0.0, 420.0);
        let r = c.length_for_string_volume_from_surface(target, 1000.0, SolverSettings::default());
        assert!(r.converged());
        assert!((r.value - 420.0).abs() < 1e-5);

        let ann = c.annular_volume(700.0, 1000.0);
        let r = c.length_for_annulus_volume_from_bit(ann, 1000.0, SolverSettings::default());
        assert!((r.value - 300.0).abs() < 1e-5);

        let r = c.length_for_annulus_volume_from_bit(1e6, 1000.0, SolverSettings::default());
        assert_eq!(r.status, SolveStatus::TargetAboveRange);
        assert_eq!(r.value, 1000.0);
    }

    #[test]
    fn test_string_length_from_bit_follows_the_deep_bore() {
        // Narrow bore on top, wide bore at depth: equal volumes need
        // different lengths from each end.
        let g = GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 1000.0, 0.3)],
            vec![
                DrillStringSection::new(1, "slim", 0.0, 500.0, 0.05, 0.1),
                DrillStringSection::new(2, "wide", 500.0, 1000.0, 0.1, 0.127),
            ],
        );
        let c = CapacityIntegrator::new(&g);
        let v = c.string_capacity_volume(0.0, 400.0);
        let settings = SolverSettings::default();

        let from_surface = c.length_for_string_volume_from_surface(v, 1000.0, settings);
        let from_bit = c.length_for_string_volume_from_bit(v, 1000.0, settings);
        assert!(from_bit.converged());
        assert!((from_surface.value - 400.0).abs() < 1e-5);
        assert!((from_bit.value - 100.0).abs() < 1e-5);
        assert!(rel_close(c.string_capacity_volume(1000.0 - from_bit.value, 1000.0), v, 1e-7));
    }

    #[test]
    fn test_well_volumes_summary() {
        let g = simple_well();
        let w = CapacityIntegrator::new(&g).well_volumes(1000.0);
        assert!(rel_close(w.circulating_m3, w.string_capacity_m3 + w.annular_m3, 1e-15));
        assert!(w.annular_m3 > w.string_capacity_m3);
    }
}
