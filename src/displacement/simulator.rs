//! Stage-by-stage displacement between the string and the annulus
//!
//! Pumping a stage of volume V pushes V of new fluid in at the top of the
//! string. The same volume leaves the string at the bit as parcels, which
//! are stacked into the annulus just above the bit while the existing
//! annulus column rises and spills out at surface.
//!
//! State is never carried between renders: every snapshot replays the full
//! stages from the two base segments, then a fractional last stage.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::segments::{merge_adjacent, shift_down_by_volume, shift_up, take_from_bottom, Parcel};
use crate::config::defaults::{MAX_RESCALE_FACTOR, VOLUME_MATCH_TOLERANCE};
use crate::config::SolverConfig;
use crate::fluids::PumpSchedule;
use crate::geometry::CapacityIntegrator;
use crate::solver::{bisect_monotonic, SolveStatus, SolverSettings};
use crate::types::{push_unique, Advisory, DepthSpan, Domain, FluidSegment, FluidSpec, PumpStage};

/// Fluid occupancy of both domains at one point in the job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplacementState {
    pub string_segments: Vec<FluidSegment>,
    pub annulus_segments: Vec<FluidSegment>,
    /// Total volume applied so far (m³).
    pub pumped_m3: f64,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl DisplacementState {
    pub fn segments(&self, domain: Domain) -> &[FluidSegment] {
        match domain {
            Domain::Annulus => &self.annulus_segments,
            Domain::String => &self.string_segments,
        }
    }

    /// Fluid at `md`; the shallower segment wins on a shared boundary.
    pub fn fluid_at(&self, domain: Domain, md: f64) -> Option<&FluidSpec> {
        self.segments(domain)
            .iter()
            .find(|s| s.contains_md(md))
            .map(|s| &s.fluid)
    }
}

/// Replays pump stages against a fixed geometry.
#[derive(Debug, Clone)]
pub struct DisplacementSimulator<'a> {
    capacity: CapacityIntegrator<'a>,
    bit_md: f64,
    annulus_base: FluidSpec,
    string_base: FluidSpec,
    settings: SolverSettings,
    max_rescale: f64,
}

impl<'a> DisplacementSimulator<'a> {
    pub fn new(
        capacity: CapacityIntegrator<'a>,
        bit_md: f64,
        annulus_base: FluidSpec,
        string_base: FluidSpec,
    ) -> Self {
        Self {
            capacity,
            bit_md: bit_md.max(0.0),
            annulus_base,
            string_base,
            settings: SolverSettings::default(),
            max_rescale: MAX_RESCALE_FACTOR,
        }
    }

    /// Override iteration cap, tolerance and rescale cap.
    #[must_use]
    pub fn with_solver(mut self, solver: &SolverConfig) -> Self {
        self.settings = solver.settings();
        self.max_rescale = solver.max_rescale.max(1.0);
        self
    }

    pub const fn bit_md(&self) -> f64 {
        self.bit_md
    }

    /// One base segment per domain over `[0, bit]`.
    pub fn initial_state(&self) -> DisplacementState {
        let base = |fluid: &FluidSpec| {
            if self.bit_md > 0.0 {
                vec![FluidSegment::new(0.0, self.bit_md, fluid.clone())]
            } else {
                Vec::new()
            }
        };
        DisplacementState {
            string_segments: base(&self.string_base),
            annulus_segments: base(&self.annulus_base),
            pumped_m3: 0.0,
            advisories: Vec::new(),
        }
    }

    /// Pump `volume_m3` of `fluid` into the string.
    pub fn apply_stage(&self, state: &mut DisplacementState, fluid: &FluidSpec, volume_m3: f64) {
        if !(volume_m3 > 0.0) || self.bit_md <= 0.0 {
            return;
        }
        state.pumped_m3 += volume_m3;

        // New fluid fills `string_length` from surface while the same
        // volume leaves through the bore above the bit.
        let solve = self
            .capacity
            .length_for_string_volume_from_surface(volume_m3, self.bit_md, self.settings);
        let string_length = solve.value.clamp(0.0, self.bit_md);
        let withdrawn = self
            .capacity
            .length_for_string_volume_from_bit(volume_m3, self.bit_md, self.settings)
            .value
            .clamp(0.0, self.bit_md);

        let (remaining, mut parcels) =
            take_from_bottom(&state.string_segments, withdrawn, &self.capacity);
        let mut string = shift_down_by_volume(
            remaining,
            volume_m3,
            self.bit_md,
            &self.capacity,
            self.settings,
        );
        if string_length > 0.0 {
            string.push(FluidSegment::new(0.0, string_length, fluid.clone()));
        }
        state.string_segments = merge_adjacent(string);

        let exited: f64 = parcels.iter().map(|p| p.volume_m3).sum();
        let shortfall = volume_m3 - exited;
        if shortfall > VOLUME_MATCH_TOLERANCE * volume_m3.max(1.0) {
            debug!(
                volume_m3,
                exited_m3 = exited,
                shortfall_m3 = shortfall,
                "String ran dry, shortfall exits at the bit"
            );
            parcels.push(Parcel {
                volume_m3: shortfall,
                fluid: fluid.clone(),
            });
        }
        parcels.retain(|p| p.volume_m3 > 0.0);

        self.push_up_from_bit(state, &parcels);
    }

    /// Stack `parcels` above the bit and lift the annulus column.
    ///
    /// The first parcel to leave the string ends up highest in the block.
    fn push_up_from_bit(&self, state: &mut DisplacementState, parcels: &[Parcel]) {
        if parcels.is_empty() {
            return;
        }
        let bit = self.bit_md;
        let target: f64 = parcels.iter().map(|p| p.volume_m3).sum();

        let mut lengths: Vec<f64> = Vec::with_capacity(parcels.len());
        for parcel in parcels {
            let solve = self
                .capacity
                .length_for_annulus_volume_from_bit(parcel.volume_m3, bit, self.settings);
            if solve.status == SolveStatus::TargetAboveRange {
                let achievable = self.capacity.annular_volume(0.0, bit);
                warn!(
                    fluid = %parcel.fluid.display_name(),
                    volume_m3 = parcel.volume_m3,
                    achievable_m3 = achievable,
                    "Parcel exceeds annulus capacity, using full annulus length"
                );
                push_unique(
                    &mut state.advisories,
                    Advisory::UnsolvableVolumeMatch {
                        target_m3: parcel.volume_m3,
                        achievable_m3: achievable,
                    },
                );
            }
            lengths.push(solve.value);
        }

        // Independent solves ignore that stacked parcels sit in different
        // geometry, so the summed span can miss the target volume.
        let total: f64 = lengths.iter().sum();
        let span_volume = |length: f64| self.capacity.annular_volume(bit - length.min(bit), bit);
        let achieved = span_volume(total);
        let off_target = (achieved - target).abs() > VOLUME_MATCH_TOLERANCE * target.max(1.0);
        if total > 0.0 && achieved > 0.0 && off_target {
            let scale = bisect_monotonic(
                |s| span_volume(s * total),
                target,
                1.0 / self.max_rescale,
                self.max_rescale,
                self.settings,
            );
            debug!(
                target_m3 = target,
                achieved_m3 = achieved,
                factor = scale.value,
                status = ?scale.status,
                "Rescaling annulus parcel lengths"
            );
            for len in &mut lengths {
                *len *= scale.value;
            }
        }
        let total: f64 = lengths.iter().sum();

        let mut annulus = shift_up(std::mem::take(&mut state.annulus_segments), total);
        let mut cursor = bit - total;
        for (parcel, len) in parcels.iter().zip(&lengths) {
            let top = cursor.max(0.0);
            let bottom = (cursor + len).min(bit);
            if bottom - top > 0.0 {
                annulus.push(FluidSegment::new(top, bottom, parcel.fluid.clone()));
            }
            cursor += len;
        }
        state.annulus_segments = merge_adjacent(annulus);
    }

    /// Replay `full_stages` whole stages plus `progress` of the next one.
    ///
    /// Stages are applied in `order`.
    pub fn snapshot(
        &self,
        stages: &[PumpStage],
        full_stages: usize,
        progress: f64,
    ) -> DisplacementState {
        let schedule = PumpSchedule::new(stages.to_vec());
        let ordered = schedule.stages();
        let mut state = self.initial_state();
        for stage in ordered.iter().take(full_stages) {
            self.apply_stage(&mut state, &stage.fluid, stage.total_volume_m3);
        }
        if let Some(next) = ordered.get(full_stages) {
            let fraction = progress.clamp(0.0, 1.0);
            if fraction > 0.0 {
                self.apply_stage(&mut state, &next.fluid, next.total_volume_m3 * fraction);
            }
        }
        debug!(
            full_stages,
            progress,
            string_segments = state.string_segments.len(),
            annulus_segments = state.annulus_segments.len(),
            "Displacement snapshot rebuilt"
        );
        state
    }

    /// Snapshot after `pumped_m3` cumulative volume.
    pub fn snapshot_at_volume(&self, stages: &[PumpStage], pumped_m3: f64) -> DisplacementState {
        let position = PumpSchedule::new(stages.to_vec()).locate(pumped_m3);
        self.snapshot(stages, position.full_stages, position.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnnulusSection, DrillStringSection, GeometryModel};

    fn geometry() -> GeometryModel {
        GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 1000.0, 0.3)],
            vec![DrillStringSection::new(1, "dp", 0.0, 1000.0, 0.08, 0.1)],
        )
    }

    fn mud() -> FluidSpec {
        FluidSpec::named(1, "Mud", 1200.0)
    }

    fn pill() -> FluidSpec {
        FluidSpec::named(2, "Pill", 1600.0)
    }

    #[test]
    fn test_initial_state_is_two_base_segments() {
        let g = geometry();
        let sim = DisplacementSimulator::new(CapacityIntegrator::new(&g), 1000.0, mud(), mud());
        let state = sim.initial_state();
        assert_eq!(state.string_segments, vec![FluidSegment::new(0.0, 1000.0, mud())]);
        assert_eq!(state.annulus_segments.len(), 1);
    }

    #[test]
    fn test_full_string_volume_replaces_string() {
        let g = geometry();
        let cap = CapacityIntegrator::new(&g);
        let annulus_mud = FluidSpec::named(9, "Annulus mud", 1250.0);
        let sim = DisplacementSimulator::new(cap, 1000.0, annulus_mud.clone(), mud());
        let v = cap.string_capacity_volume(0.0, 1000.0);

        let mut state = sim.initial_state();
        sim.apply_stage(&mut state, &pill(), v);

        assert_eq!(state.string_segments.len(), 1);
        assert_eq!(state.string_segments[0].fluid, pill());
        assert!((state.string_segments[0].bottom_m - 1000.0).abs() < 1e-9);

        // The whole string of mud now sits above the bit, under the lifted
        // annulus mud.
        assert_eq!(state.annulus_segments.len(), 2);
        assert_eq!(state.annulus_segments[0].fluid, annulus_mud);
        let returned = &state.annulus_segments[1];
        assert_eq!(returned.fluid, mud());
        assert!((returned.bottom_m - 1000.0).abs() < 1e-9);
        let returned_volume = cap.annular_volume(returned.top_m, returned.bottom_m);
        assert!((returned_volume - v).abs() < 1e-6, "returned {returned_volume}");
        assert!(state.advisories.is_empty());
    }

    #[test]
    fn test_wide_bottom_string_returns_only_the_stage_volume() {
        // Slim bore over [0, 500], wide bore down to the bit.
        let g = GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 1000.0, 0.3)],
            vec![
                DrillStringSection::new(1, "slim", 0.0, 500.0, 0.05, 0.1),
                DrillStringSection::new(2, "wide", 500.0, 1000.0, 0.1, 0.127),
            ],
        );
        let cap = CapacityIntegrator::new(&g);
        let annulus_mud = FluidSpec::named(9, "Annulus mud", 1250.0);
        let sim = DisplacementSimulator::new(cap, 1000.0, annulus_mud, mud());
        let v = cap.string_capacity_volume(0.0, 400.0);

        let mut state = sim.initial_state();
        sim.apply_stage(&mut state, &pill(), v);

        let returned = state
            .annulus_segments
            .iter()
            .find(|s| s.fluid == mud())
            .expect("string mud above the bit");
        let gained = cap.annular_volume(returned.top_m, returned.bottom_m);
        assert!((gained - v).abs() < 1e-6, "annulus gained {gained} for {v}");
        assert!(state.annulus_segments.iter().all(|s| s.fluid != pill()));

        // String: pill on top, the remaining mud below it down to the bit.
        assert_eq!(state.string_segments.len(), 2);
        assert_eq!(state.string_segments[0].fluid, pill());
        assert!((state.string_segments[0].bottom_m - 400.0).abs() < 1e-5);
        assert!((state.string_segments[1].bottom_m - 1000.0).abs() < 1e-9);
        let mud_left = cap.string_capacity_volume(state.string_segments[1].top_m, 1000.0);
        let expected = cap.string_capacity_volume(0.0, 1000.0) - v;
        assert!((mud_left - expected).abs() < 1e-6);
    }

    #[test]
    fn test_annulus_gains_stage_volume_at_bit() {
        let g = geometry();
        let cap = CapacityIntegrator::new(&g);
        let annulus_mud = FluidSpec::named(9, "Annulus mud", 1250.0);
        let sim = DisplacementSimulator::new(cap, 1000.0, annulus_mud, mud());

        let mut state = sim.initial_state();
        sim.apply_stage(&mut state, &pill(), 3.0);

        let from_string = state
            .annulus_segments
            .iter()
            .find(|s| s.fluid == mud())
            .expect("string mud parcel in annulus");
        assert!((from_string.bottom_m - 1000.0).abs() < 1e-9);
        let gained = cap.annular_volume(from_string.top_m, from_string.bottom_m);
        assert!((gained - 3.0).abs() < 1e-6, "gained {gained}");
    }

    #[test]
    fn test_shortfall_parcel_exits_at_bit() {
        let g = geometry();
        let cap = CapacityIntegrator::new(&g);
        let annulus_mud = FluidSpec::named(9, "Annulus mud", 1250.0);
        let sim = DisplacementSimulator::new(cap, 1000.0, annulus_mud, mud());
        let string_capacity = cap.string_capacity_volume(0.0, 1000.0);

        let mut state = sim.initial_state();
        sim.apply_stage(&mut state, &pill(), string_capacity + 2.0);

        // Block above the bit: string mud on top, then pill at the bit.
        let n = state.annulus_segments.len();
        let bottom = &state.annulus_segments[n - 1];
        let above = &state.annulus_segments[n - 2];
        assert_eq!(bottom.fluid, pill());
        assert_eq!(above.fluid, mud());
        let pill_volume = cap.annular_volume(bottom.top_m, bottom.bottom_m);
        assert!((pill_volume - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let g = geometry();
        let cap = CapacityIntegrator::new(&g);
        let sim = DisplacementSimulator::new(cap, 1000.0, mud(), mud());
        let stages = vec![
            PumpStage::new(FluidSpec::named(3, "Spacer", 1400.0), 2.0, 0),
            PumpStage::new(pill(), 4.0, 1),
            PumpStage::new(mud(), 8.0, 2),
        ];

        let a = sim.snapshot(&stages, 1, 0.5);
        let b = sim.snapshot_at_volume(&stages, 4.0);
        assert_eq!(a, b);
        assert!((a.pumped_m3 - 4.0).abs() < 1e-12);

        let mut manual = sim.initial_state();
        sim.apply_stage(&mut manual, &stages[0].fluid, 2.0);
        sim.apply_stage(&mut manual, &stages[1].fluid, 2.0);
        assert_eq!(a, manual);
    }

    #[test]
    fn test_oversized_parcel_flags_unsolvable_match() {
        let g = GeometryModel::new(
            vec![AnnulusSection::new("tight", 0.0, 100.0, 0.102)],
            vec![DrillStringSection::new(1, "dp", 0.0, 100.0, 0.09, 0.1)],
        );
        let cap = CapacityIntegrator::new(&g);
        let sim = DisplacementSimulator::new(cap, 100.0, mud(), mud());
        let mut state = sim.initial_state();
        sim.apply_stage(&mut state, &pill(), 5.0);
        assert!(state
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::UnsolvableVolumeMatch { .. })));
        assert!(state.annulus_segments.iter().all(|s| s.top_m >= 0.0 && s.bottom_m <= 100.0));
    }
}
