//! Pump stages and the pumping timeline
//!
//! A designed fluid column turns into a pumping program by pumping the
//! annulus layers shallow to deep first (the first fluid pumped travels
//! furthest), then the string layers deep to shallow.

use serde::{Deserialize, Serialize};

use super::compositor::LayerColumn;
use crate::geometry::CapacityIntegrator;
use crate::types::PumpStage;

/// Derive pump stages that reproduce `column`.
///
/// Each stage volume is the layer's capacity in its own domain; zero-volume
/// layers are dropped and adjacent stages of the same fluid are combined.
pub fn derive_pump_stages(
    column: &LayerColumn,
    capacity: &CapacityIntegrator<'_>,
) -> Vec<PumpStage> {
    let annulus = column
        .annulus
        .iter()
        .map(|l| (l.fluid.clone(), capacity.annular_volume(l.top_m, l.bottom_m)));
    let string = column
        .string
        .iter()
        .rev()
        .map(|l| (l.fluid.clone(), capacity.string_capacity_volume(l.top_m, l.bottom_m)));

    let mut stages: Vec<PumpStage> = Vec::new();
    for (fluid, volume) in annulus.chain(string) {
        if volume <= 0.0 {
            continue;
        }
        match stages.last_mut() {
            Some(last) if last.fluid.is_same_fluid(&fluid) => last.total_volume_m3 += volume,
            _ => stages.push(PumpStage::new(fluid, volume, stages.len())),
        }
    }
    stages
}

/// Where a cumulative pumped volume falls within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagePosition {
    /// Stages pumped completely.
    pub full_stages: usize,
    /// Fraction of the next stage pumped, in `[0, 1)`.
    pub progress: f64,
}

/// Timing of one stage at a given pump rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub order: usize,
    pub fluid: String,
    pub volume_m3: f64,
    pub start_m3: f64,
    pub end_m3: f64,
    /// `None` when the pump rate is zero.
    pub duration_min: Option<f64>,
}

/// Stages sorted by `order` with cumulative volumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpSchedule {
    stages: Vec<PumpStage>,
    /// End volume of each stage.
    cumulative_m3: Vec<f64>,
}

impl PumpSchedule {
    pub fn new(mut stages: Vec<PumpStage>) -> Self {
        stages.sort_by_key(|s| s.order);
        let cumulative_m3 = stages
            .iter()
            .scan(0.0, |acc, s| {
                *acc += s.total_volume_m3.max(0.0);
                Some(*acc)
            })
            .collect();
        Self {
            stages,
            cumulative_m3,
        }
    }

    pub fn stages(&self) -> &[PumpStage] {
        &self.stages
    }

    pub fn total_volume_m3(&self) -> f64 {
        self.cumulative_m3.last().copied().unwrap_or(0.0)
    }

    /// Stage index and fraction for a cumulative pumped volume.
    pub fn locate(&self, pumped_m3: f64) -> StagePosition {
        let mut start = 0.0;
        for (i, (&end, stage)) in self.cumulative_m3.iter().zip(&self.stages).enumerate() {
            if pumped_m3 < end {
                let volume = stage.total_volume_m3.max(0.0);
                let progress = if volume > 0.0 {
                    ((pumped_m3 - start) / volume).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return StagePosition {
                    full_stages: i,
                    progress,
                };
            }
            start = end;
        }
        StagePosition {
            full_stages: self.stages.len(),
            progress: 0.0,
        }
    }

    /// Minutes to pump each stage at `flow_rate_lpm`; `None` at zero rate.
    pub fn duration_minutes(&self, flow_rate_lpm: f64) -> Vec<Option<f64>> {
        self.timeline(flow_rate_lpm).into_iter().map(|t| t.duration_min).collect()
    }

    /// Volume window and duration of every stage at `flow_rate_lpm`.
    pub fn timeline(&self, flow_rate_lpm: f64) -> Vec<StageTiming> {
        let m3_per_min = flow_rate_lpm / 1000.0;
        let mut start = 0.0;
        self.stages
            .iter()
            .zip(&self.cumulative_m3)
            .map(|(stage, &end)| {
                let timing = StageTiming {
                    order: stage.order,
                    fluid: stage.fluid.display_name(),
                    volume_m3: stage.total_volume_m3,
                    start_m3: start,
                    end_m3: end,
                    duration_min: (m3_per_min > 0.0).then(|| stage.total_volume_m3 / m3_per_min),
                };
                start = end;
                timing
            })
            .collect()
    }
}
