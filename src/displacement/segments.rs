//! Segment list primitives used by the displacement simulator.
//!
//! All functions take a sorted snapshot and return a new list.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{SEGMENT_CONTIGUITY_M, VOLUME_MATCH_TOLERANCE};
use crate::geometry::CapacityIntegrator;
use crate::solver::SolverSettings;
use crate::types::{FluidSegment, FluidSpec};

/// A volume of fluid leaving the string at the bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub volume_m3: f64,
    pub fluid: FluidSpec,
}

fn sorted(mut segments: Vec<FluidSegment>) -> Vec<FluidSegment> {
    segments.sort_by(|a, b| a.top_m.total_cmp(&b.top_m));
    segments
}

/// Coalesce touching segments that hold the same fluid.
pub fn merge_adjacent(segments: Vec<FluidSegment>) -> Vec<FluidSegment> {
    let mut out: Vec<FluidSegment> = Vec::with_capacity(segments.len());
    for seg in sorted(segments) {
        match out.last_mut() {
            Some(last)
                if (seg.top_m - last.bottom_m).abs() <= SEGMENT_CONTIGUITY_M
                    && last.fluid.is_same_fluid(&seg.fluid) =>
            {
                last.bottom_m = last.bottom_m.max(seg.bottom_m);
            }
            _ => out.push(seg),
        }
    }
    out
}

/// Remove `length` metres from the deep end of the string column.
///
/// Returns the surviving segments and one parcel per consumed piece, deepest
/// first. Each parcel volume is the string capacity of the piece it came from.
pub fn take_from_bottom(
    segments: &[FluidSegment],
    length: f64,
    capacity: &CapacityIntegrator<'_>,
) -> (Vec<FluidSegment>, Vec<Parcel>) {
    let mut remaining = sorted(segments.to_vec());
    let mut parcels = Vec::new();
    let mut to_take = length.max(0.0);

    while to_take > SEGMENT_CONTIGUITY_M {
        let Some(last) = remaining.last_mut() else {
            break;
        };
        let seg_len = last.bottom_m - last.top_m;
        let piece = seg_len.min(to_take);
        let cut = last.bottom_m - piece;
        parcels.push(Parcel {
            volume_m3: capacity.string_capacity_volume(cut, last.bottom_m),
            fluid: last.fluid.clone(),
        });
        to_take -= piece;
        if seg_len - piece <= SEGMENT_CONTIGUITY_M {
            remaining.pop();
        } else {
            last.bottom_m = cut;
        }
    }
    (remaining, parcels)
}

/// Push every segment deeper to make room for `volume_m3` at surface,
/// clipping at `limit`.
///
/// Boundaries move by string capacity, not by length, so each segment keeps
/// its volume where the bore changes size.
pub fn shift_down_by_volume(
    segments: Vec<FluidSegment>,
    volume_m3: f64,
    limit: f64,
    capacity: &CapacityIntegrator<'_>,
    settings: SolverSettings,
) -> Vec<FluidSegment> {
    let full = capacity.string_capacity_volume(0.0, limit);
    let snap = VOLUME_MATCH_TOLERANCE * volume_m3.max(1.0);
    let moved = |md: f64| {
        let v = capacity.string_capacity_volume(0.0, md) + volume_m3;
        if v >= full - snap {
            limit
        } else {
            capacity.length_for_string_volume_from_surface(v, limit, settings).value
        }
    };
    segments
        .into_iter()
        .filter_map(|mut s| {
            s.top_m = moved(s.top_m);
            s.bottom_m = moved(s.bottom_m).min(limit);
            (s.bottom_m - s.top_m > SEGMENT_CONTIGUITY_M).then_some(s)
        })
        .collect()
}

/// Move every segment shallower by `by`; anything above surface is discarded.
pub fn shift_up(segments: Vec<FluidSegment>, by: f64) -> Vec<FluidSegment> {
    segments
        .into_iter()
        .filter_map(|mut s| {
            s.top_m = (s.top_m - by).max(0.0);
            s.bottom_m -= by;
            (s.bottom_m - s.top_m > SEGMENT_CONTIGUITY_M).then_some(s)
        })
        .collect()
}
