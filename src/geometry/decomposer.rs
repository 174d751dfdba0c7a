//! Interval decomposition
//!
//! Merges the edges of every annulus and drill-string interval that touches a
//! query range into one sorted boundary sequence. Between two consecutive
//! boundaries the covering sections are constant, so each sub-interval can be
//! integrated with a single cross-section.

use crate::config::defaults::BOUNDARY_TOLERANCE_M;
use crate::types::{AnnulusSection, DepthSpan, DrillStringSection};

/// One piece of a decomposed range with its covering sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubInterval<'a> {
    pub top_m: f64,
    pub bottom_m: f64,
    pub annulus: Option<&'a AnnulusSection>,
    pub string: Option<&'a DrillStringSection>,
}

impl SubInterval<'_> {
    pub fn length_m(&self) -> f64 {
        (self.bottom_m - self.top_m).max(0.0)
    }

    /// Drill-string OD over this piece, 0.0 where no string is present.
    pub fn string_od_m(&self) -> f64 {
        self.string.map_or(0.0, |s| s.outer_diameter_m)
    }
}

/// Push the clamped edges of every item overlapping `[top, bottom]`.
fn push_edges<T: DepthSpan>(top: f64, bottom: f64, items: &[T], out: &mut Vec<f64>) {
    for item in items.iter().filter(|i| i.overlaps(top, bottom)) {
        out.push(item.top_m().clamp(top, bottom));
        out.push(item.bottom_m().clamp(top, bottom));
    }
}

/// Sort and drop boundaries closer than `tolerance` to their predecessor.
pub fn sort_dedup(mut points: Vec<f64>, tolerance: f64) -> Vec<f64> {
    points.retain(|p| p.is_finite());
    points.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::with_capacity(points.len());
    for p in points {
        match out.last() {
            Some(&last) if (p - last).abs() <= tolerance => {}
            _ => out.push(p),
        }
    }
    out
}

/// Sorted, de-duplicated boundaries of `[top, bottom]` and every overlapping
/// annulus and drill-string interval edge. Empty when `bottom <= top`.
pub fn merged_boundaries(
    top: f64,
    bottom: f64,
    annulus: &[AnnulusSection],
    strings: &[DrillStringSection],
) -> Vec<f64> {
    if !(bottom > top) {
        return Vec::new();
    }
    let mut points = vec![top, bottom];
    push_edges(top, bottom, annulus, &mut points);
    push_edges(top, bottom, strings, &mut points);
    sort_dedup(points, BOUNDARY_TOLERANCE_M)
}

/// Boundaries of `[top, bottom]` cut only by drill-string edges.
pub fn string_boundaries(top: f64, bottom: f64, strings: &[DrillStringSection]) -> Vec<f64> {
    merged_boundaries(top, bottom, &[], strings)
}

/// Annulus section covering the sub-interval `[top, bottom]`.
///
/// Normalized geometry has at most one; with overlapping input the first in
/// list order wins.
pub fn covering_annulus(
    sections: &[AnnulusSection],
    top: f64,
    bottom: f64,
) -> Option<&AnnulusSection> {
    let mid = 0.5 * (top + bottom);
    sections.iter().find(|s| s.contains_md(mid))
}

/// Drill-string section covering `[top, bottom]`; the larger OD wins a tie.
pub fn covering_string(
    strings: &[DrillStringSection],
    top: f64,
    bottom: f64,
) -> Option<&DrillStringSection> {
    let mid = 0.5 * (top + bottom);
    strings
        .iter()
        .filter(|s| s.contains_md(mid))
        .max_by(|a, b| a.outer_diameter_m.total_cmp(&b.outer_diameter_m))
}

/// Split `[top, bottom]` into sub-intervals with constant covering sections.
pub fn decompose<'a>(
    top: f64,
    bottom: f64,
    annulus: &'a [AnnulusSection],
    strings: &'a [DrillStringSection],
) -> Vec<SubInterval<'a>> {
    merged_boundaries(top, bottom, annulus, strings)
        .windows(2)
        .map(|w| SubInterval {
            top_m: w[0],
            bottom_m: w[1],
            annulus: covering_annulus(annulus, w[0], w[1]),
            string: covering_string(strings, w[0], w[1]),
        })
        .collect()
}
