//! Annulus section normalization
//!
//! Keeps annulus sections non-overlapping with a locally constant effective
//! OD: each section is sliced wherever the drill-string OD beneath it changes,
//! then contiguous sections with equal ID and the same constant OD are merged
//! back together. Everything works on a materialized sorted snapshot and
//! returns a new list.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::decomposer::{covering_string, string_boundaries};
use crate::config::defaults::DIAMETER_TOLERANCE_M;
use crate::types::{AnnulusSection, DrillStringSection};

/// Drill-string OD covering `[top, bottom]`, 0.0 where no string is present.
fn covering_od(strings: &[DrillStringSection], top: f64, bottom: f64) -> f64 {
    covering_string(strings, top, bottom).map_or(0.0, |s| s.outer_diameter_m)
}

fn same_diameter(a: f64, b: f64) -> bool {
    (a - b).abs() <= DIAMETER_TOLERANCE_M
}

/// The drill-string OD over `[top, bottom]` if it is constant, else `None`.
pub fn constant_od_over(strings: &[DrillStringSection], top: f64, bottom: f64) -> Option<f64> {
    let bounds = string_boundaries(top, bottom, strings);
    let mut ods = bounds.windows(2).map(|w| covering_od(strings, w[0], w[1]));
    let first = ods.next()?;
    ods.all(|od| same_diameter(od, first)).then_some(first)
}

/// Split one section at every point where the drill-string OD changes.
///
/// Returns the section unchanged when there is nothing to split.
pub fn slice_section(
    section: &AnnulusSection,
    strings: &[DrillStringSection],
) -> Vec<AnnulusSection> {
    let bounds = string_boundaries(section.top_m, section.bottom_m, strings);

    // (run_top, run_bottom, od)
    let mut runs: Vec<(f64, f64, f64)> = Vec::new();
    for w in bounds.windows(2) {
        let od = covering_od(strings, w[0], w[1]);
        match runs.last_mut() {
            Some(run) if same_diameter(run.2, od) => run.1 = w[1],
            _ => runs.push((w[0], w[1], od)),
        }
    }

    if runs.len() <= 1 {
        return vec![section.clone()];
    }
    runs.into_iter()
        .map(|(top, bottom, _)| section.with_span(top, bottom))
        .collect()
}

fn can_merge(a: &AnnulusSection, b: &AnnulusSection, strings: &[DrillStringSection]) -> bool {
    if (a.bottom_m - b.top_m).abs() > DIAMETER_TOLERANCE_M
        || !same_diameter(a.inner_diameter_m, b.inner_diameter_m)
    {
        return false;
    }
    let (Some(od_a), Some(od_b), Some(od_u)) = (
        constant_od_over(strings, a.top_m, a.bottom_m),
        constant_od_over(strings, b.top_m, b.bottom_m),
        constant_od_over(strings, a.top_m, b.bottom_m),
    ) else {
        return false;
    };
    same_diameter(od_a, od_b) && same_diameter(od_a, od_u)
}

fn sort_by_top(sections: &mut [AnnulusSection]) {
    sections.sort_by(|a, b| a.top_m.total_cmp(&b.top_m));
}

/// Merge contiguous neighbors with equal ID and matching constant OD.
///
/// The scan restarts after every merge so merges cascade.
pub fn merge_contiguous_by_od(
    mut sections: Vec<AnnulusSection>,
    strings: &[DrillStringSection],
) -> Vec<AnnulusSection> {
    sort_by_top(&mut sections);
    while let Some(i) = (0..sections.len().saturating_sub(1))
        .find(|&i| can_merge(&sections[i], &sections[i + 1], strings))
    {
        let b = sections.remove(i + 1);
        let a = &sections[i];
        sections[i] = a.with_span(a.top_m, b.bottom_m);
    }
    sections
}

/// Slice every section against the drill string, then merge.
pub fn normalize_sections(
    sections: &[AnnulusSection],
    strings: &[DrillStringSection],
) -> Vec<AnnulusSection> {
    let mut snapshot = sections.to_vec();
    sort_by_top(&mut snapshot);
    let sliced: Vec<AnnulusSection> = snapshot
        .iter()
        .flat_map(|s| slice_section(s, strings))
        .collect();
    merge_contiguous_by_od(sliced, strings)
}

/// One (id, top, bottom, OD) entry of a drill-string change signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub id: u64,
    pub top_m: f64,
    pub bottom_m: f64,
    pub outer_diameter_m: f64,
}

/// Ordered drill-string tuples that decide whether normalization must rerun.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillStringSignature(pub Vec<SignatureEntry>);

impl DrillStringSignature {
    pub fn of(strings: &[DrillStringSection]) -> Self {
        Self(
            strings
                .iter()
                .map(|s| SignatureEntry {
                    id: s.id,
                    top_m: s.top_m,
                    bottom_m: s.bottom_m,
                    outer_diameter_m: s.outer_diameter_m,
                })
                .collect(),
        )
    }
}

/// Re-normalizes annulus sections only when the drill-string signature changes.
#[derive(Debug, Clone, Default)]
pub struct SectionNormalizer {
    last_signature: Option<DrillStringSignature>,
}

impl SectionNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn last_signature(&self) -> Option<&DrillStringSignature> {
        self.last_signature.as_ref()
    }

    /// `Some(normalized)` when the signature changed since the last call.
    pub fn normalize_if_changed(
        &mut self,
        sections: &[AnnulusSection],
        strings: &[DrillStringSection],
    ) -> Option<Vec<AnnulusSection>> {
        let signature = DrillStringSignature::of(strings);
        if self.last_signature.as_ref() == Some(&signature) {
            return None;
        }
        let normalized = normalize_sections(sections, strings);
        debug!(
            before = sections.len(),
            after = normalized.len(),
            string_sections = strings.len(),
            "Annulus sections re-normalized"
        );
        self.last_signature = Some(signature);
        Some(normalized)
    }
}
