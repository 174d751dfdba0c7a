//! Measured depth to true vertical depth
//!
//! Linear interpolation between survey stations, clamped to the first and
//! last station. With fewer than two stations MD is used as TVD.

use tracing::debug;

use crate::types::{Advisory, SurveyStation};

/// Survey stations sorted by MD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyProfile {
    stations: Vec<SurveyStation>,
}

impl SurveyProfile {
    pub fn new(mut stations: Vec<SurveyStation>) -> Self {
        stations.retain(|s| s.md_m.is_finite() && s.tvd_m.is_finite());
        stations.sort_by(|a, b| a.md_m.total_cmp(&b.md_m));
        Self { stations }
    }

    pub fn stations(&self) -> &[SurveyStation] {
        &self.stations
    }

    /// True when interpolation is possible.
    pub fn is_usable(&self) -> bool {
        self.stations.len() >= 2
    }

    /// `MissingSurveyData` when MD is standing in for TVD.
    pub fn advisory(&self) -> Option<Advisory> {
        (!self.is_usable()).then(|| Advisory::MissingSurveyData {
            stations: self.stations.len(),
        })
    }

    pub fn md_to_tvd(&self, md: f64) -> f64 {
        let (first, last) = match (self.stations.first(), self.stations.last()) {
            (Some(first), Some(last)) if self.is_usable() => (first, last),
            _ => return md,
        };
        if md <= first.md_m {
            return first.tvd_m;
        }
        if md >= last.md_m {
            return last.tvd_m;
        }
        // First station strictly deeper than md; always exists past the clamps.
        let i = self.stations.partition_point(|s| s.md_m <= md);
        let (a, b) = (&self.stations[i - 1], &self.stations[i]);
        let span = b.md_m - a.md_m;
        if span <= 0.0 {
            debug!(md_m = a.md_m, "Duplicate survey MD, using upper station");
            return a.tvd_m;
        }
        a.tvd_m + (md - a.md_m) / span * (b.tvd_m - a.tvd_m)
    }
}
