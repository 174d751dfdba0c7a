//! Wellbore geometry records: annulus (casing / open hole) and drill-string
//! sections keyed by measured depth.

use serde::{Deserialize, Serialize};

/// Anything that occupies a measured-depth interval `[top_m, bottom_m]`.
pub trait DepthSpan {
    fn top_m(&self) -> f64;
    fn bottom_m(&self) -> f64;

    /// Interval length, never negative.
    fn length_m(&self) -> f64 {
        (self.bottom_m() - self.top_m()).max(0.0)
    }

    /// True when the span shares a positive-length overlap with `[top, bottom]`.
    fn overlaps(&self, top: f64, bottom: f64) -> bool {
        self.bottom_m() > top && self.top_m() < bottom
    }

    /// True when `md` lies inside the closed span.
    fn contains_md(&self, md: f64) -> bool {
        md >= self.top_m() && md <= self.bottom_m()
    }

    /// The part of the span inside `[top, bottom]`, if it has positive length.
    fn clipped(&self, top: f64, bottom: f64) -> Option<DepthInterval> {
        DepthInterval::new(self.top_m(), self.bottom_m()).clip(top, bottom)
    }
}

/// A bare measured-depth interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthInterval {
    pub top_m: f64,
    pub bottom_m: f64,
}

impl DepthInterval {
    pub const fn new(top_m: f64, bottom_m: f64) -> Self {
        Self { top_m, bottom_m }
    }

    /// Intersection with `[top, bottom]`, `None` when it has no positive length.
    pub fn clip(&self, top: f64, bottom: f64) -> Option<Self> {
        let t = self.top_m.max(top);
        let b = self.bottom_m.min(bottom);
        (b > t).then_some(Self::new(t, b))
    }
}

impl DepthSpan for DepthInterval {
    fn top_m(&self) -> f64 {
        self.top_m
    }
    fn bottom_m(&self) -> f64 {
        self.bottom_m
    }
}

/// Casing or open-hole section bounding the annulus.
///
/// `outer_diameter_m` is derived from the drill string during normalization
/// and is never read as an input; normalized sections carry 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnulusSection {
    #[serde(default)]
    pub label: String,
    pub top_m: f64,
    pub bottom_m: f64,
    /// Casing ID or hole diameter (m).
    pub inner_diameter_m: f64,
    #[serde(default)]
    pub outer_diameter_m: f64,
}

impl AnnulusSection {
    pub fn new(label: impl Into<String>, top_m: f64, bottom_m: f64, inner_diameter_m: f64) -> Self {
        Self {
            label: label.into(),
            top_m,
            bottom_m,
            inner_diameter_m,
            outer_diameter_m: 0.0,
        }
    }

    /// Copy of this section restricted to `[top_m, bottom_m]` with OD zeroed.
    pub fn with_span(&self, top_m: f64, bottom_m: f64) -> Self {
        Self {
            label: self.label.clone(),
            top_m,
            bottom_m,
            inner_diameter_m: self.inner_diameter_m,
            outer_diameter_m: 0.0,
        }
    }
}

impl DepthSpan for AnnulusSection {
    fn top_m(&self) -> f64 {
        self.top_m
    }
    fn bottom_m(&self) -> f64 {
        self.bottom_m
    }
}

/// Drill-string component (drill pipe, HWDP, collars, BHA) over an MD interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillStringSection {
    pub id: u64,
    #[serde(default)]
    pub label: String,
    pub top_m: f64,
    pub bottom_m: f64,
    pub inner_diameter_m: f64,
    pub outer_diameter_m: f64,
}

impl DrillStringSection {
    pub fn new(
        id: u64,
        label: impl Into<String>,
        top_m: f64,
        bottom_m: f64,
        inner_diameter_m: f64,
        outer_diameter_m: f64,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            top_m,
            bottom_m,
            inner_diameter_m,
            outer_diameter_m,
        }
    }
}

impl DepthSpan for DrillStringSection {
    fn top_m(&self) -> f64 {
        self.top_m
    }
    fn bottom_m(&self) -> f64 {
        self.bottom_m
    }
}

/// Ordered annulus and drill-string interval lists for one well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryModel {
    #[serde(default)]
    pub annulus: Vec<AnnulusSection>,
    #[serde(default)]
    pub drill_string: Vec<DrillStringSection>,
}

impl GeometryModel {
    pub fn new(annulus: Vec<AnnulusSection>, drill_string: Vec<DrillStringSection>) -> Self {
        Self {
            annulus,
            drill_string,
        }
    }

    /// Deepest bottom across both interval sets (0.0 when empty).
    pub fn total_depth_m(&self) -> f64 {
        self.annulus
            .iter()
            .map(DepthSpan::bottom_m)
            .chain(self.drill_string.iter().map(DepthSpan::bottom_m))
            .fold(0.0, f64::max)
    }

    /// Deepest drill-string bottom, i.e. the bit measured depth.
    pub fn bit_depth_m(&self) -> f64 {
        self.drill_string
            .iter()
            .map(DepthSpan::bottom_m)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_clip() {
        let i = DepthInterval::new(100.0, 200.0);
        assert_eq!(i.clip(150.0, 300.0), Some(DepthInterval::new(150.0, 200.0)));
        assert_eq!(i.clip(200.0, 300.0), None);
        assert_eq!(DepthInterval::new(5.0, 5.0).clip(0.0, 10.0), None);
    }

    #[test]
    fn test_total_depth_spans_both_sets() {
        let g = GeometryModel::new(
            vec![AnnulusSection::new("casing", 0.0, 800.0, 0.3)],
            vec![DrillStringSection::new(1, "dp", 0.0, 1200.0, 0.1, 0.127)],
        );
        assert_eq!(g.total_depth_m(), 1200.0);
        assert_eq!(g.bit_depth_m(), 1200.0);
        assert_eq!(GeometryModel::default().total_depth_m(), 0.0);
    }
}
