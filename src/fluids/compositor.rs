//! Fluid layer compositor
//!
//! Builds, per domain, an ordered non-overlapping partition of `[0, TD]`: one
//! base layer, then every mud step overlaid in authored order. Each overlay
//! keeps disjoint layers, trims overlapped ones to their surviving remainders
//! and appends the new layer, so the column stays a total partition after
//! every step. The result is a full snapshot meant to replace whatever was
//! stored before.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{LayerStore, StoreError};
use crate::types::{Advisory, DepthSpan, Domain, FluidLayer, FluidSpec, GeometryModel, MudStep};

/// Overlay `new_layer` onto `layers`, returning the new sorted partition.
pub fn overlay(layers: &[FluidLayer], new_layer: FluidLayer) -> Vec<FluidLayer> {
    let (t, b) = (new_layer.top_m, new_layer.bottom_m);
    let mut out: Vec<FluidLayer> = Vec::with_capacity(layers.len() + 2);
    for layer in layers {
        if layer.bottom_m <= t || layer.top_m >= b {
            out.push(layer.clone());
            continue;
        }
        if t > layer.top_m {
            out.push(layer.with_span(layer.top_m, t));
        }
        if layer.bottom_m > b {
            out.push(layer.with_span(b, layer.bottom_m));
        }
    }
    out.push(new_layer);
    out.sort_by(|a, b| a.top_m.total_cmp(&b.top_m));
    out
}

/// Both domain columns for one well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerColumn {
    pub total_depth_m: f64,
    pub annulus: Vec<FluidLayer>,
    pub string: Vec<FluidLayer>,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl LayerColumn {
    pub fn layers(&self, domain: Domain) -> &[FluidLayer] {
        match domain {
            Domain::Annulus => &self.annulus,
            Domain::String => &self.string,
        }
    }

    /// Fluid at `md` in `domain`; the shallower layer wins on a shared boundary.
    pub fn fluid_at(&self, domain: Domain, md: f64) -> Option<&FluidSpec> {
        self.layers(domain)
            .iter()
            .find(|l| l.contains_md(md))
            .map(|l| &l.fluid)
    }

    /// Annulus layers followed by string layers.
    pub fn all_layers(&self) -> Vec<FluidLayer> {
        self.annulus.iter().chain(self.string.iter()).cloned().collect()
    }

    /// Replace everything in `store` with this column.
    pub fn persist<S: LayerStore>(&self, store: &mut S) -> Result<(), StoreError> {
        let layers = self.all_layers();
        store.replace_all(&layers)?;
        debug!(layers = layers.len(), "Fluid layer column persisted");
        Ok(())
    }
}

/// Composites the fluid column from base fills plus mud steps.
#[derive(Debug, Clone)]
pub struct FluidLayerCompositor {
    total_depth_m: f64,
    annulus_base: FluidSpec,
    string_base: FluidSpec,
}

impl FluidLayerCompositor {
    /// TD is the deepest bottom across all geometry.
    pub fn new(geometry: &GeometryModel, annulus_base: FluidSpec, string_base: FluidSpec) -> Self {
        Self {
            total_depth_m: geometry.total_depth_m(),
            annulus_base,
            string_base,
        }
    }

    pub const fn total_depth_m(&self) -> f64 {
        self.total_depth_m
    }

    fn base_layer(&self, domain: Domain) -> Vec<FluidLayer> {
        if self.total_depth_m <= 0.0 {
            return Vec::new();
        }
        let fluid = match domain {
            Domain::Annulus => self.annulus_base.clone(),
            Domain::String => self.string_base.clone(),
        };
        vec![FluidLayer::new(domain, 0.0, self.total_depth_m, fluid, "Base")]
    }

    /// Apply `steps` in authored order over fresh base columns.
    pub fn compose(&self, steps: &[MudStep]) -> LayerColumn {
        let mut column = LayerColumn {
            total_depth_m: self.total_depth_m,
            annulus: self.base_layer(Domain::Annulus),
            string: self.base_layer(Domain::String),
            advisories: Vec::new(),
        };

        for step in steps {
            let top = step.top_m.max(0.0);
            let bottom = step.bottom_m.min(self.total_depth_m);
            if !(bottom > top) {
                warn!(
                    top_m = step.top_m,
                    bottom_m = step.bottom_m,
                    total_depth_m = self.total_depth_m,
                    "Mud step has no extent inside the well, skipped"
                );
                column.advisories.push(Advisory::DegenerateInterval {
                    top_m: step.top_m,
                    bottom_m: step.bottom_m,
                });
                continue;
            }
            for domain in [Domain::Annulus, Domain::String] {
                if !step.placement.targets(domain) {
                    continue;
                }
                let layer =
                    FluidLayer::new(domain, top, bottom, step.fluid.clone(), step.label.clone());
                let target = match domain {
                    Domain::Annulus => &mut column.annulus,
                    Domain::String => &mut column.string,
                };
                *target = overlay(target, layer);
            }
        }
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLayerStore;
    use crate::types::{AnnulusSection, DrillStringSection, Placement};

    fn geometry() -> GeometryModel {
        GeometryModel::new(
            vec![AnnulusSection::new("hole", 0.0, 1000.0, 0.3)],
            vec![DrillStringSection::new(1, "dp", 0.0, 1000.0, 0.08, 0.1)],
        )
    }

    fn spans(layers: &[FluidLayer]) -> Vec<(f64, f64, f64)> {
        layers.iter().map(|l| (l.top_m, l.bottom_m, l.fluid.density_kgm3)).collect()
    }

    fn compositor() -> FluidLayerCompositor {
        FluidLayerCompositor::new(
            &geometry(),
            FluidSpec::with_density(1260.0),
            FluidSpec::with_density(1100.0),
        )
    }

    #[test]
    fn test_single_overlay_yields_three_layers() {
        let steps = vec![MudStep::new(
            100.0, 200.0,
            FluidSpec::with_density(1800.0),
            Placement::Annulus,
        )];
        let column = compositor().compose(&steps);
        assert_eq!(
            spans(&column.annulus),
            vec![(0.0, 100.0, 1260.0), (100.0, 200.0, 1800.0), (200.0, 1000.0, 1260.0)]
        );
        assert_eq!(spans(&column.string), vec![(0.0, 1000.0, 1100.0)]);
    }

    #[test]
    fn test_later_step_overrides_earlier() {
        let steps = vec![
            MudStep::new(0.0, 600.0, FluidSpec::with_density(1500.0), Placement::Both),
            MudStep::new(400.0, 800.0, FluidSpec::with_density(1700.0), Placement::Annulus),
        ];
        let column = compositor().compose(&steps);
        assert_eq!(
            spans(&column.annulus),
            vec![(0.0, 400.0, 1500.0), (400.0, 800.0, 1700.0), (800.0, 1000.0, 1260.0)]
        );
        assert_eq!(spans(&column.string), vec![(0.0, 600.0, 1500.0), (600.0, 1000.0, 1100.0)]);
    }

    #[test]
    fn test_overlay_covering_everything() {
        let steps = vec![
            MudStep::new(100.0, 200.0, FluidSpec::with_density(1800.0), Placement::String),
            MudStep::new(0.0, 5000.0, FluidSpec::with_density(1020.0), Placement::String),
        ];
        let column = compositor().compose(&steps);
        assert_eq!(spans(&column.string), vec![(0.0, 1000.0, 1020.0)]);
    }

    #[test]
    fn test_step_outside_well_is_flagged() {
        let steps = vec![MudStep::new(
            1200.0, 1300.0,
            FluidSpec::with_density(1800.0),
            Placement::Both,
        )];
        let column = compositor().compose(&steps);
        assert_eq!(column.annulus.len(), 1);
        assert!(matches!(column.advisories[0], Advisory::DegenerateInterval { .. }));
    }

    #[test]
    fn test_fluid_at_lookup() {
        let steps = vec![MudStep::new(
            100.0, 200.0,
            FluidSpec::with_density(1800.0),
            Placement::Annulus,
        )];
        let column = compositor().compose(&steps);
        let at = |md| column.fluid_at(Domain::Annulus, md).map(|f| f.density_kgm3);
        assert_eq!(at(150.0), Some(1800.0));
        assert_eq!(at(100.0), Some(1260.0));
        assert_eq!(at(1500.0), None);
    }

    #[test]
    fn test_persist_replaces_everything() {
        let mut store = MemoryLayerStore::default();
        let c = compositor();
        c.compose(&[MudStep::new(100.0, 200.0, FluidSpec::with_density(1800.0), Placement::Both)])
            .persist(&mut store)
            .expect("memory store never fails");
        assert_eq!(store.load_all().expect("load").len(), 6);

        c.compose(&[]).persist(&mut store).expect("memory store never fails");
        assert_eq!(store.load_all().expect("load").len(), 2);
    }
}
