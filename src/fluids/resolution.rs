//! Prioritized base-fluid resolution
//!
//! One function decides which density fills a domain before any mud step is
//! applied: the active fluid, else the configured base density, else the hard
//! default. The winning source travels with the value.

use serde::{Deserialize, Serialize};

use crate::config::FluidsConfig;
use crate::types::{Domain, FluidSpec};

/// Where a resolved base density came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensitySource {
    ActiveFluid,
    BaseDensity,
    HardDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDensity {
    pub density_kgm3: f64,
    pub source: DensitySource,
}

fn usable(density: f64) -> bool {
    density.is_finite() && density > 0.0
}

/// Resolve a base density: active fluid → base density → hard default.
///
/// Non-positive or non-finite candidates are skipped.
pub fn resolve_base_density(
    active_fluid: Option<&FluidSpec>,
    base_density_kgm3: Option<f64>,
    hard_default_kgm3: f64,
) -> ResolvedDensity {
    if let Some(fluid) = active_fluid.filter(|f| usable(f.density_kgm3)) {
        return ResolvedDensity {
            density_kgm3: fluid.density_kgm3,
            source: DensitySource::ActiveFluid,
        };
    }
    if let Some(density) = base_density_kgm3.filter(|d| usable(*d)) {
        return ResolvedDensity {
            density_kgm3: density,
            source: DensitySource::BaseDensity,
        };
    }
    ResolvedDensity {
        density_kgm3: hard_default_kgm3,
        source: DensitySource::HardDefault,
    }
}

/// The fluid that seeds one domain, with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseFluid {
    pub fluid: FluidSpec,
    pub source: DensitySource,
}

impl BaseFluid {
    /// Resolve the base fluid for `domain` from config and an optional active fluid.
    pub fn resolve(
        config: &FluidsConfig,
        domain: Domain,
        active_fluid: Option<&FluidSpec>,
    ) -> Self {
        let base = match domain {
            Domain::Annulus => config.annulus_base_density_kgm3,
            Domain::String => config.string_base_density_kgm3,
        };
        let resolved = resolve_base_density(active_fluid, base, config.fallback_density_kgm3);
        let fluid = match (resolved.source, active_fluid) {
            (DensitySource::ActiveFluid, Some(active)) => active.clone(),
            _ => FluidSpec {
                name: format!("Base {domain} fluid"),
                ..FluidSpec::with_density(resolved.density_kgm3)
            },
        };
        Self {
            fluid,
            source: resolved.source,
        }
    }
}
