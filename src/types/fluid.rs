//! Fluid descriptions and the layer / segment types that place fluids in the well

use serde::{Deserialize, Serialize};

use super::geometry::DepthSpan;

/// Stable fluid identity, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FluidId(pub u64);

/// Power-law rheology: τ = K·γ̇ⁿ (K in Pa·sⁿ).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    pub k_pa_sn: f64,
    pub n: f64,
}

impl PowerLaw {
    pub const fn new(k_pa_sn: f64, n: f64) -> Self {
        Self { k_pa_sn, n }
    }

    /// Both parameters finite and positive.
    pub fn is_usable(&self) -> bool {
        self.k_pa_sn.is_finite() && self.n.is_finite() && self.k_pa_sn > 0.0 && self.n > 0.0
    }
}

/// Lab rheology for a fluid. Any combination may be present; resolution
/// prefers direct fits, then dial readings, then PV/YP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rheology {
    /// Plastic viscosity (cP).
    #[serde(default)]
    pub plastic_viscosity_cp: Option<f64>,
    /// Yield point (lbf/100ft²).
    #[serde(default)]
    pub yield_point_lbf_100ft2: Option<f64>,
    /// Fann dial reading at 600 rpm.
    #[serde(default)]
    pub dial_600: Option<f64>,
    /// Fann dial reading at 300 rpm.
    #[serde(default)]
    pub dial_300: Option<f64>,
    /// Direct power-law fit for flow inside the string.
    #[serde(default)]
    pub pipe_fit: Option<PowerLaw>,
    /// Direct power-law fit for flow in the annulus.
    #[serde(default)]
    pub annulus_fit: Option<PowerLaw>,
}

/// A fluid as authored in the fluid catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidSpec {
    #[serde(default)]
    pub id: Option<FluidId>,
    #[serde(default)]
    pub name: String,
    pub density_kgm3: f64,
    /// Display color; used as the sameness key when no id is present.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub rheology: Option<Rheology>,
}

impl FluidSpec {
    /// Anonymous fluid with only a density.
    pub fn with_density(density_kgm3: f64) -> Self {
        Self {
            id: None,
            name: String::new(),
            density_kgm3,
            color: None,
            rheology: None,
        }
    }

    pub fn named(id: u64, name: impl Into<String>, density_kgm3: f64) -> Self {
        Self {
            id: Some(FluidId(id)),
            name: name.into(),
            density_kgm3,
            color: None,
            rheology: None,
        }
    }

    #[must_use]
    pub fn with_rheology(mut self, rheology: Rheology) -> Self {
        self.rheology = Some(rheology);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Same-fluid test used for segment coalescing.
    ///
    /// Ids decide when both sides carry one; otherwise both colors must be
    /// present and equal. Anything else is treated as distinct.
    pub fn is_same_fluid(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.color, &other.color) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Name for logs and reports.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if let Some(id) = self.id {
            format!("fluid#{}", id.0)
        } else {
            format!("{:.0} kg/m³", self.density_kgm3)
        }
    }
}

/// Flow domain inside the well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Annulus,
    String,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Annulus => write!(f, "annulus"),
            Domain::String => write!(f, "string"),
        }
    }
}

/// Which domains a mud step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Annulus,
    String,
    Both,
}

impl Placement {
    pub fn targets(self, domain: Domain) -> bool {
        matches!(
            (self, domain),
            (Placement::Both, _)
                | (Placement::Annulus, Domain::Annulus)
                | (Placement::String, Domain::String)
        )
    }
}

/// Anything that places a fluid over a depth span.
pub trait FluidInterval: DepthSpan {
    fn fluid(&self) -> &FluidSpec;
}

/// One entry of the persisted fluid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidLayer {
    pub domain: Domain,
    pub top_m: f64,
    pub bottom_m: f64,
    pub fluid: FluidSpec,
    #[serde(default)]
    pub label: String,
}

impl FluidLayer {
    pub fn new(
        domain: Domain,
        top_m: f64,
        bottom_m: f64,
        fluid: FluidSpec,
        label: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            top_m,
            bottom_m,
            fluid,
            label: label.into(),
        }
    }

    /// Same layer restricted to a new span.
    pub fn with_span(&self, top_m: f64, bottom_m: f64) -> Self {
        Self {
            top_m,
            bottom_m,
            ..self.clone()
        }
    }
}

impl DepthSpan for FluidLayer {
    fn top_m(&self) -> f64 {
        self.top_m
    }
    fn bottom_m(&self) -> f64 {
        self.bottom_m
    }
}

impl FluidInterval for FluidLayer {
    fn fluid(&self) -> &FluidSpec {
        &self.fluid
    }
}

/// A fluid occupying a span of the string or annulus during displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidSegment {
    pub top_m: f64,
    pub bottom_m: f64,
    pub fluid: FluidSpec,
}

impl FluidSegment {
    pub const fn new(top_m: f64, bottom_m: f64, fluid: FluidSpec) -> Self {
        Self {
            top_m,
            bottom_m,
            fluid,
        }
    }
}

impl DepthSpan for FluidSegment {
    fn top_m(&self) -> f64 {
        self.top_m
    }
    fn bottom_m(&self) -> f64 {
        self.bottom_m
    }
}

impl FluidInterval for FluidSegment {
    fn fluid(&self) -> &FluidSpec {
        &self.fluid
    }
}

/// User instruction placing a fluid over an interval.
///
/// Steps apply in authored order, so a later step overrides an earlier one
/// wherever they overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MudStep {
    pub top_m: f64,
    pub bottom_m: f64,
    pub fluid: FluidSpec,
    pub placement: Placement,
    #[serde(default)]
    pub label: String,
}

impl MudStep {
    pub fn new(top_m: f64, bottom_m: f64, fluid: FluidSpec, placement: Placement) -> Self {
        Self {
            top_m,
            bottom_m,
            fluid,
            placement,
            label: String::new(),
        }
    }
}

/// One stage of a pumping program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpStage {
    pub fluid: FluidSpec,
    pub total_volume_m3: f64,
    #[serde(default)]
    pub order: usize,
}

impl PumpStage {
    pub const fn new(fluid: FluidSpec, total_volume_m3: f64, order: usize) -> Self {
        Self {
            fluid,
            total_volume_m3,
            order,
        }
    }
}
