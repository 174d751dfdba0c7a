//! Scenario files
//!
//! A scenario bundles one well's inputs in TOML: geometry, the fluid
//! catalog, survey stations, mud steps and a pump program. Mud steps and
//! pump stages refer to catalog fluids by name.
//!
//! ```toml
//! active_fluid = "OBM"
//!
//! [[annulus]]
//! label = "13 3/8 casing"
//! top_m = 0.0
//! bottom_m = 1200.0
//! inner_diameter_m = 0.315
//!
//! [[drill_string]]
//! id = 1
//! top_m = 0.0
//! bottom_m = 2800.0
//! inner_diameter_m = 0.108
//! outer_diameter_m = 0.127
//!
//! [[fluids]]
//! id = 1
//! name = "OBM"
//! density_kgm3 = 1320.0
//!
//! [[mud_steps]]
//! top_m = 2400.0
//! bottom_m = 2800.0
//! fluid = "OBM"
//! placement = "both"
//!
//! [[pump_stages]]
//! fluid = "OBM"
//! volume_m3 = 12.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::FluidsConfig;
use crate::fluids::BaseFluid;
use crate::hydraulics::SurveyProfile;
use crate::types::{
    AnnulusSection, Domain, DrillStringSection, FluidSpec, GeometryModel, MudStep, Placement,
    PumpStage,
    SurveyStation,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Scenario parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Unknown fluid '{0}' (not in the fluid catalog)")]
    UnknownFluid(String),

    #[error("Scenario validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MudStepEntry {
    pub top_m: f64,
    pub bottom_m: f64,
    pub fluid: String,
    pub placement: Placement,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpStageEntry {
    pub fluid: String,
    pub volume_m3: f64,
    /// Defaults to the entry position.
    #[serde(default)]
    pub order: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Bit depth override; defaults to the deepest drill-string bottom.
    #[serde(default)]
    pub bit_depth_m: Option<f64>,
    /// Catalog fluid currently in the hole, seeds both base columns.
    #[serde(default)]
    pub active_fluid: Option<String>,
    #[serde(default)]
    pub annulus: Vec<AnnulusSection>,
    #[serde(default)]
    pub drill_string: Vec<DrillStringSection>,
    #[serde(default)]
    pub fluids: Vec<FluidSpec>,
    #[serde(default)]
    pub survey: Vec<SurveyStation>,
    #[serde(default)]
    pub mud_steps: Vec<MudStepEntry>,
    #[serde(default)]
    pub pump_stages: Vec<PumpStageEntry>,
}

impl Scenario {
    pub fn load_from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(path.to_path_buf(), e))?;
        let scenario: Self =
            toml::from_str(&contents).map_err(|e| ScenarioError::Parse(path.to_path_buf(), e))?;
        scenario.validate()?;
        info!(
            path = %path.display(),
            annulus_sections = scenario.annulus.len(),
            string_sections = scenario.drill_string.len(),
            fluids = scenario.fluids.len(),
            "Scenario loaded"
        );
        Ok(scenario)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self =
            toml::from_str(contents)
                .map_err(|e| ScenarioError::Parse(PathBuf::from("<inline>"), e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Structural checks: positive diameters, ordered intervals, unique
    /// fluid names, and every fluid reference resolvable.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut errors = Vec::new();

        for (i, s) in self.annulus.iter().enumerate() {
            if !(s.bottom_m > s.top_m) {
                errors.push(format!("annulus[{i}] has bottom_m <= top_m"));
            }
            if !(s.inner_diameter_m > 0.0) {
                errors.push(format!("annulus[{i}].inner_diameter_m must be > 0"));
            }
        }
        for (i, s) in self.drill_string.iter().enumerate() {
            if !(s.bottom_m > s.top_m) {
                errors.push(format!("drill_string[{i}] has bottom_m <= top_m"));
            }
            if !(s.outer_diameter_m > 0.0)
                || s.inner_diameter_m < 0.0
                || s.inner_diameter_m >= s.outer_diameter_m
            {
                errors.push(format!(
                    "drill_string[{i}] needs 0 <= inner_diameter_m < outer_diameter_m"
                ));
            }
        }

        let mut names: Vec<&str> = Vec::new();
        for f in &self.fluids {
            if !(f.density_kgm3 > 0.0) {
                errors.push(format!("fluid '{}' density must be > 0", f.name));
            }
            if names.contains(&f.name.as_str()) {
                errors.push(format!("fluid name '{}' is used twice", f.name));
            }
            names.push(&f.name);
        }

        let references = self
            .mud_steps
            .iter()
            .map(|s| &s.fluid)
            .chain(self.pump_stages.iter().map(|s| &s.fluid))
            .chain(self.active_fluid.iter());
        for name in references {
            if !names.contains(&name.as_str()) {
                errors.push(format!("unknown fluid '{name}'"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Validation(errors))
        }
    }

    pub fn geometry(&self) -> GeometryModel {
        GeometryModel::new(self.annulus.clone(), self.drill_string.clone())
    }

    pub fn bit_depth_m(&self) -> f64 {
        self.bit_depth_m.unwrap_or_else(|| self.geometry().bit_depth_m())
    }

    pub fn survey_profile(&self) -> SurveyProfile {
        SurveyProfile::new(self.survey.clone())
    }

    pub fn fluid(&self, name: &str) -> Result<&FluidSpec, ScenarioError> {
        self.fluids
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ScenarioError::UnknownFluid(name.to_string()))
    }

    pub fn active_fluid(&self) -> Result<Option<&FluidSpec>, ScenarioError> {
        self.active_fluid.as_deref().map(|name| self.fluid(name)).transpose()
    }

    /// Base fluid for `domain`, resolved against `config`.
    pub fn base_fluid(
        &self,
        config: &FluidsConfig,
        domain: Domain,
    ) -> Result<BaseFluid, ScenarioError> {
        Ok(BaseFluid::resolve(config, domain, self.active_fluid()?))
    }

    pub fn mud_steps(&self) -> Result<Vec<MudStep>, ScenarioError> {
        self.mud_steps
            .iter()
            .map(|entry| -> Result<MudStep, ScenarioError> {
                Ok(MudStep {
                    label: entry.label.clone(),
                    ..MudStep::new(
                        entry.top_m,
                        entry.bottom_m,
                        self.fluid(&entry.fluid)?.clone(),
                        entry.placement,
                    )
                })
            })
            .collect()
    }

    pub fn pump_stages(&self) -> Result<Vec<PumpStage>, ScenarioError> {
        self.pump_stages
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<PumpStage, ScenarioError> {
                Ok(PumpStage::new(
                    self.fluid(&entry.fluid)?.clone(),
                    entry.volume_m3,
                    entry.order.unwrap_or(i),
                ))
            })
            .collect()
    }
}
