//! Engine Configuration - operator-tunable fluids, hydraulics, surge/swab and
//! solver settings as TOML values
//!
//! Each struct implements `Default` with the built-in values, so an empty or
//! missing file behaves exactly like the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one well study.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$WELLBORE_CONFIG` env var
/// 2. `./wellbore.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Well / rig identification
    #[serde(default)]
    pub well: WellInfo,

    /// Base fluid densities
    #[serde(default)]
    pub fluids: FluidsConfig,

    /// Circulation and pressure management
    #[serde(default)]
    pub hydraulics: HydraulicsConfig,

    /// Tripping surge/swab sweep
    #[serde(default)]
    pub surge_swab: SurgeSwabConfig,

    /// Root-finder limits
    #[serde(default)]
    pub solver: SolverConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELLBORE_CONFIG` environment variable
    /// 2. `./wellbore.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("WELLBORE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(
                            path = %p.display(),
                            well = %config.well.name,
                            "Loaded engine config from WELLBORE_CONFIG"
                        );
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from WELLBORE_CONFIG, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "WELLBORE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("wellbore.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(well = %config.well.name, "Loaded engine config from ./wellbore.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./wellbore.toml, using defaults");
                }
            }
        }

        info!("No wellbore.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for physical plausibility and internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.fluids;
        for (name, value) in [
            ("fluids.annulus_base_density_kgm3", f.annulus_base_density_kgm3),
            ("fluids.string_base_density_kgm3", f.string_base_density_kgm3),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    errors.push(format!("{name} = {v} must be a positive density"));
                }
            }
        }
        if !f.fallback_density_kgm3.is_finite() || f.fallback_density_kgm3 <= 0.0 {
            errors.push(format!(
                "fluids.fallback_density_kgm3 = {} must be a positive density",
                f.fallback_density_kgm3
            ));
        }

        let h = &self.hydraulics;
        if !h.flow_rate_lpm.is_finite() || h.flow_rate_lpm < 0.0 {
            errors.push(format!(
                "hydraulics.flow_rate_lpm = {} cannot be negative",
                h.flow_rate_lpm
            ));
        }
        if !h.applied_sbp_kpa.is_finite() || h.applied_sbp_kpa < 0.0 {
            errors.push(format!(
                "hydraulics.applied_sbp_kpa = {} cannot be negative",
                h.applied_sbp_kpa
            ));
        }
        if h.pressure_mode == PressureMode::Managed {
            match h.target_ecd_kgm3 {
                Some(v) if v.is_finite() && v > 0.0 => {}
                Some(v) => {
                    errors.push(format!("hydraulics.target_ecd_kgm3 = {v} must be positive"));
                }
                None => {
                    let msg = "hydraulics.target_ecd_kgm3 is required in managed pressure mode";
                    errors.push(msg.to_string());
                }
            }
        }
        if let Some(md) = h.control_depth_md {
            if !md.is_finite() || md <= 0.0 {
                errors.push(format!("hydraulics.control_depth_md = {md} must be > 0"));
            }
        }

        let s = &self.surge_swab;
        for (name, v) in [
            ("surge_swab.trip_in_speed_mps", s.trip_in_speed_mps),
            ("surge_swab.trip_out_speed_mps", s.trip_out_speed_mps),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push(format!("{name} = {v} cannot be negative"));
            }
        }
        if !(0.0..=1.0).contains(&s.eccentricity) {
            errors.push(format!("surge_swab.eccentricity = {} must be within 0-1", s.eccentricity));
        }
        if !s.depth_step_m.is_finite() || s.depth_step_m <= 0.0 {
            errors.push(format!("surge_swab.depth_step_m = {} must be > 0", s.depth_step_m));
        }
        if !s.peak_velocity_factor.is_finite() || s.peak_velocity_factor < 1.0 {
            errors.push(format!(
                "surge_swab.peak_velocity_factor = {} must be >= 1",
                s.peak_velocity_factor
            ));
        }
        if let Some(kc) = s.clinging_constant {
            if !(0.0..=1.0).contains(&kc) {
                errors.push(format!("surge_swab.clinging_constant = {kc} must be within 0-1"));
            }
        }

        let sv = &self.solver;
        if sv.max_iterations == 0 || sv.max_iterations > defaults::MAX_SOLVER_ITERATIONS {
            errors.push(format!(
                "solver.max_iterations = {} must be within 1-{}",
                sv.max_iterations,
                defaults::MAX_SOLVER_ITERATIONS
            ));
        }
        if !sv.relative_tolerance.is_finite() || sv.relative_tolerance <= 0.0 {
            errors.push(format!(
                "solver.relative_tolerance = {} must be > 0",
                sv.relative_tolerance
            ));
        }
        if !sv.max_rescale.is_finite() || sv.max_rescale < 1.0 {
            errors.push(format!("solver.max_rescale = {} must be >= 1", sv.max_rescale));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Well Info
// ============================================================================

/// Identification metadata, used only in logs and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellInfo {
    #[serde(default = "default_well_name")]
    pub name: String,

    #[serde(default)]
    pub field: String,

    #[serde(default)]
    pub rig: String,
}

fn default_well_name() -> String {
    "DEFAULT".to_string()
}

impl Default for WellInfo {
    fn default() -> Self {
        Self {
            name: default_well_name(),
            field: String::new(),
            rig: String::new(),
        }
    }
}

// ============================================================================
// Fluids
// ============================================================================

/// Base fill densities for the two flow domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidsConfig {
    /// Annulus base density (kg/m³). Absent = use active fluid or fallback.
    #[serde(default)]
    pub annulus_base_density_kgm3: Option<f64>,

    /// String base density (kg/m³).
    #[serde(default)]
    pub string_base_density_kgm3: Option<f64>,

    /// Hard default when nothing else resolves (kg/m³).
    #[serde(default = "default_fallback_density")]
    pub fallback_density_kgm3: f64,
}

fn default_fallback_density() -> f64 { defaults::FALLBACK_DENSITY_KGM3 }

impl Default for FluidsConfig {
    fn default() -> Self {
        Self {
            annulus_base_density_kgm3: None,
            string_base_density_kgm3: None,
            fallback_density_kgm3: default_fallback_density(),
        }
    }
}

// ============================================================================
// Hydraulics
// ============================================================================

/// How surface back-pressure is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureMode {
    /// SBP is the configured applied value.
    #[default]
    Conventional,
    /// SBP is solved to hold a target ECD at the control depth.
    Managed,
}

/// Circulation rate and pressure-management settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicsConfig {
    /// Pump rate (L/min).
    #[serde(default)]
    pub flow_rate_lpm: f64,

    #[serde(default)]
    pub pressure_mode: PressureMode,

    /// Applied SBP in conventional mode (kPa).
    #[serde(default)]
    pub applied_sbp_kpa: f64,

    /// Target ECD at the control depth in managed mode (kg/m³).
    #[serde(default)]
    pub target_ecd_kgm3: Option<f64>,

    /// Control depth (MD, m). Absent = bit depth.
    #[serde(default)]
    pub control_depth_md: Option<f64>,
}

impl Default for HydraulicsConfig {
    fn default() -> Self {
        Self {
            flow_rate_lpm: 0.0,
            pressure_mode: PressureMode::Conventional,
            applied_sbp_kpa: 0.0,
            target_ecd_kgm3: None,
            control_depth_md: None,
        }
    }
}

// ============================================================================
// Surge / Swab
// ============================================================================

/// Whether fluid can enter the pipe bore while tripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeEnd {
    /// Float or plugged bit: the full OD disk displaces fluid.
    #[default]
    Closed,
    /// Open-ended pipe: only the steel wall displaces fluid.
    Open,
}

/// Tripping surge/swab sweep parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeSwabConfig {
    /// Running-in speed (m/s), drives surge.
    #[serde(default = "default_trip_speed")]
    pub trip_in_speed_mps: f64,

    /// Pulling-out speed (m/s), drives swab.
    #[serde(default = "default_trip_speed")]
    pub trip_out_speed_mps: f64,

    #[serde(default)]
    pub pipe_end: PipeEnd,

    /// Manual clinging constant. Absent = derived from geometry.
    #[serde(default)]
    pub clinging_constant: Option<f64>,

    /// Pipe eccentricity, 0 = concentric, 1 = touching the wall.
    #[serde(default)]
    pub eccentricity: f64,

    #[serde(default = "default_depth_step")]
    pub depth_step_m: f64,

    #[serde(default = "default_peak_velocity_factor")]
    pub peak_velocity_factor: f64,
}

fn default_trip_speed() -> f64 { 0.5 }
fn default_depth_step() -> f64 { defaults::SURGE_SWAB_DEPTH_STEP_M }
fn default_peak_velocity_factor() -> f64 { defaults::PEAK_VELOCITY_FACTOR }

impl Default for SurgeSwabConfig {
    fn default() -> Self {
        Self {
            trip_in_speed_mps: default_trip_speed(),
            trip_out_speed_mps: default_trip_speed(),
            pipe_end: PipeEnd::Closed,
            clinging_constant: None,
            eccentricity: 0.0,
            depth_step_m: default_depth_step(),
            peak_velocity_factor: default_peak_velocity_factor(),
        }
    }
}

// ============================================================================
// Solver
// ============================================================================

/// Bisection limits shared by every volume match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,

    /// Cap on the uniform rescale of annulus parcel lengths.
    #[serde(default = "default_max_rescale")]
    pub max_rescale: f64,
}

fn default_max_iterations() -> usize { defaults::MAX_SOLVER_ITERATIONS }
fn default_relative_tolerance() -> f64 { defaults::SOLVER_RELATIVE_TOLERANCE }
fn default_max_rescale() -> f64 { defaults::MAX_RESCALE_FACTOR }

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            relative_tolerance: default_relative_tolerance(),
            max_rescale: default_max_rescale(),
        }
    }
}

impl SolverConfig {
    pub fn settings(&self) -> crate::solver::SolverSettings {
        crate::solver::SolverSettings {
            max_iterations: self.max_iterations.min(defaults::MAX_SOLVER_ITERATIONS),
            relative_tolerance: self.relative_tolerance,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: EngineConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.fluids.fallback_density_kgm3, 1000.0);
        assert_eq!(config.solver.max_iterations, 96);
        assert_eq!(config.surge_swab.pipe_end, PipeEnd::Closed);
        assert_eq!(config.hydraulics.pressure_mode, PressureMode::Conventional);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[well]
name = "Test-Well-1"

[fluids]
annulus_base_density_kgm3 = 1260.0

[surge_swab]
pipe_end = "open"
"#;
        let config: EngineConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.well.name, "Test-Well-1");
        assert_eq!(config.fluids.annulus_base_density_kgm3, Some(1260.0));
        assert_eq!(config.fluids.string_base_density_kgm3, None);
        assert_eq!(config.surge_swab.pipe_end, PipeEnd::Open);
        assert_eq!(config.surge_swab.depth_step_m, 30.0);
    }

    #[test]
    fn test_managed_mode_requires_target_ecd() {
        let mut config = EngineConfig::default();
        config.hydraulics.pressure_mode = PressureMode::Managed;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("target_ecd_kgm3")));
        }
        config.hydraulics.target_ecd_kgm3 = Some(1300.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = EngineConfig::default();
        config.surge_swab.eccentricity = 1.5;
        config.solver.max_iterations = 500;
        config.fluids.fallback_density_kgm3 = -1.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3, "{errors:?}"),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut original = EngineConfig::default();
        original.fluids.annulus_base_density_kgm3 = Some(1200.0);
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: EngineConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(roundtripped.fluids.annulus_base_density_kgm3, Some(1200.0));
        assert_eq!(roundtripped.solver.relative_tolerance, original.solver.relative_tolerance);
    }

    #[test]
    fn test_solver_settings_capped() {
        let mut solver = SolverConfig::default();
        solver.max_iterations = 1000;
        assert_eq!(solver.settings().max_iterations, 96);
    }
}
