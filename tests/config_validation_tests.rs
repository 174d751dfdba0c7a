//! Config Validation Tests
//!
//! Typo detection on raw TOML keys and range validation of parsed values,
//! exercised independently from the engine.

use wellbore_engine::config::validation::{
    known_config_keys, suggest_correction, validate_unknown_keys,
};
use wellbore_engine::config::{ConfigError, EngineConfig, PressureMode};

// ============================================================================
// Typo Detection Tests
// ============================================================================

#[test]
fn typo_in_hydraulics_key_warns_with_suggestion() {
    let toml_str = r#"
[hydraulics]
flow_rate_lmp = 2200.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("flow_rate_lmp"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("hydraulics.flow_rate_lpm"));
}

#[test]
fn typo_in_well_section_warns() {
    let toml_str = r#"
[well]
naem = "Test-Well"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].field.contains("naem"));
    // "naem" is distance 2 from "name" → should suggest
    assert_eq!(warnings[0].suggestion.as_deref(), Some("well.name"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[well]
name = "Endeavour-7"
field = "North Sea"
rig = "Maersk Invincible"

[fluids]
annulus_base_density_kgm3 = 1260.0
fallback_density_kgm3 = 1030.0

[hydraulics]
flow_rate_lpm = 2400.0
pressure_mode = "managed"
target_ecd_kgm3 = 1350.0
control_depth_md = 3150.0

[surge_swab]
trip_in_speed_mps = 0.4
pipe_end = "open"
eccentricity = 0.3

[solver]
max_iterations = 80
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
    let config = EngineConfig::from_toml_str(toml_str).expect("valid config");
    assert_eq!(config.hydraulics.pressure_mode, PressureMode::Managed);
}

#[test]
fn unknown_section_gets_no_suggestion() {
    let warnings = validate_unknown_keys("[telemetry]\nendpoint = \"x\"\n");
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn every_known_key_is_a_real_leaf_or_section() {
    let known = known_config_keys();
    assert!(known.contains("solver.max_rescale"));
    assert_eq!(
        suggest_correction("surge_swab.ecentricity", &known).as_deref(),
        Some("surge_swab.eccentricity")
    );
}

// ============================================================================
// Range Validation Tests
// ============================================================================

#[test]
fn negative_flow_rate_is_rejected() {
    let result = EngineConfig::from_toml_str("[hydraulics]\nflow_rate_lpm = -10.0\n");
    match result {
        Err(ConfigError::Validation(errors)) => assert!(errors[0].contains("flow_rate_lpm")),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn bad_pressure_mode_is_a_parse_error() {
    let result = EngineConfig::from_toml_str("[hydraulics]\npressure_mode = \"sideways\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(..))));
}

#[test]
fn load_from_file_reads_and_validates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("wellbore.toml");
    std::fs::write(&path, "[fluids]\nstring_base_density_kgm3 = 1180.0\n").expect("write");
    let config = EngineConfig::load_from_file(&path).expect("load");
    assert_eq!(config.fluids.string_base_density_kgm3, Some(1180.0));

    let missing = EngineConfig::load_from_file(&dir.path().join("nope.toml"));
    assert!(matches!(missing, Err(ConfigError::Io(..))));
}
