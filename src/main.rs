//! wellbore-engine - well-control geometry and pressure calculator
//!
//! Evaluates one well scenario and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Surface-to-bit volumes
//! wellbore-engine well.toml volumes
//!
//! # Fluid column after mud steps, persisted to a sled store
//! wellbore-engine well.toml layers --store ./layers.db
//!
//! # Displacement halfway through the second pump stage
//! wellbore-engine well.toml pump --stage 1 --progress 0.5
//!
//! # Hydraulics with a config override
//! wellbore-engine --config rig.toml well.toml hydraulics
//! ```
//!
//! # Environment Variables
//!
//! - `WELLBORE_CONFIG`: Path to the engine config TOML (default: ./wellbore.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use wellbore_engine::config::EngineConfig;
use wellbore_engine::fluids::{derive_pump_stages, FluidLayerCompositor, LayerColumn, PumpSchedule};
use wellbore_engine::geometry::{CapacityIntegrator, SectionNormalizer};
use wellbore_engine::hydraulics::{HydraulicsEngine, SurgeSwabCalculator};
use wellbore_engine::scenario::Scenario;
use wellbore_engine::storage::SledLayerStore;
use wellbore_engine::types::{Domain, FluidSpec, GeometryModel, PumpStage};
use wellbore_engine::{DisplacementSimulator, DisplacementState};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wellbore-engine")]
#[command(about = "Wellbore geometry, fluid displacement and hydraulics engine")]
#[command(version)]
struct CliArgs {
    /// Engine config TOML; overrides WELLBORE_CONFIG and ./wellbore.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Scenario TOML describing geometry, fluids, survey and pump program
    scenario: PathBuf,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Surface-to-bit volume summary
    Volumes,
    /// Annulus sections normalized against the drill string
    Normalize,
    /// Composited fluid layer column
    Layers {
        /// Persist the column to a sled store at this path
        #[arg(long, value_name = "PATH")]
        store: Option<PathBuf>,
    },
    /// Pump stages derived from the layer column, with the pumping timeline
    Stages,
    /// Displacement snapshot during the pump program
    Pump {
        /// Number of completed stages
        #[arg(long, default_value_t = 0, conflicts_with = "volume")]
        stage: usize,
        /// Fraction of the next stage pumped (0-1)
        #[arg(long, default_value_t = 0.0, conflicts_with = "volume")]
        progress: f64,
        /// Cumulative pumped volume (m³)
        #[arg(long)]
        volume: Option<f64>,
    },
    /// Hydrostatic, friction, SBP, BHP, ECD and TCP at the control depth
    Hydraulics {
        /// Evaluate the displacement state after this cumulative volume (m³)
        /// instead of the designed layer column
        #[arg(long)]
        volume: Option<f64>,
    },
    /// Surge and swab sweep over a pipe-bottom depth range
    SurgeSwab {
        /// Top of the sweep (MD, m)
        #[arg(long, default_value_t = 0.0)]
        top: f64,
        /// Bottom of the sweep (MD, m); defaults to bit depth
        #[arg(long)]
        bottom: Option<f64>,
    },
}

// ============================================================================
// Scenario Preparation
// ============================================================================

/// Scenario with normalized geometry and resolved base column.
struct Prepared {
    scenario: Scenario,
    geometry: GeometryModel,
    bit_md: f64,
    annulus_base: FluidSpec,
    string_base: FluidSpec,
    column: LayerColumn,
}

fn prepare(scenario: Scenario, config: &EngineConfig) -> Result<Prepared> {
    let mut geometry = scenario.geometry();
    if let Some(normalized) =
        SectionNormalizer::new().normalize_if_changed(&geometry.annulus, &geometry.drill_string)
    {
        geometry.annulus = normalized;
    }

    let annulus_base = scenario.base_fluid(&config.fluids, Domain::Annulus)?;
    let string_base = scenario.base_fluid(&config.fluids, Domain::String)?;
    info!(
        annulus_base = %annulus_base.fluid.display_name(),
        annulus_source = ?annulus_base.source,
        string_base = %string_base.fluid.display_name(),
        string_source = ?string_base.source,
        "Base fluids resolved"
    );

    let column = FluidLayerCompositor::new(
        &geometry,
        annulus_base.fluid.clone(),
        string_base.fluid.clone(),
    )
        .compose(&scenario.mud_steps()?);
    let bit_md = scenario.bit_depth_m();

    Ok(Prepared {
        scenario,
        geometry,
        bit_md,
        annulus_base: annulus_base.fluid,
        string_base: string_base.fluid,
        column,
    })
}

impl Prepared {
    fn capacity(&self) -> CapacityIntegrator<'_> {
        CapacityIntegrator::new(&self.geometry)
    }

    /// Authored pump program, else stages derived from the layer column.
    fn pump_stages(&self) -> Result<Vec<PumpStage>> {
        let authored = self.scenario.pump_stages()?;
        if authored.is_empty() {
            Ok(derive_pump_stages(&self.column, &self.capacity()))
        } else {
            Ok(authored)
        }
    }

    /// Displacement starts from the pre-job base fluids in both domains.
    fn simulator(&self, config: &EngineConfig) -> DisplacementSimulator<'_> {
        DisplacementSimulator::new(
            self.capacity(),
            self.bit_md,
            self.annulus_base.clone(),
            self.string_base.clone(),
        )
        .with_solver(&config.solver)
    }

    fn displacement_at(&self, config: &EngineConfig, volume: f64) -> Result<DisplacementState> {
        Ok(self.simulator(config).snapshot_at_volume(&self.pump_stages()?, volume))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::load(),
    };
    info!(well = %config.well.name, field = %config.well.field, "Engine config ready");

    let scenario = Scenario::load_from_file(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;
    let prepared = prepare(scenario, &config)?;
    let capacity = prepared.capacity();

    match args.command {
        SubCommand::Volumes => {
            let summary = capacity.well_volumes(prepared.bit_md);
            let breakdown = capacity.integrate(0.0, prepared.bit_md);
            print_json(&json!({
                "well": summary,
                "surface_to_bit": breakdown,
                "rates": breakdown.rates(),
            }))
        }
        SubCommand::Normalize => print_json(&json!({
            "authored": prepared.scenario.annulus,
            "normalized": prepared.geometry.annulus,
        })),
        SubCommand::Layers { store } => {
            if let Some(path) = store {
                let mut store = SledLayerStore::open(&path)
                    .with_context(|| format!("Failed to open layer store {}", path.display()))?;
                prepared.column.persist(&mut store)?;
                store.flush()?;
                info!(path = %path.display(), "Layer column stored");
            }
            print_json(&prepared.column)
        }
        SubCommand::Stages => {
            let stages = derive_pump_stages(&prepared.column, &capacity);
            let schedule = PumpSchedule::new(stages);
            print_json(&json!({
                "stages": schedule.stages(),
                "total_volume_m3": schedule.total_volume_m3(),
                "flow_rate_lpm": config.hydraulics.flow_rate_lpm,
                "timeline": schedule.timeline(config.hydraulics.flow_rate_lpm),
            }))
        }
        SubCommand::Pump { stage, progress, volume } => {
            let stages = prepared.pump_stages()?;
            let simulator = prepared.simulator(&config);
            let state = match volume {
                Some(v) => simulator.snapshot_at_volume(&stages, v),
                None => simulator.snapshot(&stages, stage, progress),
            };
            print_json(&state)
        }
        SubCommand::Hydraulics { volume } => {
            let survey = prepared.scenario.survey_profile();
            let engine = HydraulicsEngine::new(capacity, &survey, &config.hydraulics);
            let report = match volume {
                Some(v) => {
                    let state = prepared.displacement_at(&config, v)?;
                    engine.evaluate(
                        &state.annulus_segments,
                        &state.string_segments,
                        prepared.bit_md,
                    )
                }
                None => engine.evaluate(
                    &prepared.column.annulus,
                    &prepared.column.string,
                    prepared.bit_md,
                ),
            };
            print_json(&report)
        }
        SubCommand::SurgeSwab { top, bottom } => {
            let survey = prepared.scenario.survey_profile();
            let calculator = SurgeSwabCalculator::new(capacity, &survey, &config.surge_swab);
            let bottom = bottom.unwrap_or(prepared.bit_md);
            let report = calculator.sweep(&prepared.column.annulus, top, bottom);
            print_json(&report)
        }
    }
}
