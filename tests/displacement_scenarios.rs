//! End-to-end displacement scenarios: column design, stage derivation and
//! snapshot replay against a tapered well.

use wellbore_engine::displacement::DisplacementSimulator;
use wellbore_engine::fluids::{derive_pump_stages, FluidLayerCompositor, PumpSchedule};
use wellbore_engine::geometry::{normalize_sections, CapacityIntegrator};
use wellbore_engine::storage::{LayerStore, SledLayerStore};
use wellbore_engine::types::{
    AnnulusSection, Domain, DrillStringSection, FluidSegment, FluidSpec, GeometryModel, MudStep,
    Placement, PumpStage,
};

fn tapered_well() -> GeometryModel {
    let strings = vec![
        DrillStringSection::new(1, "5in dp", 0.0, 2500.0, 0.1086, 0.127),
        DrillStringSection::new(2, "hwdp", 2500.0, 2750.0, 0.0762, 0.127),
        DrillStringSection::new(3, "collars", 2750.0, 3000.0, 0.0714, 0.1651),
    ];
    let annulus = normalize_sections(
        &[
            AnnulusSection::new("9 5/8 casing", 0.0, 1800.0, 0.2168),
            AnnulusSection::new("8 1/2 hole", 1800.0, 3000.0, 0.2159),
        ],
        &strings,
    );
    GeometryModel::new(annulus, strings)
}

fn obm() -> FluidSpec {
    FluidSpec::named(1, "OBM 1.32", 1320.0)
}

fn kill_mud() -> FluidSpec {
    FluidSpec::named(2, "Kill mud 1.45", 1450.0)
}

fn spacer() -> FluidSpec {
    FluidSpec::named(3, "Spacer", 1380.0)
}

#[test]
fn full_string_volume_swaps_the_string() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    let sim = DisplacementSimulator::new(cap, 3000.0, obm(), obm());
    let string_volume = cap.string_capacity_volume(0.0, 3000.0);

    let state = sim.snapshot(&[PumpStage::new(kill_mud(), string_volume, 0)], 1, 0.0);

    assert_eq!(state.string_segments.len(), 1);
    assert_eq!(state.string_segments[0].fluid, kill_mud());
    assert!((state.string_segments[0].bottom_m - 3000.0).abs() < 1e-6);
    assert_eq!(state.fluid_at(Domain::Annulus, 10.0), Some(&obm()));
}

#[test]
fn annulus_gains_stage_volume_regardless_of_parcel_count() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    // A distinct annulus fluid keeps the string's returns identifiable.
    let annulus_mud = FluidSpec::named(9, "Annulus OBM", 1320.0);
    let sim = DisplacementSimulator::new(cap, 3000.0, annulus_mud.clone(), obm());

    // Three fluids stacked in the string across three string IDs: one stage
    // exits as several parcels.
    let mut state = sim.initial_state();
    state.string_segments = vec![
        FluidSegment::new(0.0, 2600.0, obm()),
        FluidSegment::new(2600.0, 2800.0, spacer()),
        FluidSegment::new(2800.0, 3000.0, kill_mud()),
    ];
    let volume = 8.0;
    sim.apply_stage(&mut state, &kill_mud(), volume);

    let returned: Vec<_> = state
        .annulus_segments
        .iter()
        .filter(|s| s.fluid != annulus_mud)
        .collect();
    // The deepest string fluid left first and sits highest. The string still
    // holds far more than one stage, so none of the new fluid reaches the bit.
    let fluids: Vec<&str> = returned.iter().map(|s| s.fluid.name.as_str()).collect();
    assert_eq!(fluids, vec!["Kill mud 1.45", "Spacer", "OBM 1.32"]);
    assert!((returned[2].bottom_m - 3000.0).abs() < 1e-9);

    let gained: f64 = returned.iter().map(|s| cap.annular_volume(s.top_m, s.bottom_m)).sum();
    assert!((gained - volume).abs() < 1e-5 * volume, "gained {gained}");

    // The string keeps its volume: the stage on top, the rest of the OBM
    // pushed down to the bit.
    assert_eq!(state.string_segments.len(), 2);
    let top = &state.string_segments[0];
    assert_eq!(top.fluid, kill_mud());
    assert!((cap.string_capacity_volume(top.top_m, top.bottom_m) - volume).abs() < 1e-6);
    assert_eq!(state.string_segments[1].fluid, obm());
    assert!((state.string_segments[1].bottom_m - 3000.0).abs() < 1e-9);
}

#[test]
fn full_string_volume_returns_an_equal_block_at_the_bit() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    let annulus_mud = FluidSpec::named(9, "Annulus OBM", 1320.0);
    let sim = DisplacementSimulator::new(cap, 3000.0, annulus_mud.clone(), obm());
    let string_volume = cap.string_capacity_volume(0.0, 3000.0);

    let state = sim.snapshot(&[PumpStage::new(kill_mud(), string_volume, 0)], 1, 0.0);

    let last = state.annulus_segments.last().expect("annulus segments");
    assert_eq!(last.fluid, obm());
    assert!((last.bottom_m - 3000.0).abs() < 1e-9);
    let returned = cap.annular_volume(last.top_m, last.bottom_m);
    assert!((returned - string_volume).abs() < 1e-6, "returned {returned} for {string_volume}");
    assert_eq!(state.annulus_segments[0].fluid, annulus_mud);
}

#[test]
fn snapshots_replay_identically_by_stage_or_volume() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    let sim = DisplacementSimulator::new(cap, 3000.0, obm(), obm());
    let stages = vec![
        PumpStage::new(spacer(), 5.0, 0),
        PumpStage::new(kill_mud(), 30.0, 1),
        PumpStage::new(obm(), 10.0, 2),
    ];

    let schedule = PumpSchedule::new(stages.clone());
    for pumped in [0.0, 2.5, 5.0, 17.0, 34.9, 44.0] {
        let position = schedule.locate(pumped);
        let by_stage = sim.snapshot(&stages, position.full_stages, position.progress);
        let by_volume = sim.snapshot_at_volume(&stages, pumped);
        assert_eq!(by_stage, by_volume, "mismatch at {pumped} m³");
        assert!((by_volume.pumped_m3 - pumped).abs() < 1e-9);
    }
}

#[test]
fn segments_stay_sorted_and_inside_the_well() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    let sim = DisplacementSimulator::new(cap, 3000.0, obm(), obm());
    let stages: Vec<PumpStage> = (0..8)
        .map(|i| {
            let fluid = if i % 2 == 0 { spacer() } else { kill_mud() };
            PumpStage::new(fluid, 4.0 + f64::from(i), i as usize)
        })
        .collect();

    let state = sim.snapshot(&stages, stages.len(), 0.0);
    for segments in [&state.string_segments, &state.annulus_segments] {
        assert!(segments.iter().all(|s| s.top_m >= 0.0 && s.bottom_m <= 3000.0 + 1e-9));
        for pair in segments.windows(2) {
            assert!(pair[0].bottom_m <= pair[1].top_m + 1e-6);
            assert!(
                !(pair[0].fluid == pair[1].fluid
                    && (pair[0].bottom_m - pair[1].top_m).abs() < 1e-6),
                "touching same-fluid segments were not merged"
            );
        }
    }
}

#[test]
fn designed_column_round_trips_through_stages_and_store() {
    let g = tapered_well();
    let cap = CapacityIntegrator::new(&g);
    let column = FluidLayerCompositor::new(&g, obm(), obm()).compose(&[
        MudStep::new(2200.0, 3000.0, kill_mud(), Placement::Annulus),
        MudStep::new(2000.0, 2200.0, spacer(), Placement::Annulus),
    ]);

    let stages = derive_pump_stages(&column, &cap);
    let names: Vec<&str> = stages.iter().map(|s| s.fluid.name.as_str()).collect();
    assert_eq!(names, vec!["OBM 1.32", "Spacer", "Kill mud 1.45", "OBM 1.32"]);
    let expected_total = cap.annular_volume(0.0, 3000.0) + cap.string_capacity_volume(0.0, 3000.0);
    let total: f64 = stages.iter().map(|s| s.total_volume_m3).sum();
    assert!((total - expected_total).abs() < 1e-9);

    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SledLayerStore::open(dir.path()).expect("open store");
    column.persist(&mut store).expect("persist");
    let loaded = store.load_all().expect("load");
    assert_eq!(loaded, column.all_layers());
}
