//! Integration test: combat resolution and the simulation service
//!
//! Tests attacker-versus-defender aggregation, reciprocal combat switches,
//! state effects on each side, and that the in-process and worker backends
//! produce the same reports for the same seed.

use dicepool::pipeline::{FilledDelta, SymbolCost};
use dicepool::simulator::{run_combat, run_combat_with_rng, CombatScenario};
use dicepool::{
    CombatSetup, DieColor, Face, FaceTable, Pipeline, Pool, SideSetup, SimConfig, SimulationService, StateEffects,
    Step, Symbol,
};
use rand::rngs::mock::StepRng;

fn standard_setup() -> CombatSetup {
    CombatSetup::new(
        SideSetup::new(Pool::new().with(DieColor::Red, 3).with(DieColor::Orange, 1)),
        SideSetup::new(Pool::new().with(DieColor::Blue, 2).with(DieColor::Green, 1)),
    )
}

// =============================================================================
// Example scenario
// =============================================================================

#[test]
fn test_red_hits_against_blue_specials() {
    let table = FaceTable::partial([
        (DieColor::Red, vec![Face::new(&[Symbol::Hit]); 8]),
        (DieColor::Blue, vec![Face::new(&[Symbol::Special]); 8]),
    ])
    .unwrap();
    let setup = CombatSetup::new(
        SideSetup::new(Pool::new().with(DieColor::Red, 2)),
        SideSetup::new(Pool::new().with(DieColor::Blue, 2)),
    );

    let report = run_combat_with_rng(&setup, &table, &SimConfig::default().with_trials(100), &mut StepRng::new(0, 0));
    assert_eq!(report.wounds_attacker.get(2), 100.0);
    assert_eq!(report.wounds_defender.get(0), 100.0);
    assert_eq!(report.win_rate, 100.0);
    assert_eq!(report.tie_rate, 0.0);
    assert_eq!(report.loss_rate, 0.0);
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_outcome_rates_sum_to_100() {
    let report = run_combat(&standard_setup(), &FaceTable::standard(), &SimConfig::seeded(31).with_trials(4_000));
    let total = report.win_rate + report.tie_rate + report.loss_rate;
    assert!((total - 100.0).abs() < 1e-6);
    for dist in [
        &report.wounds_attacker,
        &report.wounds_defender,
        &report.attacker_specials,
        &report.defender_specials,
    ] {
        assert!((dist.total() - 100.0).abs() < 1e-6);
    }
    assert!((report.wounds_attacker.mean() - report.expected_wounds_attacker).abs() < 1e-9);
}

#[test]
fn test_defender_combat_switch_cuts_attacker_wounds() {
    let table = FaceTable::standard();
    let base = standard_setup();
    let mut parry = base.clone();
    parry.defender.pipeline = Pipeline::new().with(Step::combat_switch(
        "parry",
        SymbolCost::Single(Symbol::Special),
        1,
        FilledDelta::default(),
        FilledDelta::hits(1),
        None,
    ));

    let config = SimConfig::seeded(12).with_trials(4_000);
    let a = run_combat(&base, &table, &config);
    let b = run_combat(&parry, &table, &config);
    assert!(b.expected_wounds_attacker < a.expected_wounds_attacker);
    assert!(b.win_rate <= a.win_rate);
    assert_eq!(b.defender_specials.get(0), 100.0);
}

#[test]
fn test_vulnerable_defender_takes_more_wounds() {
    let table = FaceTable::standard();
    let base = CombatSetup::new(
        SideSetup::new(Pool::new().with(DieColor::Red, 3)),
        SideSetup::new(Pool::new().with(DieColor::Black, 2)),
    );
    let mut exposed = base.clone();
    exposed.defender.effects = StateEffects::vulnerable();

    let config = SimConfig::seeded(8).with_trials(4_000);
    let a = run_combat(&base, &table, &config);
    let b = run_combat(&exposed, &table, &config);
    assert!(b.defender.blocks < a.defender.blocks);
    assert!(b.expected_wounds_attacker > a.expected_wounds_attacker);
}

// =============================================================================
// Simulation service
// =============================================================================

#[tokio::test]
async fn test_worker_and_in_process_agree() {
    let config = SimConfig::seeded(555).with_trials(1_500);
    let local = SimulationService::in_process(FaceTable::standard());
    let worker = SimulationService::offloaded(FaceTable::standard());

    let a = local.run_combat(&standard_setup(), &config).await;
    let mut b = worker.run_combat(&standard_setup(), &config).await;
    b.timestamp = a.timestamp;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_concurrent_requests_on_one_worker() {
    let service = SimulationService::offloaded(FaceTable::standard());
    let setup = standard_setup();
    let side = setup.attacker.clone();
    let c1 = SimConfig::seeded(1).with_trials(500);
    let c2 = SimConfig::seeded(2).with_trials(700);

    let (combat, analysis) = tokio::join!(service.run_combat(&setup, &c1), service.run_analysis(&side, &c2));
    assert_eq!(combat.trials, 500);
    assert_eq!(analysis.trials, 700);
    assert_eq!(analysis.seed, Some(2));
}

#[test]
fn test_combat_scenario_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duel.json");
    std::fs::write(
        &path,
        r#"{
            "attacker": { "pool": { "dice": { "red": 2, "yellow": 1 } } },
            "defender": {
                "pool": { "dice": { "black": 2 } },
                "pipeline": [{ "type": "combat_switch", "id": "riposte", "costSymbol": "special",
                               "oppDelta": { "hit": 1 }, "max": 1 }]
            },
            "trials": 250
        }"#,
    )
    .unwrap();

    let scenario = CombatScenario::from_file(&path).unwrap();
    assert!(scenario.setup.defender.pipeline.has_combat_switch());
    let report = run_combat(&scenario.setup, &FaceTable::standard(), &scenario.config(&SimConfig::seeded(4)));
    assert_eq!(report.trials, 250);
}

#[test]
fn test_shipped_duel_scenario_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/duel.yaml");
    let scenario = CombatScenario::from_file(path).unwrap();
    assert!(scenario.setup.attacker.effects.disarmed);
    assert_eq!(scenario.setup.defender.pool.fixed().len(), 1);
    assert!(scenario.setup.defender.pipeline.has_combat_switch());
}
