//! Integration test: Monte Carlo analysis
//!
//! Tests the statistical properties of single-pool analysis end to end:
//! normalization, pipeline effects on sampled means, reroll improvement,
//! state-effect bounds, determinism, and scenario files driving a run.

use dicepool::core::DISTRIBUTION_EPSILON;
use dicepool::pipeline::{FilledDelta, Ratio, SymbolCost};
use dicepool::reroll::RerollConfig;
use dicepool::simulator::{run_analysis, run_analysis_with_rng, AnalysisScenario};
use dicepool::{
    DieColor, Face, FaceTable, Pipeline, Pool, SideSetup, SimConfig, StateEffects, Step, Symbol, SymbolFamily,
};
use rand::rngs::mock::StepRng;
use std::io::Write;

fn attack_pool() -> Pool {
    Pool::new().with(DieColor::Red, 2).with(DieColor::Orange, 2).with(DieColor::Yellow, 1)
}

fn defense_pool() -> Pool {
    Pool::new().with(DieColor::Green, 2).with(DieColor::Blue, 1).with(DieColor::Black, 1)
}

fn seeded(trials: u32) -> SimConfig {
    SimConfig::seeded(4242).with_trials(trials)
}

// =============================================================================
// Example scenario
// =============================================================================

#[test]
fn test_two_red_all_hit_faces_always_two_hits() {
    let table = FaceTable::partial([(DieColor::Red, vec![Face::new(&[Symbol::Hit]); 8])]).unwrap();
    let side = SideSetup::new(Pool::new().with(DieColor::Red, 2));
    let report = run_analysis_with_rng(&side, &table, &SimConfig::default().with_trials(100), &mut StepRng::new(0, 0));

    assert_eq!(report.hit_stats.mean, 2.0);
    assert_eq!(report.block_stats.mean, 0.0);
    assert_eq!(report.hits.filled.get(2), 100.0);
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_every_distribution_sums_to_100() {
    let table = FaceTable::standard();
    for trials in [1, 7, 1_000, 5_000] {
        let report = run_analysis(&SideSetup::new(attack_pool()), &table, &seeded(trials));
        for family in SymbolFamily::ALL {
            let d = report.family(family);
            for dist in [&d.filled, &d.hollow, &d.combined] {
                assert!((dist.total() - 100.0).abs() <= DISTRIBUTION_EPSILON);
            }
        }
        for joint in [&report.hit_special, &report.block_special] {
            for j in [&joint.filled, &joint.hollow, &joint.combined] {
                assert!((j.total() - 100.0).abs() <= DISTRIBUTION_EPSILON);
            }
        }
    }
}

#[test]
fn test_zero_trials_runs_once() {
    let report = run_analysis(&SideSetup::new(attack_pool()), &FaceTable::standard(), &seeded(0));
    assert_eq!(report.trials, 1);
}

#[test]
fn test_empty_pool_is_all_zeroes() {
    let report = run_analysis(&SideSetup::default(), &FaceTable::standard(), &seeded(50));
    assert_eq!(report.hits.filled.get(0), 100.0);
    assert_eq!(report.hit_stats.mean, 0.0);
    assert_eq!(report.theoretical.hits, 0.0);
}

// =============================================================================
// Pipeline properties
// =============================================================================

#[test]
fn test_add_one_hit_shifts_mean_by_one() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let boosted = base.clone().with_pipeline(Pipeline::new().with(Step::add_symbols("plus", FilledDelta::hits(1))));

    let a = run_analysis(&base, &table, &seeded(3_000));
    let b = run_analysis(&boosted, &table, &seeded(3_000));
    assert!((b.hit_stats.mean - a.hit_stats.mean - 1.0).abs() < 1e-9);
    assert!((b.hit_stats.std_dev - a.hit_stats.std_dev).abs() < 1e-9);
}

#[test]
fn test_elite_promotion_conserves_family_totals() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let elite = base.clone().with_pipeline(Pipeline::new().with(Step::elite_promotion(
        "elite",
        &[Symbol::HollowHit, Symbol::HollowSpecial],
        None,
    )));

    let a = run_analysis(&base, &table, &seeded(3_000));
    let b = run_analysis(&elite, &table, &seeded(3_000));
    assert_eq!(a.hits.combined, b.hits.combined);
    assert_eq!(a.specials.combined, b.specials.combined);
    assert!(b.hit_stats.mean > a.hit_stats.mean);
    assert_eq!(b.hits.hollow.get(0), 100.0);
}

#[test]
fn test_switch_moves_mass_between_symbols() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let switched = base.clone().with_pipeline(Pipeline::new().with(Step::switch_symbols(
        "switch",
        SymbolCost::Single(Symbol::Hit),
        Symbol::Special,
        Ratio::new(1, 1),
        Some(1),
    )));

    let a = run_analysis(&base, &table, &seeded(3_000));
    let b = run_analysis(&switched, &table, &seeded(3_000));
    assert!(b.hit_stats.mean < a.hit_stats.mean);
    assert!(b.special_stats.mean > a.special_stats.mean);
}

// =============================================================================
// Rerolls and state effects
// =============================================================================

#[test]
fn test_selective_reroll_beats_no_reroll_by_five_percent() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let reroll = base.clone().with_reroll(RerollConfig::selective(2, SymbolFamily::Hit, false));

    let a = run_analysis(&base, &table, &seeded(10_000));
    let b = run_analysis(&reroll, &table, &seeded(10_000));
    assert!(
        b.hit_stats.mean > a.hit_stats.mean * 1.05,
        "reroll mean {:.3} vs baseline {:.3}",
        b.hit_stats.mean,
        a.hit_stats.mean
    );
    assert!(b.rerolls.avg_dice_rerolled > 0.0);
}

#[test]
fn test_full_reroll_never_hurts_on_average() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let reroll = base.clone().with_reroll(RerollConfig::full(dicepool::RerollCondition::BelowExpected(Symbol::Hit)));

    let a = run_analysis(&base, &table, &seeded(10_000));
    let b = run_analysis(&reroll, &table, &seeded(10_000));
    assert!(b.hit_stats.mean > a.hit_stats.mean);
    assert!(b.rerolls.full_reroll_rate > 0.0 && b.rerolls.full_reroll_rate < 100.0);
}

#[test]
fn test_disarmed_lowers_hits() {
    let table = FaceTable::standard();
    let base = SideSetup::new(attack_pool());
    let disarmed = base.clone().with_effects(StateEffects::disarmed());

    let a = run_analysis(&base, &table, &seeded(5_000));
    let b = run_analysis(&disarmed, &table, &seeded(5_000));
    assert!(b.hit_stats.mean <= a.hit_stats.mean);
    assert!(b.hit_stats.mean < a.hit_stats.mean - 0.5);
}

#[test]
fn test_vulnerable_lowers_blocks() {
    let table = FaceTable::standard();
    let base = SideSetup::new(defense_pool());
    let vulnerable = base.clone().with_effects(StateEffects::vulnerable());

    let a = run_analysis(&base, &table, &seeded(5_000));
    let b = run_analysis(&vulnerable, &table, &seeded(5_000));
    assert!(b.block_stats.mean <= a.block_stats.mean);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_full_analysis_is_repeatable() {
    let table = FaceTable::standard();
    let side = SideSetup::new(attack_pool())
        .with_reroll(RerollConfig::selective(3, SymbolFamily::Special, true))
        .with_effects(StateEffects::disarmed());

    let a = run_analysis(&side, &table, &seeded(2_000));
    let mut b = run_analysis(&side, &table, &seeded(2_000));
    b.timestamp = a.timestamp;
    assert_eq!(a, b);
}

// =============================================================================
// Scenario files
// =============================================================================

#[test]
fn test_scenario_file_drives_analysis() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        r#"
pool:
  dice: {{ RED: 3 }}
pipeline:
  - {{ type: add_symbols, id: bonus, delta: {{ special: 1 }} }}
  - {{ type: not_a_step, id: junk }}
trials: 400
seed: 3
"#
    )
    .unwrap();

    let scenario = AnalysisScenario::from_file(file.path()).unwrap();
    assert_eq!(scenario.side.pipeline.len(), 1);

    let config = scenario.config(&SimConfig::default());
    let report = run_analysis(&scenario.side, &FaceTable::standard(), &config);
    assert_eq!(report.trials, 400);
    assert_eq!(report.seed, Some(3));
    // every roll gets the bonus special
    assert_eq!(report.specials.filled.get(0), 0.0);
}

#[test]
fn test_shipped_attack_scenario_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/attack.yaml");
    let scenario = AnalysisScenario::from_file(path).unwrap();
    assert_eq!(scenario.side.pool.total_dice(), 5);
    assert_eq!(scenario.side.pipeline.len(), 2);
    assert!(scenario.side.reroll.full.enabled);
    assert_eq!(scenario.side.reroll.selective.max_dice, 2);
    assert_eq!(scenario.trials, Some(20_000));
}
