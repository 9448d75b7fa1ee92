//! Monte Carlo runners for single-pool analysis and combat.
//!
//! Each trial runs the same per-side path used everywhere else (roll,
//! rerolls, state effects, pipeline), so results match a single manual roll.

use std::time::Instant;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use super::config::SimConfig;
use super::distribution::{Histogram, JointHistogram, Moments};
use super::report::{AnalysisReport, CombatReport, Expectation, FamilyDistributions, JointVariants, RerollStats};
use crate::attempt::{Attempt, PreparedSide, SideSetup};
use crate::combat::{CombatOutcome, CombatSetup, PreparedCombat};
use crate::dice::{Aggregate, FaceTable, Symbol, SymbolFamily, XorShiftRng};

/// Filled, hollow and combined histograms for one family.
#[derive(Default)]
struct FamilyHistograms {
    filled: Histogram,
    hollow: Histogram,
    combined: Histogram,
}

impl FamilyHistograms {
    fn record(&mut self, agg: &Aggregate, family: SymbolFamily) {
        let filled = agg.get(family.filled());
        let hollow = agg.get(family.hollow());
        self.filled.record(filled);
        self.hollow.record(hollow);
        self.combined.record(filled.saturating_add(hollow));
    }

    fn finish(&self, trials: u32) -> FamilyDistributions {
        FamilyDistributions {
            filled: self.filled.normalize(trials),
            hollow: self.hollow.normalize(trials),
            combined: self.combined.normalize(trials),
        }
    }
}

/// A family crossed with specials, in all three variants.
#[derive(Default)]
struct JointHistograms {
    filled: JointHistogram,
    hollow: JointHistogram,
    combined: JointHistogram,
}

impl JointHistograms {
    fn record(&mut self, agg: &Aggregate, family: SymbolFamily) {
        let x = (agg.get(family.filled()), agg.get(family.hollow()));
        let y = (agg.specials, agg.hollow_specials);
        self.filled.record(x.0, y.0);
        self.hollow.record(x.1, y.1);
        self.combined.record(x.0.saturating_add(x.1), y.0.saturating_add(y.1));
    }

    fn finish(&self, trials: u32) -> JointVariants {
        JointVariants {
            filled: self.filled.normalize(trials),
            hollow: self.hollow.normalize(trials),
            combined: self.combined.normalize(trials),
        }
    }
}

/// Tracks statistics across analysis trials.
#[derive(Default)]
struct AnalysisStats {
    hits: FamilyHistograms,
    blocks: FamilyHistograms,
    specials: FamilyHistograms,
    hit_special: JointHistograms,
    block_special: JointHistograms,
    hit_moments: Moments,
    block_moments: Moments,
    special_moments: Moments,
    full_rerolls: u32,
    dice_rerolled: u64,
}

impl AnalysisStats {
    fn record(&mut self, attempt: &Attempt) {
        let agg = &attempt.aggregate;
        self.hits.record(agg, SymbolFamily::Hit);
        self.blocks.record(agg, SymbolFamily::Block);
        self.specials.record(agg, SymbolFamily::Special);
        self.hit_special.record(agg, SymbolFamily::Hit);
        self.block_special.record(agg, SymbolFamily::Block);

        self.hit_moments.record(agg.hits);
        self.block_moments.record(agg.blocks);
        self.special_moments.record(agg.specials);

        if attempt.full_reroll {
            self.full_rerolls += 1;
        }
        self.dice_rerolled += attempt.dice_rerolled as u64;
    }

    fn finish(&self, trials: u32, seed: Option<u64>, theoretical: Expectation) -> AnalysisReport {
        AnalysisReport {
            trials,
            seed,
            timestamp: Utc::now(),
            hits: self.hits.finish(trials),
            blocks: self.blocks.finish(trials),
            specials: self.specials.finish(trials),
            hit_special: self.hit_special.finish(trials),
            block_special: self.block_special.finish(trials),
            hit_stats: self.hit_moments.summary(),
            block_stats: self.block_moments.summary(),
            special_stats: self.special_moments.summary(),
            theoretical,
            rerolls: RerollStats {
                full_rerolls: self.full_rerolls,
                full_reroll_rate: self.full_rerolls as f64 * 100.0 / trials as f64,
                dice_rerolled: self.dice_rerolled,
                avg_dice_rerolled: self.dice_rerolled as f64 / trials as f64,
            },
        }
    }
}

/// Runs a single-pool analysis. Seeded configs use `XorShiftRng`; unseeded
/// ones draw from the thread RNG.
pub fn run_analysis(side: &SideSetup, table: &FaceTable, config: &SimConfig) -> AnalysisReport {
    match config.seed {
        Some(seed) => run_analysis_with_rng(side, table, config, &mut XorShiftRng::new(seed)),
        None => run_analysis_with_rng(side, table, config, &mut rand::thread_rng()),
    }
}

pub fn run_analysis_with_rng<R: Rng + ?Sized>(
    side: &SideSetup,
    table: &FaceTable,
    config: &SimConfig,
    rng: &mut R,
) -> AnalysisReport {
    let trials = config.effective_trials();
    let started = Instant::now();
    let prepared = PreparedSide::new(side, table);

    let mut stats = AnalysisStats::default();
    for _ in 0..trials {
        stats.record(&prepared.roll(rng));
    }

    let theoretical = Expectation {
        hits: side.pool.expected(Symbol::Hit, table),
        blocks: side.pool.expected(Symbol::Block, table),
        specials: side.pool.expected(Symbol::Special, table),
    };
    let report = stats.finish(trials, config.seed, theoretical);

    debug!(
        trials,
        seed = ?config.seed,
        detail = prepared.needs_detail(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        mean_hits = report.hit_stats.mean,
        "analysis complete"
    );
    report
}

/// Tracks statistics across combat trials.
#[derive(Default)]
struct CombatStats {
    wounds_attacker: Histogram,
    wounds_defender: Histogram,
    attacker_specials: Histogram,
    defender_specials: Histogram,
    attacker: [Moments; 3],
    defender: [Moments; 3],
    wounds_attacker_moments: Moments,
    wounds_defender_moments: Moments,
    wins: u32,
    ties: u32,
    losses: u32,
}

fn record_side(moments: &mut [Moments; 3], agg: &Aggregate) {
    moments[0].record(agg.hits);
    moments[1].record(agg.blocks);
    moments[2].record(agg.specials);
}

fn side_expectation(moments: &[Moments; 3]) -> Expectation {
    Expectation {
        hits: moments[0].mean(),
        blocks: moments[1].mean(),
        specials: moments[2].mean(),
    }
}

/// Runs attacker-versus-defender resolution.
pub fn run_combat(setup: &CombatSetup, table: &FaceTable, config: &SimConfig) -> CombatReport {
    match config.seed {
        Some(seed) => run_combat_with_rng(setup, table, config, &mut XorShiftRng::new(seed)),
        None => run_combat_with_rng(setup, table, config, &mut rand::thread_rng()),
    }
}

pub fn run_combat_with_rng<R: Rng + ?Sized>(
    setup: &CombatSetup,
    table: &FaceTable,
    config: &SimConfig,
    rng: &mut R,
) -> CombatReport {
    let trials = config.effective_trials();
    let started = Instant::now();
    let combat = PreparedCombat::new(setup, table);

    let mut stats = CombatStats::default();
    for _ in 0..trials {
        let round = combat.resolve(rng);
        stats.wounds_attacker.record(round.wounds_attacker);
        stats.wounds_defender.record(round.wounds_defender);
        stats.attacker_specials.record(round.attacker.specials);
        stats.defender_specials.record(round.defender.specials);
        stats.wounds_attacker_moments.record(round.wounds_attacker);
        stats.wounds_defender_moments.record(round.wounds_defender);
        record_side(&mut stats.attacker, &round.attacker);
        record_side(&mut stats.defender, &round.defender);
        match round.outcome {
            CombatOutcome::Win => stats.wins += 1,
            CombatOutcome::Tie => stats.ties += 1,
            CombatOutcome::Loss => stats.losses += 1,
        }
    }

    let pct = |n: u32| n as f64 * 100.0 / trials as f64;
    let report = CombatReport {
        trials,
        seed: config.seed,
        timestamp: Utc::now(),
        wounds_attacker: stats.wounds_attacker.normalize(trials),
        wounds_defender: stats.wounds_defender.normalize(trials),
        attacker_specials: stats.attacker_specials.normalize(trials),
        defender_specials: stats.defender_specials.normalize(trials),
        attacker: side_expectation(&stats.attacker),
        defender: side_expectation(&stats.defender),
        expected_wounds_attacker: stats.wounds_attacker_moments.mean(),
        expected_wounds_defender: stats.wounds_defender_moments.mean(),
        win_rate: pct(stats.wins),
        tie_rate: pct(stats.ties),
        loss_rate: pct(stats.losses),
    };

    debug!(
        trials,
        seed = ?config.seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        win_rate = report.win_rate,
        "combat complete"
    );
    report
}
