//! Full and selective reroll decisions.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::Rng;

use super::types::{RerollCondition, RerollConfig, SelectiveRerollConfig};
use crate::dice::roll::roll_die;
use crate::dice::{roll_pool, roll_pool_detailed, sum_rolls, Aggregate, DieColor, DieRoll, FaceTable, Pool, Symbol};

/// Expectation baselines for one pool, computed once per simulation run.
#[derive(Debug, Clone)]
pub struct RerollBaseline {
    /// Pool expectation per symbol, indexed like `Symbol::ALL`.
    pool_expected: [f64; 6],
    /// Expected weighted face value per color under the selective weights.
    color_expected: BTreeMap<DieColor, f64>,
    weights: [f64; 6],
}

impl RerollBaseline {
    pub fn new(pool: &Pool, table: &FaceTable, config: &RerollConfig) -> Self {
        let mut pool_expected = [0.0; 6];
        for (idx, &symbol) in Symbol::ALL.iter().enumerate() {
            pool_expected[idx] = pool.expected(symbol, table);
        }

        let weights = config.selective.weights();
        let mut color_expected = BTreeMap::new();
        let colors = pool.colors().map(|(c, _)| c).chain(pool.fixed().iter().map(|f| f.color));
        for color in colors {
            color_expected
                .entry(color)
                .or_insert_with(|| table.average_weighted(color, &weights));
        }

        Self {
            pool_expected,
            color_expected,
            weights,
        }
    }

    pub fn expected(&self, symbol: Symbol) -> f64 {
        Symbol::ALL
            .iter()
            .position(|&s| s == symbol)
            .map(|idx| self.pool_expected[idx])
            .unwrap_or(0.0)
    }

    pub fn color_value(&self, color: DieColor) -> f64 {
        self.color_expected.get(&color).copied().unwrap_or(0.0)
    }

    /// A die's weighted value minus its color's expected weighted value.
    pub fn score(&self, die: &DieRoll) -> f64 {
        die.symbols.weighted(&self.weights) - self.color_value(die.color)
    }
}

impl RerollCondition {
    pub fn holds(&self, agg: &Aggregate, baseline: &RerollBaseline) -> bool {
        match *self {
            RerollCondition::BelowExpected(symbol) => (agg.get(symbol) as f64) < baseline.expected(symbol),
            RerollCondition::MinSymbol { symbol, threshold } => agg.get(symbol) < threshold,
            RerollCondition::NoSymbol(symbol) => agg.get(symbol) == 0,
        }
    }
}

/// Final state of one side's roll after rerolls.
#[derive(Debug, Clone, PartialEq)]
pub struct RerollOutcome {
    pub aggregate: Aggregate,
    /// Present whenever per-die detail was needed.
    pub dice: Option<Vec<DieRoll>>,
    pub full_reroll: bool,
    pub dice_rerolled: u32,
}

/// Dice to reroll, worst first: rolled (not fixed) dice scoring below their
/// color's expectation, skipping colors that cannot show the priority symbol.
pub fn select_dice(dice: &[DieRoll], config: &SelectiveRerollConfig, baseline: &RerollBaseline) -> Vec<usize> {
    let mut candidates: Vec<(usize, f64)> = dice
        .iter()
        .enumerate()
        .filter(|(_, die)| !die.fixed && baseline.color_value(die.color) > 0.0)
        .map(|(idx, die)| (idx, baseline.score(die)))
        .filter(|&(_, score)| score < 0.0)
        .collect();

    // Stable sort keeps roll order among equal scores
    candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    candidates
        .into_iter()
        .take(config.effective_max() as usize)
        .map(|(idx, _)| idx)
        .collect()
}

/// Rerolls the selected dice in place, returning how many were rerolled.
pub fn selective_reroll<R: Rng + ?Sized>(
    dice: &mut [DieRoll],
    table: &FaceTable,
    config: &SelectiveRerollConfig,
    baseline: &RerollBaseline,
    rng: &mut R,
) -> u32 {
    let mut rerolled = 0;
    for idx in select_dice(dice, config, baseline) {
        if let Some(fresh) = roll_die(dice[idx].color, table, rng) {
            dice[idx] = fresh;
            rerolled += 1;
        }
    }
    rerolled
}

/// Initial roll, at most one full reroll, then the selective pass.
///
/// `keep_detail` forces per-die results to be retained even without a
/// selective reroll (state effects need them).
pub fn roll_with_rerolls<R: Rng + ?Sized>(
    pool: &Pool,
    table: &FaceTable,
    config: &RerollConfig,
    baseline: &RerollBaseline,
    keep_detail: bool,
    rng: &mut R,
) -> RerollOutcome {
    let detail = keep_detail || config.selective.enabled;

    let roll = |rng: &mut R| -> (Aggregate, Option<Vec<DieRoll>>) {
        if detail {
            let dice = roll_pool_detailed(pool, table, rng);
            (sum_rolls(&dice), Some(dice))
        } else {
            (roll_pool(pool, table, rng), None)
        }
    };

    let (mut aggregate, mut dice) = roll(&mut *rng);

    let mut full_reroll = false;
    if config.full.enabled && config.full.condition.holds(&aggregate, baseline) {
        (aggregate, dice) = roll(&mut *rng);
        full_reroll = true;
    }

    let mut dice_rerolled = 0;
    if config.selective.enabled {
        if let Some(dice) = dice.as_mut() {
            dice_rerolled = selective_reroll(dice, table, &config.selective, baseline, rng);
            if dice_rerolled > 0 {
                aggregate = sum_rolls(dice.iter());
            }
        }
    }

    RerollOutcome {
        aggregate,
        dice,
        full_reroll,
        dice_rerolled,
    }
}
