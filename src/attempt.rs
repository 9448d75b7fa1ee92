//! One side's full roll: roll, rerolls, state effects, pipeline post steps.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dice::{Aggregate, FaceTable, Pool};
use crate::pipeline::{apply_post, Pipeline};
use crate::reroll::{roll_with_rerolls, RerollBaseline, RerollConfig};
use crate::state_effects::StateEffects;

/// Everything that defines how one side rolls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSetup {
    #[serde(default)]
    pub pool: Pool,
    #[serde(default)]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub reroll: RerollConfig,
    #[serde(default)]
    pub effects: StateEffects,
}

impl SideSetup {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            ..Default::default()
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_reroll(mut self, reroll: RerollConfig) -> Self {
        self.reroll = reroll;
        self
    }

    pub fn with_effects(mut self, effects: StateEffects) -> Self {
        self.effects = effects;
        self
    }
}

/// Result of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub aggregate: Aggregate,
    pub full_reroll: bool,
    pub dice_rerolled: u32,
}

/// A side with its reroll baseline computed once, ready to roll many times.
#[derive(Debug, Clone)]
pub struct PreparedSide<'a> {
    setup: &'a SideSetup,
    table: &'a FaceTable,
    baseline: RerollBaseline,
    needs_detail: bool,
}

impl<'a> PreparedSide<'a> {
    pub fn new(setup: &'a SideSetup, table: &'a FaceTable) -> Self {
        Self {
            setup,
            table,
            baseline: RerollBaseline::new(&setup.pool, table, &setup.reroll),
            needs_detail: setup.reroll.selective.enabled || setup.effects.any(),
        }
    }

    pub fn setup(&self) -> &SideSetup {
        self.setup
    }

    pub fn needs_detail(&self) -> bool {
        self.needs_detail
    }

    pub fn baseline(&self) -> &RerollBaseline {
        &self.baseline
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Attempt {
        let outcome = roll_with_rerolls(
            &self.setup.pool,
            self.table,
            &self.setup.reroll,
            &self.baseline,
            self.needs_detail,
            rng,
        );

        let mut aggregate = outcome.aggregate;
        if let Some(mut dice) = outcome.dice {
            self.setup.effects.apply(&mut dice, &mut aggregate);
        }

        Attempt {
            aggregate: apply_post(&self.setup.pipeline, aggregate),
            full_reroll: outcome.full_reroll,
            dice_rerolled: outcome.dice_rerolled,
        }
    }
}
