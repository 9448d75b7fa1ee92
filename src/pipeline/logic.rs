//! Step rewrite semantics.
//!
//! Every rewrite goes through `Aggregate::take`/`add`, so counts never
//! drop below zero no matter how a step is configured.

use super::types::{FilledDelta, Pipeline, Step, StepKind, SymbolCost};
use crate::dice::{Aggregate, Symbol};

/// Hollow symbols in promotion order.
const PROMOTION_ORDER: [Symbol; 3] = [Symbol::HollowHit, Symbol::HollowBlock, Symbol::HollowSpecial];

/// Runs every enabled non-combat step in list order.
pub fn apply_post(pipeline: &Pipeline, mut agg: Aggregate) -> Aggregate {
    for step in pipeline.enabled_steps() {
        apply_step(step, &mut agg);
    }
    agg
}

/// Applies one step's post-roll rewrite. Combat switches are a no-op here.
pub fn apply_step(step: &Step, agg: &mut Aggregate) {
    match &step.kind {
        StepKind::ElitePromotion { targets, max } => promote(agg, targets, *max),
        StepKind::AddSymbols { delta } => add_delta(agg, delta),
        StepKind::SwitchSymbols { from, to, ratio, max } => {
            let mut groups = from.groups(agg, ratio.from);
            if let Some(cap) = max {
                groups = groups.min(*cap);
            }
            if groups == 0 {
                return;
            }
            from.pay(agg, groups, ratio.from);
            agg.add(*to, groups.saturating_mul(ratio.to));
        }
        StepKind::CombatSwitch { .. } => {}
    }
}

fn promote(agg: &mut Aggregate, targets: &[Symbol], max: Option<u32>) {
    let mut budget = max.unwrap_or(u32::MAX);
    for hollow in PROMOTION_ORDER {
        if budget == 0 {
            break;
        }
        if !targets.contains(&hollow) {
            continue;
        }
        let moved = agg.take(hollow, budget);
        agg.add(hollow.filled(), moved);
        budget -= moved;
    }
}

fn add_delta(agg: &mut Aggregate, delta: &FilledDelta) {
    for (symbol, amount) in delta.entries() {
        agg.add(symbol, amount);
    }
}

/// Number of combat-switch activations the actor can afford.
pub fn activations(cost: &SymbolCost, cost_count: u32, max: Option<u32>, actor: &Aggregate) -> u32 {
    let n = cost.groups(actor, cost_count);
    match max {
        Some(cap) => n.min(cap),
        None => n,
    }
}

/// Runs `pipeline`'s enabled combat switches for one actor against its opponent.
pub fn apply_combat_switches(pipeline: &Pipeline, actor: &mut Aggregate, opponent: &mut Aggregate) {
    for step in pipeline.enabled_steps() {
        if let StepKind::CombatSwitch {
            cost,
            cost_count,
            self_delta,
            opp_delta,
            max,
        } = &step.kind
        {
            let n = activations(cost, *cost_count, *max, actor);
            if n == 0 {
                continue;
            }
            cost.pay(actor, n, *cost_count);
            *actor += self_delta.scaled(n);
            *opponent = opponent.saturating_sub(&opp_delta.scaled(n));
        }
    }
}

/// Reciprocal combat switches: the defender resolves first, so the attacker's
/// switches see the defender's adjusted aggregate.
pub fn resolve_combat_switches(
    attacker_pipeline: &Pipeline,
    attacker: &mut Aggregate,
    defender_pipeline: &Pipeline,
    defender: &mut Aggregate,
) {
    apply_combat_switches(defender_pipeline, defender, attacker);
    apply_combat_switches(attacker_pipeline, attacker, defender);
}
