use serde::{Deserialize, Serialize};

use crate::dice::{Aggregate, Symbol};

/// Additive bonus on the filled symbol fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledDelta {
    #[serde(default)]
    pub hits: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub specials: u32,
}

impl FilledDelta {
    pub fn hits(hits: u32) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn blocks(blocks: u32) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }

    pub fn specials(specials: u32) -> Self {
        Self {
            specials,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.hits == 0 && self.blocks == 0 && self.specials == 0
    }

    /// `(symbol, amount)` pairs with non-zero amounts.
    pub fn entries(&self) -> impl Iterator<Item = (Symbol, u32)> {
        [
            (Symbol::Hit, self.hits),
            (Symbol::Block, self.blocks),
            (Symbol::Special, self.specials),
        ]
        .into_iter()
        .filter(|&(_, n)| n > 0)
    }

    pub fn scaled(&self, times: u32) -> Aggregate {
        let mut agg = Aggregate::new();
        for (symbol, amount) in self.entries() {
            agg.add(symbol, amount.saturating_mul(times));
        }
        agg
    }
}

/// One component of a compound cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPart {
    pub symbol: Symbol,
    pub cost: u32,
}

impl CostPart {
    pub fn new(symbol: Symbol, cost: u32) -> Self {
        Self {
            symbol,
            cost: cost.max(1),
        }
    }
}

/// What a switch or combat switch consumes per group/activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCost {
    /// One symbol; the per-group cost comes from the step (ratio or cost count).
    Single(Symbol),
    /// Two symbols, each with its own per-group cost.
    Compound([CostPart; 2]),
}

impl SymbolCost {
    /// How many whole groups the aggregate can pay for.
    pub fn groups(&self, agg: &Aggregate, unit_cost: u32) -> u32 {
        match self {
            SymbolCost::Single(symbol) => agg.get(*symbol) / unit_cost.max(1),
            SymbolCost::Compound(parts) => parts
                .iter()
                .map(|p| agg.get(p.symbol) / p.cost.max(1))
                .min()
                .unwrap_or(0),
        }
    }

    /// Removes the cost of `groups` groups, clamping at zero.
    pub fn pay(&self, agg: &mut Aggregate, groups: u32, unit_cost: u32) {
        match self {
            SymbolCost::Single(symbol) => {
                agg.take(*symbol, groups.saturating_mul(unit_cost.max(1)));
            }
            SymbolCost::Compound(parts) => {
                for part in parts {
                    agg.take(part.symbol, groups.saturating_mul(part.cost.max(1)));
                }
            }
        }
    }
}

/// Conversion ratio `from:to`, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub from: u32,
    pub to: u32,
}

impl Ratio {
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from: from.max(1),
            to: to.max(1),
        }
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Moves hollow symbols into their filled counterparts, up to a shared budget.
    ElitePromotion { targets: Vec<Symbol>, max: Option<u32> },
    AddSymbols { delta: FilledDelta },
    SwitchSymbols {
        from: SymbolCost,
        to: Symbol,
        ratio: Ratio,
        max: Option<u32>,
    },
    /// Only evaluated during combat resolution.
    CombatSwitch {
        cost: SymbolCost,
        cost_count: u32,
        self_delta: FilledDelta,
        opp_delta: FilledDelta,
        max: Option<u32>,
    },
}

impl StepKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            StepKind::ElitePromotion { .. } => "elite_promotion",
            StepKind::AddSymbols { .. } => "add_symbols",
            StepKind::SwitchSymbols { .. } => "switch_symbols",
            StepKind::CombatSwitch { .. } => "combat_switch",
        }
    }

    pub fn is_combat_only(&self) -> bool {
        matches!(self, StepKind::CombatSwitch { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: String,
    pub enabled: bool,
    pub kind: StepKind,
}

impl Step {
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            kind,
        }
    }

    /// Non-hollow targets are mapped to their hollow counterpart.
    pub fn elite_promotion(id: impl Into<String>, targets: &[Symbol], max: Option<u32>) -> Self {
        let mut hollow: Vec<Symbol> = targets.iter().map(|s| s.hollow()).collect();
        hollow.sort();
        hollow.dedup();
        Self::new(
            id,
            StepKind::ElitePromotion {
                targets: hollow,
                max,
            },
        )
    }

    pub fn add_symbols(id: impl Into<String>, delta: FilledDelta) -> Self {
        Self::new(id, StepKind::AddSymbols { delta })
    }

    pub fn switch_symbols(
        id: impl Into<String>,
        from: SymbolCost,
        to: Symbol,
        ratio: Ratio,
        max: Option<u32>,
    ) -> Self {
        Self::new(id, StepKind::SwitchSymbols { from, to, ratio, max })
    }

    pub fn combat_switch(
        id: impl Into<String>,
        cost: SymbolCost,
        cost_count: u32,
        self_delta: FilledDelta,
        opp_delta: FilledDelta,
        max: Option<u32>,
    ) -> Self {
        Self::new(
            id,
            StepKind::CombatSwitch {
                cost,
                cost_count: cost_count.max(1),
                self_delta,
                opp_delta,
                max,
            },
        )
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Ordered list of steps; each step sees the previous step's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn with(mut self, step: Step) -> Self {
        self.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn remove(&mut self, id: &str) -> Option<Step> {
        let idx = self.steps.iter().position(|s| s.id == id)?;
        Some(self.steps.remove(idx))
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.steps.iter_mut().find(|s| s.id == id) {
            Some(step) => {
                step.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn enabled_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.enabled)
    }

    pub fn has_combat_switch(&self) -> bool {
        self.enabled_steps().any(|s| s.kind.is_combat_only())
    }
}
