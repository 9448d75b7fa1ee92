use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_SELECTIVE_REROLL, MAX_SELECTIVE_REROLL, MIN_SELECTIVE_REROLL};
use crate::dice::{Symbol, SymbolFamily};

/// When a whole pool gets thrown again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerollCondition {
    /// Fewer of `symbol` than the pool's expected count.
    BelowExpected(Symbol),
    /// Fewer than `threshold` of `symbol`.
    MinSymbol { symbol: Symbol, threshold: u32 },
    /// None of `symbol` at all.
    NoSymbol(Symbol),
}

impl Default for RerollCondition {
    fn default() -> Self {
        RerollCondition::BelowExpected(Symbol::Hit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FullRerollConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub condition: RerollCondition,
}

impl FullRerollConfig {
    pub fn when(condition: RerollCondition) -> Self {
        Self {
            enabled: true,
            condition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectiveRerollConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_dice")]
    pub max_dice: u32,
    #[serde(default = "default_priority")]
    pub priority: SymbolFamily,
    /// Hollow symbols of the priority family score like filled ones.
    #[serde(default)]
    pub count_hollow: bool,
}

fn default_max_dice() -> u32 {
    DEFAULT_SELECTIVE_REROLL
}

fn default_priority() -> SymbolFamily {
    SymbolFamily::Hit
}

impl Default for SelectiveRerollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_dice: DEFAULT_SELECTIVE_REROLL,
            priority: SymbolFamily::Hit,
            count_hollow: false,
        }
    }
}

impl SelectiveRerollConfig {
    pub fn new(max_dice: u32, priority: SymbolFamily, count_hollow: bool) -> Self {
        Self {
            enabled: true,
            max_dice,
            priority,
            count_hollow,
        }
    }

    /// Out-of-range values are clamped rather than rejected.
    pub fn effective_max(&self) -> u32 {
        self.max_dice.clamp(MIN_SELECTIVE_REROLL, MAX_SELECTIVE_REROLL)
    }

    /// Weight 1 on the priority symbol, and on its hollow form if counted.
    pub fn weights(&self) -> [f64; 6] {
        let mut weights = [0.0; 6];
        for (idx, symbol) in Symbol::ALL.iter().enumerate() {
            if *symbol == self.priority.filled() || (self.count_hollow && *symbol == self.priority.hollow()) {
                weights[idx] = 1.0;
            }
        }
        weights
    }
}

/// Full and selective rerolls compose: a selective pass runs on whichever
/// roll survived the full-reroll check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RerollConfig {
    #[serde(default)]
    pub full: FullRerollConfig,
    #[serde(default)]
    pub selective: SelectiveRerollConfig,
}

impl RerollConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn full(condition: RerollCondition) -> Self {
        Self {
            full: FullRerollConfig::when(condition),
            ..Default::default()
        }
    }

    pub fn selective(max_dice: u32, priority: SymbolFamily, count_hollow: bool) -> Self {
        Self {
            selective: SelectiveRerollConfig::new(max_dice, priority, count_hollow),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.full.enabled || self.selective.enabled
    }
}
