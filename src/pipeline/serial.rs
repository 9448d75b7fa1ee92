//! Flat-record wire format for pipelines.
//!
//! Each step becomes one record carrying its type tag, id, enabled flag and
//! only the fields its variant uses. Numbers are read signed and clamped so
//! a hand-edited file with negative values still loads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{CostPart, FilledDelta, Pipeline, Ratio, Step, StepKind, SymbolCost};
use crate::core::constants::{DEFAULT_COMBAT_SWITCH_COST, DEFAULT_SWITCH_RATIO_FROM, DEFAULT_SWITCH_RATIO_TO};
use crate::dice::Symbol;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    // add_symbols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<BTreeMap<Symbol, i64>>,

    // elite_promotion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<Symbol>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    // switch_symbols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_parts: Option<Vec<CostPartRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioRecord>,

    // combat_switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_symbol: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_parts: Option<Vec<CostPartRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_delta: Option<BTreeMap<Symbol, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opp_delta: Option<BTreeMap<Symbol, i64>>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPartRecord {
    pub symbol: Symbol,
    #[serde(default = "default_part_cost")]
    pub cost: i64,
}

fn default_part_cost() -> i64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    #[serde(default = "default_ratio_from")]
    pub from: i64,
    #[serde(default = "default_ratio_to")]
    pub to: i64,
}

fn default_ratio_from() -> i64 {
    DEFAULT_SWITCH_RATIO_FROM as i64
}

fn default_ratio_to() -> i64 {
    DEFAULT_SWITCH_RATIO_TO as i64
}

fn clamp_u32(value: i64, min: u32) -> u32 {
    value.clamp(min as i64, u32::MAX as i64) as u32
}

fn delta_to_map(delta: &FilledDelta) -> BTreeMap<Symbol, i64> {
    delta.entries().map(|(s, n)| (s, n as i64)).collect()
}

/// Hollow keys have no filled field to land on and are ignored.
fn delta_from_map(map: &BTreeMap<Symbol, i64>) -> FilledDelta {
    let mut delta = FilledDelta::default();
    for (&symbol, &amount) in map {
        let amount = clamp_u32(amount, 0);
        match symbol {
            Symbol::Hit => delta.hits = amount,
            Symbol::Block => delta.blocks = amount,
            Symbol::Special => delta.specials = amount,
            other => tracing::debug!(symbol = %other, "ignoring hollow symbol in delta"),
        }
    }
    delta
}

fn parts_to_records(parts: &[CostPart; 2]) -> Vec<CostPartRecord> {
    parts
        .iter()
        .map(|p| CostPartRecord {
            symbol: p.symbol,
            cost: p.cost as i64,
        })
        .collect()
}

/// A compound cost needs exactly two parts; anything else is malformed.
fn parts_from_records(records: &[CostPartRecord]) -> Option<SymbolCost> {
    match records {
        [a, b] => Some(SymbolCost::Compound([
            CostPart::new(a.symbol, clamp_u32(a.cost, 1)),
            CostPart::new(b.symbol, clamp_u32(b.cost, 1)),
        ])),
        [single] => Some(SymbolCost::Single(single.symbol)),
        _ => None,
    }
}

fn cost_from(single: Option<Symbol>, parts: Option<&Vec<CostPartRecord>>) -> Option<SymbolCost> {
    match (parts, single) {
        (Some(parts), _) if !parts.is_empty() => parts_from_records(parts),
        (_, Some(symbol)) => Some(SymbolCost::Single(symbol)),
        _ => None,
    }
}

fn max_from(max: Option<i64>) -> Option<u32> {
    max.map(|m| clamp_u32(m, 0))
}

impl From<&Step> for StepRecord {
    fn from(step: &Step) -> Self {
        let mut record = StepRecord {
            step_type: step.kind.type_tag().to_string(),
            id: step.id.clone(),
            enabled: step.enabled,
            ..Default::default()
        };

        match &step.kind {
            StepKind::ElitePromotion { targets, max } => {
                record.symbols = Some(targets.clone());
                record.max = max.map(i64::from);
            }
            StepKind::AddSymbols { delta } => {
                record.delta = Some(delta_to_map(delta));
            }
            StepKind::SwitchSymbols { from, to, ratio, max } => {
                match from {
                    SymbolCost::Single(symbol) => record.from = Some(*symbol),
                    SymbolCost::Compound(parts) => record.from_parts = Some(parts_to_records(parts)),
                }
                record.to = Some(*to);
                record.ratio = Some(RatioRecord {
                    from: ratio.from as i64,
                    to: ratio.to as i64,
                });
                record.max = max.map(i64::from);
            }
            StepKind::CombatSwitch {
                cost,
                cost_count,
                self_delta,
                opp_delta,
                max,
            } => {
                match cost {
                    SymbolCost::Single(symbol) => record.cost_symbol = Some(*symbol),
                    SymbolCost::Compound(parts) => record.cost_parts = Some(parts_to_records(parts)),
                }
                record.cost_count = Some(*cost_count as i64);
                record.self_delta = Some(delta_to_map(self_delta));
                record.opp_delta = Some(delta_to_map(opp_delta));
                record.max = max.map(i64::from);
            }
        }
        record
    }
}

impl StepRecord {
    /// Rebuilds the concrete step. None for unknown tags or records missing a
    /// field the variant cannot do without.
    pub fn to_step(&self) -> Option<Step> {
        let tag = self.step_type.trim().to_lowercase().replace(['-', ' ', '_'], "");
        let kind = match tag.as_str() {
            "elitepromotion" | "elite" => StepKind::ElitePromotion {
                targets: {
                    let listed = self
                        .symbols
                        .clone()
                        .unwrap_or_else(|| vec![Symbol::HollowHit, Symbol::HollowBlock, Symbol::HollowSpecial]);
                    let mut hollow: Vec<Symbol> = listed.iter().map(|s| s.hollow()).collect();
                    hollow.sort();
                    hollow.dedup();
                    hollow
                },
                max: max_from(self.max),
            },
            "addsymbols" | "add" => StepKind::AddSymbols {
                delta: self.delta.as_ref().map(delta_from_map).unwrap_or_default(),
            },
            "switchsymbols" | "switch" => {
                let ratio = self.ratio.unwrap_or(RatioRecord {
                    from: default_ratio_from(),
                    to: default_ratio_to(),
                });
                StepKind::SwitchSymbols {
                    from: cost_from(self.from, self.from_parts.as_ref())?,
                    to: self.to?,
                    ratio: Ratio::new(clamp_u32(ratio.from, 1), clamp_u32(ratio.to, 1)),
                    max: max_from(self.max),
                }
            }
            "combatswitch" => StepKind::CombatSwitch {
                cost: cost_from(self.cost_symbol, self.cost_parts.as_ref())?,
                cost_count: clamp_u32(self.cost_count.unwrap_or(DEFAULT_COMBAT_SWITCH_COST as i64), 1),
                self_delta: self.self_delta.as_ref().map(delta_from_map).unwrap_or_default(),
                opp_delta: self.opp_delta.as_ref().map(delta_from_map).unwrap_or_default(),
                max: max_from(self.max),
            },
            _ => return None,
        };

        Some(Step {
            id: self.id.clone(),
            enabled: self.enabled,
            kind,
        })
    }
}

impl Pipeline {
    pub fn to_records(&self) -> Vec<StepRecord> {
        self.steps().iter().map(StepRecord::from).collect()
    }

    /// Drops records that do not map to a known step; the rest still load.
    pub fn from_records(records: &[StepRecord]) -> Self {
        let steps = records
            .iter()
            .filter_map(|record| {
                let step = record.to_step();
                if step.is_none() {
                    tracing::warn!(
                        step_type = %record.step_type,
                        id = %record.id,
                        "dropping unrecognized pipeline step"
                    );
                }
                step
            })
            .collect();
        Pipeline::from_steps(steps)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_records()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parses a JSON array of step records. Elements that do not parse as a
    /// record are dropped like unknown tags; only a non-array input fails.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self::from_values(values))
    }

    fn from_values(values: Vec<serde_json::Value>) -> Self {
        let records: Vec<StepRecord> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<StepRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed pipeline record");
                    None
                }
            })
            .collect();
        Self::from_records(&records)
    }
}

impl Serialize for Pipeline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_records().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pipeline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Elements go through a generic value first so one bad record in a
        // YAML or JSON scenario drops alone.
        let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Pipeline::from_values(values))
    }
}
