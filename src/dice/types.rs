use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use crate::core::constants::{FACES_PER_DIE, NUM_DIE_COLORS, NUM_SYMBOLS};
use super::face_table::FaceTable;

/// One of the six symbol kinds a die face can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Hit,
    HollowHit,
    Block,
    HollowBlock,
    Special,
    HollowSpecial,
}

impl Symbol {
    pub const ALL: [Symbol; NUM_SYMBOLS] = [
        Symbol::Hit,
        Symbol::HollowHit,
        Symbol::Block,
        Symbol::HollowBlock,
        Symbol::Special,
        Symbol::HollowSpecial,
    ];

    pub fn is_hollow(self) -> bool {
        matches!(
            self,
            Symbol::HollowHit | Symbol::HollowBlock | Symbol::HollowSpecial
        )
    }

    pub fn family(self) -> SymbolFamily {
        match self {
            Symbol::Hit | Symbol::HollowHit => SymbolFamily::Hit,
            Symbol::Block | Symbol::HollowBlock => SymbolFamily::Block,
            Symbol::Special | Symbol::HollowSpecial => SymbolFamily::Special,
        }
    }

    /// Full-strength counterpart (identity for filled symbols).
    pub fn filled(self) -> Symbol {
        self.family().filled()
    }

    /// Hollow counterpart (identity for hollow symbols).
    pub fn hollow(self) -> Symbol {
        self.family().hollow()
    }

    pub fn token(self) -> &'static str {
        match self {
            Symbol::Hit => "hit",
            Symbol::HollowHit => "hollow_hit",
            Symbol::Block => "block",
            Symbol::HollowBlock => "hollow_block",
            Symbol::Special => "special",
            Symbol::HollowSpecial => "hollow_special",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "hit" | "hits" => Ok(Symbol::Hit),
            "hollow_hit" | "hollowhit" | "hollow_hits" => Ok(Symbol::HollowHit),
            "block" | "blocks" => Ok(Symbol::Block),
            "hollow_block" | "hollowblock" | "hollow_blocks" => Ok(Symbol::HollowBlock),
            "special" | "specials" => Ok(Symbol::Special),
            "hollow_special" | "hollowspecial" | "hollow_specials" => Ok(Symbol::HollowSpecial),
            _ => Err(s.to_string()),
        }
    }
}

// Case-insensitive so hand-written face tables and scenarios load either way
impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::unknown_variant(
                &s,
                &[
                    "hit",
                    "hollow_hit",
                    "block",
                    "hollow_block",
                    "special",
                    "hollow_special",
                ],
            )
        })
    }
}

/// A filled symbol together with its hollow counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolFamily {
    Hit,
    Block,
    Special,
}

impl SymbolFamily {
    pub const ALL: [SymbolFamily; 3] = [SymbolFamily::Hit, SymbolFamily::Block, SymbolFamily::Special];

    pub fn filled(self) -> Symbol {
        match self {
            SymbolFamily::Hit => Symbol::Hit,
            SymbolFamily::Block => Symbol::Block,
            SymbolFamily::Special => Symbol::Special,
        }
    }

    pub fn hollow(self) -> Symbol {
        match self {
            SymbolFamily::Hit => Symbol::HollowHit,
            SymbolFamily::Block => Symbol::HollowBlock,
            SymbolFamily::Special => Symbol::HollowSpecial,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SymbolFamily::Hit => "Hits",
            SymbolFamily::Block => "Blocks",
            SymbolFamily::Special => "Specials",
        }
    }
}

/// Key into the face table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DieColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Black,
}

impl DieColor {
    pub const ALL: [DieColor; NUM_DIE_COLORS] = [
        DieColor::Red,
        DieColor::Orange,
        DieColor::Yellow,
        DieColor::Green,
        DieColor::Blue,
        DieColor::Black,
    ];

    /// Attack colors produce hits, defense colors produce blocks.
    pub fn is_attack(self) -> bool {
        matches!(self, DieColor::Red | DieColor::Orange | DieColor::Yellow)
    }

    pub fn key(self) -> &'static str {
        match self {
            DieColor::Red => "RED",
            DieColor::Orange => "ORANGE",
            DieColor::Yellow => "YELLOW",
            DieColor::Green => "GREEN",
            DieColor::Blue => "BLUE",
            DieColor::Black => "BLACK",
        }
    }
}

impl fmt::Display for DieColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DieColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        DieColor::ALL
            .iter()
            .copied()
            .find(|c| c.key() == upper)
            .ok_or_else(|| s.to_string())
    }
}

impl<'de> Deserialize<'de> for DieColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::unknown_variant(
                &s,
                &["RED", "ORANGE", "YELLOW", "GREEN", "BLUE", "BLACK"],
            )
        })
    }
}

/// Symbol counts summed over a roll. Every field is unsigned, so steps
/// that remove symbols saturate at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(default)]
    pub hits: u32,
    #[serde(default)]
    pub hollow_hits: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub hollow_blocks: u32,
    #[serde(default)]
    pub specials: u32,
    #[serde(default)]
    pub hollow_specials: u32,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let mut agg = Self::default();
        for &symbol in symbols {
            agg.add(symbol, 1);
        }
        agg
    }

    pub fn get(&self, symbol: Symbol) -> u32 {
        match symbol {
            Symbol::Hit => self.hits,
            Symbol::HollowHit => self.hollow_hits,
            Symbol::Block => self.blocks,
            Symbol::HollowBlock => self.hollow_blocks,
            Symbol::Special => self.specials,
            Symbol::HollowSpecial => self.hollow_specials,
        }
    }

    fn slot(&mut self, symbol: Symbol) -> &mut u32 {
        match symbol {
            Symbol::Hit => &mut self.hits,
            Symbol::HollowHit => &mut self.hollow_hits,
            Symbol::Block => &mut self.blocks,
            Symbol::HollowBlock => &mut self.hollow_blocks,
            Symbol::Special => &mut self.specials,
            Symbol::HollowSpecial => &mut self.hollow_specials,
        }
    }

    pub fn set(&mut self, symbol: Symbol, value: u32) {
        *self.slot(symbol) = value;
    }

    pub fn add(&mut self, symbol: Symbol, amount: u32) {
        let slot = self.slot(symbol);
        *slot = slot.saturating_add(amount);
    }

    /// Removes up to `amount`, returning how much was actually removed.
    pub fn take(&mut self, symbol: Symbol, amount: u32) -> u32 {
        let slot = self.slot(symbol);
        let taken = amount.min(*slot);
        *slot -= taken;
        taken
    }

    /// Filled plus hollow count for a family.
    pub fn combined(&self, family: SymbolFamily) -> u32 {
        self.get(family.filled()).saturating_add(self.get(family.hollow()))
    }

    pub fn total(&self) -> u32 {
        Symbol::ALL.iter().fold(0u32, |acc, &s| acc.saturating_add(self.get(s)))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Field-wise subtraction clamped at zero.
    pub fn saturating_sub(&self, other: &Aggregate) -> Aggregate {
        let mut out = *self;
        for symbol in Symbol::ALL {
            out.take(symbol, other.get(symbol));
        }
        out
    }

    /// Dot product with per-symbol weights (indexed like `Symbol::ALL`).
    pub fn weighted(&self, weights: &[f64; 6]) -> f64 {
        Symbol::ALL
            .iter()
            .zip(weights.iter())
            .map(|(&s, &w)| self.get(s) as f64 * w)
            .sum()
    }

    /// Symbols in canonical order, one entry per occurrence.
    pub fn symbols(&self) -> Vec<Symbol> {
        Symbol::ALL
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(self.get(s) as usize))
            .collect()
    }
}

impl AddAssign for Aggregate {
    fn add_assign(&mut self, rhs: Aggregate) {
        for symbol in Symbol::ALL {
            self.add(symbol, rhs.get(symbol));
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "H{} ({}) B{} ({}) S{} ({})",
            self.hits,
            self.hollow_hits,
            self.blocks,
            self.hollow_blocks,
            self.specials,
            self.hollow_specials
        )
    }
}

/// One die face: an unordered multiset of symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Face {
    counts: Aggregate,
}

impl Face {
    pub fn new(symbols: &[Symbol]) -> Self {
        Self {
            counts: Aggregate::from_symbols(symbols),
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> Aggregate {
        self.counts
    }

    pub fn count(&self, symbol: Symbol) -> u32 {
        self.counts.get(symbol)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.counts.symbols()
    }
}

impl Serialize for Face {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.symbols().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Face {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let symbols = Vec::<Symbol>::deserialize(deserializer)?;
        Ok(Face::new(&symbols))
    }
}

/// A single die's result, kept when per-die detail is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieRoll {
    pub color: DieColor,
    pub face: usize,
    pub symbols: Aggregate,
    /// Fixed dice were set by hand and are never rerolled.
    pub fixed: bool,
}

/// A die pinned to a chosen face instead of being rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedDie {
    pub color: DieColor,
    pub face: usize,
}

impl FixedDie {
    pub fn new(color: DieColor, face: usize) -> Self {
        Self {
            color,
            face: face.min(FACES_PER_DIE - 1),
        }
    }
}

/// One side's dice selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PoolRecord")]
pub struct Pool {
    dice: BTreeMap<DieColor, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fixed: Vec<FixedDie>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Pool::set`].
    pub fn with(mut self, color: DieColor, count: u32) -> Self {
        self.set(color, count);
        self
    }

    pub fn set(&mut self, color: DieColor, count: u32) {
        if count == 0 {
            self.dice.remove(&color);
        } else {
            self.dice.insert(color, count);
        }
    }

    pub fn add(&mut self, color: DieColor) {
        let count = self.count(color).saturating_add(1);
        self.set(color, count);
    }

    pub fn remove(&mut self, color: DieColor) {
        let count = self.count(color).saturating_sub(1);
        self.set(color, count);
    }

    pub fn clear(&mut self) {
        self.dice.clear();
        self.fixed.clear();
    }

    pub fn count(&self, color: DieColor) -> u32 {
        self.dice.get(&color).copied().unwrap_or(0)
    }

    pub fn total_dice(&self) -> u32 {
        self.dice.values().fold(0u32, |acc, &n| acc.saturating_add(n))
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty() && self.fixed.is_empty()
    }

    /// Colors with a non-zero count, in canonical order.
    pub fn colors(&self) -> impl Iterator<Item = (DieColor, u32)> + '_ {
        self.dice.iter().map(|(&c, &n)| (c, n))
    }

    /// Pins one die of `color` to `face`. Pinning more dice than the pool
    /// holds is allowed; the extra fixed dice still count.
    pub fn fix(&mut self, color: DieColor, face: usize) {
        self.fixed.push(FixedDie::new(color, face));
    }

    pub fn with_fixed(mut self, color: DieColor, face: usize) -> Self {
        self.fix(color, face);
        self
    }

    pub fn unfix_all(&mut self) {
        self.fixed.clear();
    }

    pub fn fixed(&self) -> &[FixedDie] {
        &self.fixed
    }

    pub fn fixed_count(&self, color: DieColor) -> u32 {
        self.fixed.iter().filter(|f| f.color == color).count() as u32
    }

    /// Dice of `color` that are actually rolled (count minus fixed dice).
    pub fn rolled_count(&self, color: DieColor) -> u32 {
        self.count(color).saturating_sub(self.fixed_count(color))
    }

    /// Theoretical count of `symbol`: die count times the color's face
    /// average, summed over colors. Fixed dice are not special-cased.
    pub fn expected(&self, symbol: Symbol, table: &FaceTable) -> f64 {
        self.colors()
            .map(|(color, count)| count as f64 * table.average(color, symbol))
            .sum()
    }
}

/// Wire form of a pool: loose color keys and signed counts, clamped on load.
#[derive(Debug, Clone, Default, Deserialize)]
struct PoolRecord {
    #[serde(default)]
    dice: BTreeMap<String, i64>,
    #[serde(default)]
    fixed: Vec<FixedDieRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixedDieRecord {
    color: String,
    #[serde(default)]
    face: i64,
}

impl From<PoolRecord> for Pool {
    fn from(record: PoolRecord) -> Self {
        let mut pool = Pool::new();
        for (key, count) in record.dice {
            match key.parse::<DieColor>() {
                Ok(color) => {
                    let count = count.clamp(0, u32::MAX as i64) as u32;
                    pool.set(color, pool.count(color).saturating_add(count));
                }
                Err(_) => tracing::warn!(color = %key, "ignoring unknown die color in pool"),
            }
        }
        for fixed in record.fixed {
            match fixed.color.parse::<DieColor>() {
                Ok(color) => pool.fix(color, fixed.face.max(0) as usize),
                Err(_) => tracing::warn!(color = %fixed.color, "ignoring fixed die of unknown color"),
            }
        }
        pool
    }
}
