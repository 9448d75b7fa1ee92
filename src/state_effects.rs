//! Die-cancelling state effects applied after rerolls.
//!
//! Disarmed removes the attacker's strongest hit die; Vulnerable removes the
//! defender's strongest block die. Each cancels at most one die.

use serde::{Deserialize, Serialize};

use crate::dice::{Aggregate, DieRoll, Symbol};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEffects {
    #[serde(default)]
    pub disarmed: bool,
    #[serde(default)]
    pub vulnerable: bool,
}

impl StateEffects {
    pub fn disarmed() -> Self {
        Self {
            disarmed: true,
            vulnerable: false,
        }
    }

    pub fn vulnerable() -> Self {
        Self {
            disarmed: false,
            vulnerable: true,
        }
    }

    pub fn any(&self) -> bool {
        self.disarmed || self.vulnerable
    }

    /// Applies the active effects in order (Disarmed, then Vulnerable),
    /// zeroing the cancelled dice and removing them from `agg`.
    pub fn apply(&self, dice: &mut [DieRoll], agg: &mut Aggregate) {
        if self.disarmed {
            cancel_one(dice, agg, Symbol::Hit);
        }
        if self.vulnerable {
            cancel_one(dice, agg, Symbol::Block);
        }
    }
}

/// The die with the most filled `key` symbols (at least one), ties broken by
/// most filled specials, then by roll order.
pub fn select_target(dice: &[DieRoll], key: Symbol) -> Option<usize> {
    let mut best: Option<(usize, u32, u32)> = None;
    for (idx, die) in dice.iter().enumerate() {
        let count = die.symbols.get(key);
        if count == 0 {
            continue;
        }
        let specials = die.symbols.specials;
        let better = match best {
            None => true,
            Some((_, best_count, best_specials)) => {
                count > best_count || (count == best_count && specials > best_specials)
            }
        };
        if better {
            best = Some((idx, count, specials));
        }
    }
    best.map(|(idx, _, _)| idx)
}

/// Cancels one die keyed on `key`. Returns the removed symbols, or None when
/// no die shows the key symbol.
pub fn cancel_one(dice: &mut [DieRoll], agg: &mut Aggregate, key: Symbol) -> Option<Aggregate> {
    let idx = select_target(dice, key)?;
    let removed = std::mem::take(&mut dice[idx].symbols);
    *agg = agg.saturating_sub(&removed);
    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DieColor;

    fn die(color: DieColor, symbols: &[Symbol]) -> DieRoll {
        DieRoll {
            color,
            face: 0,
            symbols: Aggregate::from_symbols(symbols),
            fixed: false,
        }
    }

    fn total(dice: &[DieRoll]) -> Aggregate {
        crate::dice::sum_rolls(dice)
    }

    #[test]
    fn test_disarmed_removes_strongest_hit_die() {
        let mut dice = vec![
            die(DieColor::Red, &[Symbol::Hit]),
            die(DieColor::Red, &[Symbol::Hit, Symbol::Hit]),
            die(DieColor::Red, &[Symbol::Special]),
        ];
        let mut agg = total(&dice);
        StateEffects::disarmed().apply(&mut dice, &mut agg);
        assert_eq!(agg.hits, 1);
        assert_eq!(agg.specials, 1);
        assert!(dice[1].symbols.is_empty());
    }

    #[test]
    fn test_tie_broken_by_specials_then_order() {
        let dice = vec![
            die(DieColor::Red, &[Symbol::Hit]),
            die(DieColor::Red, &[Symbol::Hit, Symbol::Special]),
            die(DieColor::Red, &[Symbol::Hit, Symbol::Special]),
        ];
        assert_eq!(select_target(&dice, Symbol::Hit), Some(1));

        let plain = vec![die(DieColor::Red, &[Symbol::Hit]), die(DieColor::Red, &[Symbol::Hit])];
        assert_eq!(select_target(&plain, Symbol::Hit), Some(0));
    }

    #[test]
    fn test_cancellation_removes_hollow_symbols_too() {
        let mut dice = vec![die(DieColor::Red, &[Symbol::Hit, Symbol::HollowHit])];
        let mut agg = total(&dice);
        let removed = cancel_one(&mut dice, &mut agg, Symbol::Hit);
        assert_eq!(removed, Some(Aggregate::from_symbols(&[Symbol::Hit, Symbol::HollowHit])));
        assert!(agg.is_empty());
    }

    #[test]
    fn test_hollow_only_dice_do_not_qualify() {
        let mut dice = vec![die(DieColor::Red, &[Symbol::HollowHit])];
        let mut agg = total(&dice);
        assert_eq!(cancel_one(&mut dice, &mut agg, Symbol::Hit), None);
        assert_eq!(agg.hollow_hits, 1);
    }

    #[test]
    fn test_vulnerable_keys_on_blocks() {
        let mut dice = vec![
            die(DieColor::Blue, &[Symbol::Block, Symbol::Block]),
            die(DieColor::Blue, &[Symbol::Block, Symbol::Special]),
        ];
        let mut agg = total(&dice);
        StateEffects::vulnerable().apply(&mut dice, &mut agg);
        assert_eq!(agg.blocks, 1);
        assert_eq!(agg.specials, 1);
    }

    #[test]
    fn test_subtraction_clamps_when_pipeline_already_spent_symbols() {
        let mut dice = vec![die(DieColor::Red, &[Symbol::Hit, Symbol::Hit])];
        let mut agg = Aggregate::from_symbols(&[Symbol::Hit]);
        cancel_one(&mut dice, &mut agg, Symbol::Hit);
        assert_eq!(agg.hits, 0);
    }

    #[test]
    fn test_fixed_dice_can_be_cancelled() {
        let mut fixed = die(DieColor::Red, &[Symbol::Hit]);
        fixed.fixed = true;
        let mut dice = vec![fixed];
        let mut agg = total(&dice);
        StateEffects::disarmed().apply(&mut dice, &mut agg);
        assert!(agg.is_empty());
    }
}
