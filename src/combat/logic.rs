use rand::Rng;

use super::types::{CombatOutcome, CombatRound, CombatSetup};
use crate::attempt::PreparedSide;
use crate::dice::{Aggregate, FaceTable};
use crate::pipeline::resolve_combat_switches;

/// Both sides prepared against one face table.
pub struct PreparedCombat<'a> {
    pub attacker: PreparedSide<'a>,
    pub defender: PreparedSide<'a>,
}

impl<'a> PreparedCombat<'a> {
    pub fn new(setup: &'a CombatSetup, table: &'a FaceTable) -> Self {
        Self {
            attacker: PreparedSide::new(&setup.attacker, table),
            defender: PreparedSide::new(&setup.defender, table),
        }
    }

    /// Attacker rolls first, then the defender, from the same random source.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> CombatRound {
        let attacker = self.attacker.roll(rng).aggregate;
        let defender = self.defender.roll(rng).aggregate;
        settle(self, attacker, defender)
    }
}

fn settle(combat: &PreparedCombat<'_>, mut attacker: Aggregate, mut defender: Aggregate) -> CombatRound {
    resolve_combat_switches(
        &combat.attacker.setup().pipeline,
        &mut attacker,
        &combat.defender.setup().pipeline,
        &mut defender,
    );
    let (wounds_attacker, wounds_defender) = wounds(&attacker, &defender);
    CombatRound {
        attacker,
        defender,
        wounds_attacker,
        wounds_defender,
        outcome: CombatOutcome::from_wounds(wounds_attacker, wounds_defender),
    }
}

/// Wounds each way: own hits minus the other side's blocks, floored at zero.
pub fn wounds(attacker: &Aggregate, defender: &Aggregate) -> (u32, u32) {
    (
        attacker.hits.saturating_sub(defender.blocks),
        defender.hits.saturating_sub(attacker.blocks),
    )
}

/// Resolves one exchange without keeping the prepared sides around.
pub fn resolve_combat<R: Rng + ?Sized>(setup: &CombatSetup, table: &FaceTable, rng: &mut R) -> CombatRound {
    PreparedCombat::new(setup, table).resolve(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::SideSetup;
    use crate::dice::{DieColor, Face, Pool, Symbol};
    use crate::pipeline::{FilledDelta, Pipeline, Step, SymbolCost};
    use crate::state_effects::StateEffects;
    use rand::rngs::mock::StepRng;

    fn table() -> FaceTable {
        FaceTable::partial([
            (DieColor::Red, vec![Face::new(&[Symbol::Hit]); 8]),
            (DieColor::Blue, vec![Face::new(&[Symbol::Special]); 8]),
            (DieColor::Black, vec![Face::new(&[Symbol::Block]); 8]),
        ])
        .unwrap()
    }

    #[test]
    fn test_hits_against_no_blocks_always_win() {
        let setup = CombatSetup::new(
            SideSetup::new(Pool::new().with(DieColor::Red, 2)),
            SideSetup::new(Pool::new().with(DieColor::Blue, 2)),
        );
        let round = resolve_combat(&setup, &table(), &mut StepRng::new(0, 0));
        assert_eq!(round.wounds_attacker, 2);
        assert_eq!(round.wounds_defender, 0);
        assert_eq!(round.outcome, CombatOutcome::Win);
        assert_eq!(round.defender.specials, 2);
    }

    #[test]
    fn test_blocks_absorb_hits() {
        let setup = CombatSetup::new(
            SideSetup::new(Pool::new().with(DieColor::Red, 2)),
            SideSetup::new(Pool::new().with(DieColor::Black, 3)),
        );
        let round = resolve_combat(&setup, &table(), &mut StepRng::new(0, 0));
        assert_eq!(round.wounds_attacker, 0);
        assert_eq!(round.outcome, CombatOutcome::Tie);
    }

    #[test]
    fn test_outcome_from_wounds() {
        assert_eq!(CombatOutcome::from_wounds(3, 1), CombatOutcome::Win);
        assert_eq!(CombatOutcome::from_wounds(1, 1), CombatOutcome::Tie);
        assert_eq!(CombatOutcome::from_wounds(0, 2), CombatOutcome::Loss);
    }

    #[test]
    fn test_defender_switch_removes_attacker_hits() {
        let defender_pipeline = Pipeline::new().with(Step::combat_switch(
            "parry",
            SymbolCost::Single(Symbol::Special),
            1,
            FilledDelta::default(),
            FilledDelta::hits(1),
            None,
        ));
        let setup = CombatSetup::new(
            SideSetup::new(Pool::new().with(DieColor::Red, 3)),
            SideSetup::new(Pool::new().with(DieColor::Blue, 2)).with_pipeline(defender_pipeline),
        );
        let round = resolve_combat(&setup, &table(), &mut StepRng::new(0, 0));
        assert_eq!(round.attacker.hits, 1);
        assert_eq!(round.defender.specials, 0);
        assert_eq!(round.wounds_attacker, 1);
    }

    #[test]
    fn test_disarmed_attacker_loses_a_die() {
        let setup = CombatSetup::new(
            SideSetup::new(Pool::new().with(DieColor::Red, 2)).with_effects(StateEffects::disarmed()),
            SideSetup::new(Pool::new().with(DieColor::Blue, 1)),
        );
        let round = resolve_combat(&setup, &table(), &mut StepRng::new(0, 0));
        assert_eq!(round.wounds_attacker, 1);
    }
}
