use serde::{Deserialize, Serialize};

use crate::attempt::SideSetup;
use crate::dice::Aggregate;

/// Attacker's result, seen from the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Win,
    Tie,
    Loss,
}

impl CombatOutcome {
    pub fn from_wounds(wounds_attacker: u32, wounds_defender: u32) -> Self {
        use std::cmp::Ordering::*;
        match wounds_attacker.cmp(&wounds_defender) {
            Greater => CombatOutcome::Win,
            Equal => CombatOutcome::Tie,
            Less => CombatOutcome::Loss,
        }
    }
}

/// Both sides of an engagement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatSetup {
    pub attacker: SideSetup,
    pub defender: SideSetup,
}

impl CombatSetup {
    pub fn new(attacker: SideSetup, defender: SideSetup) -> Self {
        Self { attacker, defender }
    }
}

/// One resolved exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatRound {
    /// Attacker's aggregate after its pipeline and both sides' combat switches.
    pub attacker: Aggregate,
    pub defender: Aggregate,
    /// Wounds dealt by the attacker.
    pub wounds_attacker: u32,
    /// Wounds dealt by the defender.
    pub wounds_defender: u32,
    pub outcome: CombatOutcome,
}
