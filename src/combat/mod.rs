//! Combat resolution between an attacking and a defending pool.

pub mod logic;
pub mod types;

pub use logic::{resolve_combat, wounds, PreparedCombat};
pub use types::{CombatOutcome, CombatRound, CombatSetup};
