//! Dicepool - Monte Carlo engine for symbol-dice pools
//!
//! Rolls pools of colored dice, rewrites the symbols through a configurable
//! pipeline, applies rerolls and state effects, and aggregates many trials
//! into outcome distributions for single pools and attacker-versus-defender
//! combat.

pub mod attempt;
pub mod build_info;
pub mod combat;
pub mod core;
pub mod dice;
pub mod offload;
pub mod pipeline;
pub mod reroll;
pub mod simulator;
pub mod state_effects;

pub use attempt::{Attempt, PreparedSide, SideSetup};
pub use combat::{resolve_combat, CombatOutcome, CombatRound, CombatSetup};
pub use dice::{Aggregate, DieColor, DieRoll, Face, FaceTable, FaceTableError, Pool, Symbol, SymbolFamily, XorShiftRng};
pub use offload::{SimError, SimulationService};
pub use pipeline::{Pipeline, Step, StepKind};
pub use reroll::{RerollCondition, RerollConfig};
pub use simulator::{AnalysisReport, CombatReport, SimConfig};
pub use state_effects::StateEffects;
