//! Post-roll symbol transformation pipeline.
//!
//! A pipeline is an ordered list of steps, each rewriting the aggregate left
//! by the previous one. Combat switches only run during combat resolution,
//! after both sides' ordinary steps.

mod logic;
mod serial;
mod types;

pub use logic::{activations, apply_combat_switches, apply_post, apply_step, resolve_combat_switches};
pub use serial::{CostPartRecord, RatioRecord, StepRecord};
pub use types::{CostPart, FilledDelta, Pipeline, Ratio, Step, StepKind, SymbolCost};
