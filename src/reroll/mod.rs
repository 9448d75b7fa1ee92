//! Full and selective reroll support.

pub mod logic;
pub mod types;

pub use logic::{roll_with_rerolls, select_dice, selective_reroll, RerollBaseline, RerollOutcome};
pub use types::{FullRerollConfig, RerollCondition, RerollConfig, SelectiveRerollConfig};
