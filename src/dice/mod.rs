//! Dice, faces and the roll engine.

pub mod face_table;
pub mod rng;
pub mod roll;
pub mod types;

pub use face_table::{FaceTable, FaceTableError};
pub use rng::XorShiftRng;
pub use roll::{roll_pool, roll_pool_detailed, sum_rolls};
pub use types::{Aggregate, DieColor, DieRoll, Face, FixedDie, Pool, Symbol, SymbolFamily};
