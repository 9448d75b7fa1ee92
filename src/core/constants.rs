// Dice geometry
pub const FACES_PER_DIE: usize = 8;
pub const NUM_DIE_COLORS: usize = 6;
pub const NUM_SYMBOLS: usize = 6;

// Monte Carlo
pub const DEFAULT_TRIALS: u32 = 10_000;
pub const MIN_TRIALS: u32 = 1;

// Selective reroll bounds (dice per attempt)
pub const MIN_SELECTIVE_REROLL: u32 = 1;
pub const MAX_SELECTIVE_REROLL: u32 = 10;
pub const DEFAULT_SELECTIVE_REROLL: u32 = 1;

// Pipeline step defaults when a serialized record omits them
pub const DEFAULT_SWITCH_RATIO_FROM: u32 = 1;
pub const DEFAULT_SWITCH_RATIO_TO: u32 = 1;
pub const DEFAULT_COMBAT_SWITCH_COST: u32 = 1;

// Seeded RNG: xorshift state must never be zero
pub const XORSHIFT_ZERO_SEED_REMAP: u64 = 0x9E37_79B9_7F4A_7C15;

// Distributions are expected to sum to 100% within this tolerance
pub const DISTRIBUTION_EPSILON: f64 = 0.6;

// Report bar charts: one block per this many percent
pub const REPORT_BAR_PERCENT_PER_BLOCK: f64 = 2.5;
