//! Roll engine: uniform face draws reduced into symbol aggregates.
//!
//! Both entry points consume the random source in the same order (colors in
//! canonical order, then fixed dice, which draw nothing), so a seeded bare
//! roll and a seeded detailed roll agree on the total.

use rand::Rng;

use super::face_table::FaceTable;
use super::types::{Aggregate, DieColor, DieRoll, Pool};
use crate::core::constants::FACES_PER_DIE;

/// Uniform face index in `0..FACES_PER_DIE`.
#[inline]
pub fn draw_face<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(0..FACES_PER_DIE as u32) as usize
}

/// Rolls one die of `color`. Returns None for colors absent from the table.
pub fn roll_die<R: Rng + ?Sized>(color: DieColor, table: &FaceTable, rng: &mut R) -> Option<DieRoll> {
    let faces = table.faces(color)?;
    let face = draw_face(rng);
    Some(DieRoll {
        color,
        face,
        symbols: faces[face].counts(),
        fixed: false,
    })
}

/// Rolls the pool straight into an aggregate without keeping per-die detail.
/// Colors missing from the table contribute nothing.
pub fn roll_pool<R: Rng + ?Sized>(pool: &Pool, table: &FaceTable, rng: &mut R) -> Aggregate {
    let mut total = Aggregate::new();
    for (color, _) in pool.colors() {
        let Some(faces) = table.faces(color) else {
            continue;
        };
        for _ in 0..pool.rolled_count(color) {
            total += faces[draw_face(rng)].counts();
        }
    }
    total += fixed_contribution(pool, table);
    total
}

/// Rolls the pool keeping one entry per die. Fixed dice come last.
pub fn roll_pool_detailed<R: Rng + ?Sized>(pool: &Pool, table: &FaceTable, rng: &mut R) -> Vec<DieRoll> {
    let mut dice = Vec::with_capacity(pool.total_dice() as usize + pool.fixed().len());
    for (color, _) in pool.colors() {
        if !table.contains(color) {
            continue;
        }
        for _ in 0..pool.rolled_count(color) {
            if let Some(roll) = roll_die(color, table, rng) {
                dice.push(roll);
            }
        }
    }
    dice.extend(fixed_dice(pool, table));
    dice
}

/// Fixed dice as die rolls; colors absent from the table are skipped.
pub fn fixed_dice<'a>(pool: &'a Pool, table: &'a FaceTable) -> impl Iterator<Item = DieRoll> + 'a {
    pool.fixed().iter().filter_map(move |fixed| {
        table.face(fixed.color, fixed.face).map(|face| DieRoll {
            color: fixed.color,
            face: fixed.face,
            symbols: face.counts(),
            fixed: true,
        })
    })
}

pub fn fixed_contribution(pool: &Pool, table: &FaceTable) -> Aggregate {
    sum_rolls(fixed_dice(pool, table))
}

pub fn sum_rolls<I>(dice: I) -> Aggregate
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<DieRoll>,
{
    use std::borrow::Borrow;
    let mut total = Aggregate::new();
    for die in dice {
        total += die.borrow().symbols;
    }
    total
}
