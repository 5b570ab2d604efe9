use rand::seq::SliceRandom;
use rand::Rng;

use crate::question::Question;

/// Uniform random subset of `pool`, at most `count` long.
///
/// Full Fisher-Yates shuffle of a copy, then truncate.
pub fn sample_questions<R: Rng + ?Sized>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question> {
    let mut picked = pool.to_vec();
    picked.shuffle(rng);
    picked.truncate(count.min(pool.len()));
    picked
}
