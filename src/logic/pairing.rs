//! Pairing generation: shuffle the roster and pair teams off two at a time.

use crate::models::{Pairing, Team};
use rand::seq::SliceRandom;
use rand::Rng;

/// Output of one generation call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedPairings {
    pub pairings: Vec<Pairing>,
    /// With an odd roster the last team after the shuffle is dropped from the week.
    pub bye: Option<Team>,
}

/// Pair the roster randomly.
///
/// 1. Uniformly shuffle a copy of the roster (Fisher-Yates via `SliceRandom::shuffle`).
/// 2. Consume the shuffled teams two at a time into pairings.
/// 3. A leftover team becomes the bye; it is not scheduled and not an error.
///
/// Yields `floor(N/2)` pairings with no team repeated. Rosters under two teams yield no
/// pairings; callers reject them before getting here.
pub fn generate_pairings<R: Rng + ?Sized>(roster: &[Team], rng: &mut R) -> GeneratedPairings {
    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);

    let chunks = shuffled.chunks_exact(2);
    let bye = chunks.remainder().first().cloned();
    let pairings = chunks
        .map(|pair| Pairing::generated(pair[0].clone(), pair[1].clone()))
        .collect();

    GeneratedPairings { pairings, bye }
}
