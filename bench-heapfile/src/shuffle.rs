use heapfile::TupleBatch;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Separates the random streams used for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Generate = 0,
    Shuffle = 1,
}

/// Derives an independent seed per table and stream, so adding a table never perturbs the
/// tuples or order of the tables before it.
pub fn derive_seed(seed: u64, table: usize, stream: Stream) -> u64 {
    // splitmix64 finalizer
    let mut z = seed
        .wrapping_add((table as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(stream as u64)
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn rng_for(seed: u64, table: usize, stream: Stream) -> StdRng {
    StdRng::seed_from_u64(derive_seed(seed, table, stream))
}

/// Returns the slots of `batch` in a random order fully determined by `rng`.
pub fn shuffle(batch: TupleBatch, rng: &mut StdRng) -> TupleBatch {
    let mut slots = batch.into_inner();
    slots.shuffle(rng);
    TupleBatch::new(slots)
}
