use heapfile::{Tuple, TupleBatch};
use heapfile_error::HeapResult;
use rand::rngs::StdRng;

use crate::datasets::TupleSource;

/// A single-field table with long runs of absent slots, for exercising page occupancy.
///
/// In order: 2048 slots with every third one present (value 1), 2048 absent, 2048 with every
/// tenth present (value 2), 16000 absent, 3 present (value 3) and 5000 absent. The pattern is
/// fixed and does not depend on the seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SparsePattern;

/// `(run length, value, one present slot every n)`; `None` runs are entirely absent.
const RUNS: [(usize, Option<(i32, usize)>); 6] = [
    (2048, Some((1, 3))),
    (2048, None),
    (2048, Some((2, 10))),
    (16_000, None),
    (3, Some((3, 1))),
    (5000, None),
];

impl TupleSource for SparsePattern {
    fn name(&self) -> String {
        "sparse-occupancy".to_owned()
    }

    fn num_fields(&self) -> usize {
        1
    }

    fn num_tuples(&self) -> usize {
        RUNS.iter().map(|(len, _)| len).sum()
    }

    fn generate(&self, _rng: &mut StdRng) -> HeapResult<TupleBatch> {
        let mut batch = TupleBatch::with_capacity(self.num_tuples());
        for (len, fill) in RUNS {
            for slot in 0..len {
                batch.push(match fill {
                    Some((value, every)) if slot % every == 0 => Some(Tuple::from([value])),
                    _ => None,
                });
            }
        }
        Ok(batch)
    }
}
