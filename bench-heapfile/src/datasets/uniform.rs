use heapfile::{Tuple, TupleBatch};
use heapfile_error::{HeapResult, heap_bail};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::datasets::TupleSource;

/// Fully populated tuples whose fields are drawn uniformly from `low..=high`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformInts {
    pub num_tuples: usize,
    pub num_fields: usize,
    #[serde(default)]
    pub low: i32,
    #[serde(default = "UniformInts::default_high")]
    pub high: i32,
}

impl UniformInts {
    pub const DEFAULT_HIGH: i32 = 100;

    pub fn new(num_tuples: usize, num_fields: usize, low: i32, high: i32) -> Self {
        Self {
            num_tuples,
            num_fields,
            low,
            high,
        }
    }

    fn default_high() -> i32 {
        Self::DEFAULT_HIGH
    }
}

impl TupleSource for UniformInts {
    fn name(&self) -> String {
        format!(
            "uniform-{}x{}-{}..={}",
            self.num_tuples, self.num_fields, self.low, self.high
        )
    }

    fn num_fields(&self) -> usize {
        self.num_fields
    }

    fn num_tuples(&self) -> usize {
        self.num_tuples
    }

    fn generate(&self, rng: &mut StdRng) -> HeapResult<TupleBatch> {
        if self.num_fields == 0 {
            heap_bail!(InvalidConfig: "{} must have at least one field", self.name());
        }
        if self.low < 0 || self.low > self.high {
            heap_bail!(
                InvalidConfig: "{} needs a value range with 0 <= low <= high",
                self.name()
            );
        }

        Ok((0..self.num_tuples)
            .map(|_| {
                (0..self.num_fields)
                    .map(|_| rng.random_range(self.low..=self.high))
                    .collect::<Tuple>()
            })
            .collect())
    }
}
