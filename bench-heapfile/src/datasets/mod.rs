use heapfile::TupleBatch;
use heapfile_error::HeapResult;
use rand::rngs::StdRng;

pub mod sparse;
pub mod uniform;

pub use sparse::SparsePattern;
pub use uniform::UniformInts;

/// A generator for the tuples of one benchmark table.
pub trait TupleSource: Send + Sync {
    fn name(&self) -> String;

    fn num_fields(&self) -> usize;

    /// Number of slots the generated batch will hold, absent ones included.
    fn num_tuples(&self) -> usize;

    fn generate(&self, rng: &mut StdRng) -> HeapResult<TupleBatch>;
}
