use std::ops::Range;
use std::slice;

use heapfile_error::{HeapResult, heap_bail};

use crate::layout::PageLayout;

/// A fixed-width row of integer fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple(Vec<i32>);

impl Tuple {
    pub fn new(fields: Vec<i32>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[i32] {
        &self.0
    }

    pub fn field_count(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<i32>> for Tuple {
    fn from(fields: Vec<i32>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[i32; N]> for Tuple {
    fn from(fields: [i32; N]) -> Self {
        Self(fields.to_vec())
    }
}

impl FromIterator<i32> for Tuple {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An ordered run of slots destined for one heap file.
///
/// `None` marks an absent tuple: it has no data but still occupies a slot, so the position of
/// every tuple after it is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleBatch {
    slots: Vec<Option<Tuple>>,
}

impl TupleBatch {
    pub fn new(slots: Vec<Option<Tuple>>) -> Self {
        Self { slots }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tuple: Option<Tuple>) {
        self.slots.push(tuple);
    }

    pub fn push_absent(&mut self) {
        self.slots.push(None);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a tuple.
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn get(&self, index: usize) -> Option<&Option<Tuple>> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Option<Tuple>> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[Option<Tuple>] {
        &self.slots
    }

    pub fn into_inner(self) -> Vec<Option<Tuple>> {
        self.slots
    }

    /// Copies a contiguous range of slots into a new batch.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self::new(self.slots[range].to_vec())
    }

    /// Field count of the first present tuple, if any tuple is present.
    pub fn field_count(&self) -> Option<usize> {
        self.slots.iter().flatten().map(Tuple::field_count).next()
    }

    /// Checks that every present tuple has `field_count` fields and only non-negative values.
    pub fn validate(&self, field_count: usize) -> HeapResult<()> {
        for (index, tuple) in self.slots.iter().enumerate() {
            let Some(tuple) = tuple else {
                continue;
            };
            if tuple.field_count() != field_count {
                heap_bail!(SchemaMismatch: index, field_count, tuple.field_count());
            }
            if let Some((field, &value)) = tuple.fields().iter().enumerate().find(|(_, v)| **v < 0)
            {
                heap_bail!(InvalidField: index, field, value);
            }
        }
        Ok(())
    }

    /// Splits the batch into per-page runs of slots, in order. The last run may be short.
    pub fn pages(&self, layout: &PageLayout) -> slice::Chunks<'_, Option<Tuple>> {
        self.slots.chunks(layout.tuples_per_page())
    }
}

impl From<Vec<Option<Tuple>>> for TupleBatch {
    fn from(slots: Vec<Option<Tuple>>) -> Self {
        Self::new(slots)
    }
}

impl FromIterator<Option<Tuple>> for TupleBatch {
    fn from_iter<T: IntoIterator<Item = Option<Tuple>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromIterator<Tuple> for TupleBatch {
    fn from_iter<T: IntoIterator<Item = Tuple>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Some).collect())
    }
}

impl<'a> IntoIterator for &'a TupleBatch {
    type Item = &'a Option<Tuple>;
    type IntoIter = slice::Iter<'a, Option<Tuple>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl IntoIterator for TupleBatch {
    type Item = Option<Tuple>;
    type IntoIter = std::vec::IntoIter<Option<Tuple>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use heapfile_error::HeapError;

    use super::*;

    fn batch() -> TupleBatch {
        TupleBatch::new(vec![Some([5].into()), None, Some([7].into())])
    }

    #[test]
    fn counts() {
        let batch = batch();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.present_count(), 2);
        assert_eq!(batch.field_count(), Some(1));
        assert!(!batch.is_empty());
    }

    #[test]
    fn field_count_skips_absent() {
        let batch = TupleBatch::new(vec![None, None, Some([1, 2, 3].into())]);
        assert_eq!(batch.field_count(), Some(3));
        assert_eq!(TupleBatch::new(vec![None]).field_count(), None);
    }

    #[test]
    fn validate_schema() {
        let mut batch = batch();
        batch.validate(1).unwrap();
        batch.push(Some([1, 2].into()));
        assert!(matches!(
            batch.validate(1),
            Err(HeapError::SchemaMismatch {
                index: 3,
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn validate_negative_field() {
        let batch = TupleBatch::new(vec![None, Some([0, 4, -1].into())]);
        assert!(matches!(
            batch.validate(3),
            Err(HeapError::InvalidField {
                index: 1,
                field: 2,
                value: -1,
                ..
            })
        ));
    }

    #[test]
    fn pages_keep_order() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let batch: TupleBatch = (0..7).map(|v| Tuple::from([v])).collect();
        let pages: Vec<_> = batch.pages(&layout).collect();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 3);
        assert_eq!(pages[2].len(), 1);
        assert_eq!(pages[2][0], Some(Tuple::from([6])));
    }

    #[test]
    fn slice_copies_range() {
        let batch = batch();
        assert_eq!(batch.slice(1..3).as_slice(), &[None, Some(Tuple::from([7]))]);
    }
}
