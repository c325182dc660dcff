use bytes::{BufMut, BytesMut};
use heapfile_error::{HeapResult, heap_bail, heap_err};

use crate::layout::PageLayout;
use crate::tuple::Tuple;

/// Word written for every field of an absent slot. Never a valid field value.
pub const ABSENT_FIELD: u32 = 0xFFFF_FFFF;

/// Appends `layout.tuples_per_page()` slots for `page`.
///
/// Present tuples are written as one big-endian `u32` per field. Absent tuples, and the slots
/// past the end of a short final page, are written as [`ABSENT_FIELD`] words. `first_slot` is
/// the batch index of `page[0]` and is only used to report errors.
pub fn encode_slots(
    page: &[Option<Tuple>],
    first_slot: usize,
    layout: &PageLayout,
    out: &mut BytesMut,
) -> HeapResult<()> {
    if page.len() > layout.tuples_per_page() {
        heap_bail!(
            PageOverflow: "{} slots passed to a page holding {}",
            page.len(),
            layout.tuples_per_page()
        );
    }

    out.reserve(layout.slots_size());
    for (offset, slot) in page.iter().enumerate() {
        match slot {
            Some(tuple) => put_tuple(tuple, first_slot + offset, layout, out)?,
            None => put_absent(layout, out),
        }
    }
    for _ in page.len()..layout.tuples_per_page() {
        put_absent(layout, out);
    }
    Ok(())
}

fn put_tuple(
    tuple: &Tuple,
    index: usize,
    layout: &PageLayout,
    out: &mut BytesMut,
) -> HeapResult<()> {
    if tuple.field_count() != layout.field_count() {
        heap_bail!(SchemaMismatch: index, layout.field_count(), tuple.field_count());
    }
    for (field, &value) in tuple.fields().iter().enumerate() {
        let word = u32::try_from(value).map_err(|_| heap_err!(InvalidField: index, field, value))?;
        out.put_u32(word);
    }
    Ok(())
}

fn put_absent(layout: &PageLayout, out: &mut BytesMut) {
    for _ in 0..layout.field_count() {
        out.put_u32(ABSENT_FIELD);
    }
}

#[cfg(test)]
mod tests {
    use heapfile_error::HeapError;

    use super::*;

    fn slots(page: &[Option<Tuple>], layout: &PageLayout) -> HeapResult<Vec<u8>> {
        let mut out = BytesMut::new();
        encode_slots(page, 0, layout, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn present_and_absent() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let bytes = slots(&[Some([5].into()), None, Some([7].into())], &layout).unwrap();
        assert_eq!(bytes, [0, 0, 0, 5, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 7]);
    }

    #[test]
    fn big_endian_fields() {
        let layout = PageLayout::try_new(2, 64).unwrap();
        let bytes = slots(&[Some([0x0102_0304, i32::MAX].into())], &layout).unwrap();
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 0x7F, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn short_page_filled_with_sentinel() {
        let layout = PageLayout::try_new(2, 64).unwrap();
        let bytes = slots(&[Some([1, 2].into())], &layout).unwrap();
        assert_eq!(bytes.len(), layout.slots_size());
        assert!(bytes[8..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn empty_page_is_all_sentinel() {
        let layout = PageLayout::try_new(3, 100).unwrap();
        let bytes = slots(&[], &layout).unwrap();
        assert_eq!(bytes.len(), layout.slots_size());
        assert!(bytes.iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn negative_field_rejected() {
        let layout = PageLayout::try_new(2, 64).unwrap();
        let mut out = BytesMut::new();
        let err = encode_slots(&[None, Some([3, -4].into())], 10, &layout, &mut out).unwrap_err();
        assert!(matches!(
            err,
            HeapError::InvalidField {
                index: 11,
                field: 1,
                value: -4,
                ..
            }
        ));
    }

    #[test]
    fn wrong_width_rejected() {
        let layout = PageLayout::try_new(2, 64).unwrap();
        let err = slots(&[Some([3].into())], &layout).unwrap_err();
        assert!(matches!(err, HeapError::SchemaMismatch { expected: 2, actual: 1, .. }));
    }
}
