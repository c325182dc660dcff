//! The presence bitmap at the start of every page.
//!
//! Bit `i` of the header is set iff slot `i` of the page holds a tuple. Bits are packed eight
//! to a byte, least significant bit first, so byte 0 covers slots 0 to 7. Bits for slots past
//! the end of the batch, and the unused bits of the last header byte, are always zero.

use arrow_buffer::bit_util;
use bytes::BytesMut;
use heapfile_error::{HeapResult, heap_bail};

use crate::layout::PageLayout;
use crate::tuple::Tuple;

/// Appends exactly `layout.header_size()` bytes describing which slots of `page` are present.
pub fn encode_header(
    page: &[Option<Tuple>],
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

    let start = out.len();
    out.resize(start + layout.header_size(), 0);
    let header = &mut out[start..];
    for (slot, _) in page.iter().enumerate().filter(|(_, tuple)| tuple.is_some()) {
        bit_util::set_bit(header, slot);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(page: &[Option<Tuple>], layout: &PageLayout) -> Vec<u8> {
        let mut out = BytesMut::new();
        encode_header(page, layout, &mut out).unwrap();
        out.to_vec()
    }

    fn present(v: i32) -> Option<Tuple> {
        Some(Tuple::from([v]))
    }

    #[test]
    fn lsb_first() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        assert_eq!(header(&[present(5), None, present(7)], &layout), [0b0000_0101]);
    }

    #[test]
    fn spans_bytes() {
        // 16 slots of 4 bytes need 2 header bytes.
        let layout = PageLayout::try_new(1, 66).unwrap();
        assert_eq!(layout.tuples_per_page(), 16);

        let mut page = vec![None; 10];
        page[0] = present(0);
        page[7] = present(0);
        page[8] = present(0);
        page[9] = present(0);
        assert_eq!(header(&page, &layout), [0b1000_0001, 0b0000_0011]);
    }

    #[test]
    fn short_page_keeps_header_size() {
        let layout = PageLayout::try_new(1, 4096).unwrap();
        let bytes = header(&[present(1)], &layout);
        assert_eq!(bytes.len(), layout.header_size());
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn full_page_leaves_unused_bits_clear() {
        // 3 slots in a 1 byte header: bits 3 to 7 are never used.
        let layout = PageLayout::try_new(1, 13).unwrap();
        assert_eq!(header(&[present(1), present(2), present(3)], &layout), [0b0000_0111]);
    }

    #[test]
    fn appends_after_existing_bytes() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let mut out = BytesMut::from(&[0xAA][..]);
        encode_header(&[None, present(1)], &layout, &mut out).unwrap();
        assert_eq!(out.as_ref(), &[0xAA, 0b0000_0010]);
    }

    #[test]
    fn overfull_page_rejected() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let page = vec![None; 4];
        assert!(encode_header(&page, &layout, &mut BytesMut::new()).is_err());
    }
}
