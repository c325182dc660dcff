use bytes::BytesMut;
use heapfile_error::{HeapResult, heap_bail};

use crate::header::encode_header;
use crate::layout::PageLayout;
use crate::slots::encode_slots;
use crate::tuple::Tuple;

/// Builds pages one at a time into a reusable buffer.
pub struct PageEncoder {
    layout: PageLayout,
    buffer: BytesMut,
}

impl PageEncoder {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            buffer: BytesMut::with_capacity(layout.page_size()),
        }
    }

    /// Encodes page `page_index` of a batch, whose slots are `page`, and returns its bytes.
    ///
    /// The returned slice is always exactly one page long and is valid until the next call.
    pub fn encode(&mut self, page_index: usize, page: &[Option<Tuple>]) -> HeapResult<&[u8]> {
        self.buffer.clear();
        encode_header(page, &self.layout, &mut self.buffer)?;
        encode_slots(
            page,
            page_index * self.layout.tuples_per_page(),
            &self.layout,
            &mut self.buffer,
        )?;
        pad_page(&mut self.buffer, self.layout.page_size())?;
        Ok(&self.buffer)
    }
}

/// Zero-fills `page` up to `page_size` bytes.
pub fn pad_page(page: &mut BytesMut, page_size: usize) -> HeapResult<()> {
    if page.len() > page_size {
        heap_bail!(
            PageOverflow: "header and slots take {} bytes of a {} byte page",
            page.len(),
            page_size
        );
    }
    page.resize(page_size, 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use heapfile_error::HeapError;

    use super::*;

    #[test]
    fn pads_with_zeros() {
        let mut page = BytesMut::from(&[1u8, 2, 3][..]);
        pad_page(&mut page, 8).unwrap();
        assert_eq!(page.as_ref(), &[1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn exact_page_untouched() {
        let mut page = BytesMut::from(&[9u8; 4][..]);
        pad_page(&mut page, 4).unwrap();
        assert_eq!(page.as_ref(), &[9; 4]);
    }

    #[test]
    fn overflow_detected() {
        let mut page = BytesMut::from(&[0u8; 5][..]);
        assert!(matches!(pad_page(&mut page, 4), Err(HeapError::PageOverflow(..))));
    }

    #[test]
    fn encodes_whole_page() {
        // 72 bytes, 2 fields: 8 slots, 1 header byte, 64 slot bytes, 7 padding bytes.
        let layout = PageLayout::try_new(2, 72).unwrap();
        assert_eq!(layout.tuples_per_page(), 8);
        let mut encoder = PageEncoder::new(layout);

        let page = encoder.encode(0, &[None, Some([1, 2].into())]).unwrap();
        assert_eq!(page.len(), 72);
        assert_eq!(page[0], 0b0000_0010);
        assert_eq!(&page[1..9], &[0xFF; 8]);
        assert_eq!(&page[9..17], &[0, 0, 0, 1, 0, 0, 0, 2]);
        assert!(page[17..65].iter().all(|b| *b == 0xFF));
        assert!(page[65..].iter().all(|b| *b == 0));
    }

    #[test]
    fn reuses_buffer_between_pages() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let mut encoder = PageEncoder::new(layout);
        encoder.encode(0, &vec![Some(Tuple::from([1])); 3]).unwrap();
        let second = encoder.encode(1, &[None]).unwrap().to_vec();
        assert_eq!(second[0], 0);
        assert_eq!(&second[1..], &[0xFF; 12]);
    }

    #[test]
    fn errors_report_batch_index() {
        let layout = PageLayout::try_new(1, 13).unwrap();
        let mut encoder = PageEncoder::new(layout);
        let err = encoder.encode(2, &[None, Some([-1].into())]).unwrap_err();
        assert!(matches!(err, HeapError::InvalidField { index: 7, .. }));
    }
}
