use heapfile_error::{HeapResult, heap_bail, heap_err};

/// Width in bytes of a single encoded field.
pub const FIELD_WIDTH: usize = size_of::<u32>();

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// The byte layout shared by every page of a heap file.
///
/// Each slot reserves one presence bit in the page header, so a page of `P` bytes holds
/// `floor(8P / (8 * slot_size + 1))` slots. The header is that many bits rounded up to whole
/// bytes; whatever is left after the header and the slot array is zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageLayout {
    field_count: usize,
    page_size: usize,
    slot_size: usize,
    tuples_per_page: usize,
    header_size: usize,
}

/// The position of a slot inside a heap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    pub page_index: usize,
    pub offset_in_page: usize,
}

impl PageLayout {
    pub fn try_new(field_count: usize, page_size: usize) -> HeapResult<Self> {
        if field_count == 0 {
            heap_bail!(InvalidLayout: "tuples must have at least one field");
        }

        let slot_size = field_count
            .checked_mul(FIELD_WIDTH)
            .ok_or_else(|| heap_err!(InvalidLayout: "{field_count} fields overflow a slot"))?;
        let slot_bits = slot_size
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(1))
            .ok_or_else(|| heap_err!(InvalidLayout: "slot of {slot_size} bytes is too wide"))?;
        let page_bits = page_size
            .checked_mul(8)
            .ok_or_else(|| heap_err!(InvalidLayout: "page size {page_size} is too large"))?;

        let tuples_per_page = page_bits / slot_bits;
        if tuples_per_page == 0 {
            heap_bail!(InvalidLayout: "a {page_size}-byte page cannot hold a {slot_size}-byte slot");
        }

        Ok(Self {
            field_count,
            page_size,
            slot_size,
            tuples_per_page,
            header_size: tuples_per_page.div_ceil(8),
        })
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Bytes occupied by one tuple, present or absent.
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    pub fn tuples_per_page(&self) -> usize {
        self.tuples_per_page
    }

    /// Bytes of presence bitmap at the start of every page.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Bytes of slot data following the header.
    pub fn slots_size(&self) -> usize {
        self.tuples_per_page * self.slot_size
    }

    /// Zero bytes appended to every page after its last slot.
    pub fn padding_size(&self) -> usize {
        self.page_size - self.header_size - self.slots_size()
    }

    /// Number of pages needed for `tuple_count` slots. An empty batch needs no pages.
    pub fn total_pages(&self, tuple_count: usize) -> usize {
        tuple_count.div_ceil(self.tuples_per_page)
    }

    /// Size in bytes of a heap file holding `tuple_count` slots.
    pub fn file_size(&self, tuple_count: usize) -> u64 {
        self.total_pages(tuple_count) as u64 * self.page_size as u64
    }

    pub fn page_offset(&self, page_index: usize) -> u64 {
        page_index as u64 * self.page_size as u64
    }

    pub fn slot_address(&self, slot_index: usize) -> SlotAddress {
        SlotAddress {
            page_index: slot_index / self.tuples_per_page,
            offset_in_page: slot_index % self.tuples_per_page,
        }
    }

    /// Byte offset of a slot relative to the start of its page.
    pub fn slot_offset(&self, offset_in_page: usize) -> usize {
        self.header_size + offset_in_page * self.slot_size
    }
}
