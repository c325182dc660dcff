//! Encode batches of integer tuples into page-structured heap files.
//!
//! A heap file is a sequence of fixed-size pages. Every tuple of a file has the same number of
//! 32-bit fields, so every tuple occupies a fixed-size slot and the slot at index `i` always
//! lives at page `i / tuples_per_page`, offset `i % tuples_per_page`. There is no file header
//! and no embedded schema: a reader must already know the field count and page size.
//!
//! # File Format
//!
//! For `F` fields and pages of `P` bytes:
//!
//! 1. `slot_size = 4 * F`.
//! 2. `tuples_per_page = floor(8P / (8 * slot_size + 1))`, i.e. each slot costs its bytes plus
//!    one presence bit.
//! 3. `header_size = ceil(tuples_per_page / 8)`.
//! 4. `page_count = ceil(slots / tuples_per_page)`. An empty batch is an empty file.
//!
//! ## Illustrated Page Format
//! ```text
//! ┌────────────────────────────┐
//! │      Presence Bitmap       │
//! │   (header_size bytes,      │
//! │  bit i = slot i, LSB first)│
//! ├────────────────────────────┤
//! │          Slot 0            │
//! │ (F big-endian u32 fields,  │
//! │  0xFFFFFFFF when absent)   │
//! ├────────────────────────────┤
//! │           ...              │
//! ├────────────────────────────┤
//! │  Slot tuples_per_page - 1  │
//! ├────────────────────────────┤
//! │        Zero Padding        │
//! │      (up to P bytes)       │
//! └────────────────────────────┘
//! ```
//!
//! Slots past the end of the batch on the last page are written exactly like absent tuples.

pub use layout::*;
pub use page::*;
pub use slots::ABSENT_FIELD;
pub use tuple::*;
pub use writer::*;

pub mod header;
mod layout;
mod page;
pub mod slots;
mod tuple;
mod writer;
