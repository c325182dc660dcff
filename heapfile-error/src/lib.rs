#![deny(missing_docs)]

//! Error handling for the heapfile crates.
//!
//! Every failure mode of encoding and benchmark generation is a variant of [`HeapError`].
//! Errors are never retried: each one aborts the operation that raised it.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::path::PathBuf;
use std::io;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Alias for [`Backtrace`]; thiserror only accepts fields named `Backtrace` on nightly.
type Trace = Backtrace;

/// The top-level error type for heap file encoding and benchmark generation.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum HeapError {
    /// The page size cannot hold a single slot plus its presence bit, or the schema has no fields.
    #[error("invalid page layout: {0}\nBacktrace:\n{1}")]
    InvalidLayout(ErrString, Trace),
    /// A table reached the planner without any tuples.
    #[error("empty batch: {0}\nBacktrace:\n{1}")]
    EmptyBatch(ErrString, Trace),
    /// A present tuple does not have the field count of its file.
    #[error("tuple {index} has {actual} fields, expected {expected}\nBacktrace:\n{backtrace}")]
    SchemaMismatch {
        /// Position of the tuple within its batch.
        index: usize,
        /// Field count of the file being written.
        expected: usize,
        /// Field count of the offending tuple.
        actual: usize,
        /// Where the mismatch was detected.
        backtrace: Trace,
    },
    /// A field value cannot be stored as an unsigned 32-bit word.
    #[error(
        "field {field} of tuple {index} is {value}, which is not an unsigned 32-bit value\nBacktrace:\n{backtrace}"
    )]
    InvalidField {
        /// Position of the tuple within its batch.
        index: usize,
        /// Position of the field within the tuple.
        field: usize,
        /// The rejected value.
        value: i64,
        /// Where the value was rejected.
        backtrace: Trace,
    },
    /// Header and slots do not fit in a page. This is a bug in the layout arithmetic.
    #[error("page overflow: {0}\nBacktrace:\n{1}")]
    PageOverflow(ErrString, Trace),
    /// A partition plan does not agree with the tables it partitions.
    #[error("partition mismatch: {0}\nBacktrace:\n{1}")]
    PartitionMismatch(ErrString, Trace),
    /// A benchmark configuration is malformed.
    #[error("invalid configuration: {0}\nBacktrace:\n{1}")]
    InvalidConfig(ErrString, Trace),
    /// A documented invariant did not hold.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Trace),
    /// The output directory could not be reset before generation.
    #[error("failed to clean up {}: {source}", path.display())]
    CleanupFailed {
        /// The path that could not be removed or recreated.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<HeapError>),
    /// A wrapper for IO errors.
    #[error(transparent)]
    IOError(#[from] io::Error),
    /// A wrapper for JSON errors.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JSONError(#[from] serde_json::Error),
}

impl HeapError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        HeapError::Context(msg.into(), Box::new(self))
    }
}

impl Debug for HeapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Construct a new [`HeapError`] from a message or a variant and message.
#[macro_export]
macro_rules! heap_err {
    (SchemaMismatch: $index:expr, $expected:expr, $actual:expr) => {{
        $crate::__private::must_use($crate::HeapError::SchemaMismatch {
            index: $index,
            expected: $expected,
            actual: $actual,
            backtrace: std::backtrace::Backtrace::capture(),
        })
    }};
    (InvalidField: $index:expr, $field:expr, $value:expr) => {{
        $crate::__private::must_use($crate::HeapError::InvalidField {
            index: $index,
            field: $field,
            value: i64::from($value),
            backtrace: std::backtrace::Backtrace::capture(),
        })
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use($crate::HeapError::Context($msg.into(), Box::new($err)))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::HeapError::$variant(
            format!($fmt, $($arg),*).into(),
            Backtrace::capture(),
        ))
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::__private::must_use($crate::HeapError::$variant($err))
    };
}

/// Constructs a new [`HeapError`] via [`heap_err!`] and returns it from the enclosing function.
#[macro_export]
macro_rules! heap_bail {
    ($($tt:tt)+) => {
        return Err($crate::heap_err!($($tt)+))
    };
}

/// Panic with a [`HeapError`].
#[macro_export]
macro_rules! heap_panic {
    ($err:expr) => {{
        let err: $crate::HeapError = $err;
        panic!("{}", err)
    }};
}

/// A type alias for Results that return [`HeapError`]s as their error type.
pub type HeapResult<T> = Result<T, HeapError>;

/// A trait for unwrapping a value while panicking with a message that names the broken invariant.
pub trait HeapExpect {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the contained value, otherwise panics with `msg`.
    /// Should only be used where the surrounding code guarantees a value.
    fn heap_expect(self, msg: &str) -> Self::Output;
}

impl<T> HeapExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    #[allow(clippy::panic)]
    fn heap_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = HeapError::InvalidArgument(msg.to_string().into(), Backtrace::capture());
            heap_panic!(err)
        })
    }
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn must_use(error: crate::HeapError) -> crate::HeapError {
        error
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn bail_returns_variant() {
        fn layout(page_size: usize) -> HeapResult<()> {
            heap_bail!(InvalidLayout: "page of {} bytes holds no slots", page_size)
        }

        let err = layout(3).unwrap_err();
        assert!(matches!(err, HeapError::InvalidLayout(..)));
        assert!(err.to_string().starts_with("invalid page layout: page of 3 bytes"));
    }

    #[test]
    fn structured_variants() {
        let err = heap_err!(SchemaMismatch: 4, 2, 3);
        assert!(err.to_string().starts_with("tuple 4 has 3 fields, expected 2"));

        let err = heap_err!(InvalidField: 1, 0, -7i32);
        assert!(matches!(err, HeapError::InvalidField { value: -7, .. }));
    }

    #[test]
    fn context_wraps_source() {
        let err = heap_err!(PartitionMismatch: "sizes sum to {}", 9).with_context("table test.0");
        assert!(err.to_string().starts_with("table test.0: partition mismatch: sizes sum to 9"));
    }

    #[test]
    fn cleanup_names_path() {
        let err = HeapError::CleanupFailed {
            path: PathBuf::from("out/child"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to clean up out/child: denied");
    }

    #[test]
    fn io_errors_convert() {
        fn open() -> HeapResult<()> {
            Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }

        assert!(matches!(open(), Err(HeapError::IOError(_))));
    }

    #[test]
    #[should_panic(expected = "no fields")]
    fn expect_on_none_panics() {
        let fields: Option<usize> = None;
        fields.heap_expect("no fields");
    }
}
