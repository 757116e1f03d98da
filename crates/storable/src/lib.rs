//! Reader for Perl `Storable` frozen buffers.
//!
//! Decodes the output of `freeze`/`nfreeze` into a [`Value`] tree. Objects
//! that the frozen data shares are shared in the result too, and
//! self-referencing structures come back as cycles of [`Rc`](std::rc::Rc)
//! handles. Class names from `bless` are read but not attached to values;
//! tied containers come back as plain containers.
//!
//! ```
//! use storable::thaw;
//!
//! // a frozen two-item array: "ab" and undef
//! let frozen = [
//!     0x05, 0x07, 0x02, 0x00, 0x00, 0x00, 0x02, 0x0a, 0x02, b'a', b'b', 0x0e,
//! ];
//! let value = thaw(&frozen).unwrap();
//! let items = value.as_array().unwrap().borrow();
//! assert_eq!(items[0].as_str(), Some("ab"));
//! assert!(items[1].is_null());
//! ```

mod cache;
mod decoder;
mod error;
mod header;
mod json;
mod tag;
mod value;

pub use decoder::{StorableDecoder, ThawOptions, UnknownTagPolicy};
pub use error::{JsonError, ThawError};
pub use header::{parse_header, Preamble, NATIVE_MAGIC, NATIVE_MARKER, NETWORK_MAGIC};
pub use tag::Tag;
pub use value::{ArrayRef, HashRef, Value};

/// Decodes a frozen buffer with default options.
pub fn thaw(input: &[u8]) -> Result<Value, ThawError> {
    StorableDecoder::new().decode(input)
}

/// Decodes a frozen buffer with the given options.
pub fn thaw_with(input: &[u8], options: &ThawOptions) -> Result<Value, ThawError> {
    StorableDecoder::with_options(options.clone()).decode(input)
}

/// Decodes a frozen buffer and reports which preamble it carried.
pub fn thaw_with_preamble(input: &[u8]) -> Result<(Preamble, Value), ThawError> {
    StorableDecoder::new().decode_with_preamble(input)
}
