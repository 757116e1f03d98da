//! Preamble parsing.
//!
//! Storable output starts with a two-byte magic. `nfreeze` writes the
//! network-order magic; `freeze` writes the native magic followed by a
//! byte-order/size marker. Either way the body that follows is read with
//! the same tag table.

use log::{debug, warn};
use storable_buffers::Reader;

use crate::error::ThawError;

/// Magic written by `nfreeze` (network byte order).
pub const NETWORK_MAGIC: [u8; 2] = [0x05, 0x07];

/// Magic written by `freeze` (native byte order).
pub const NATIVE_MAGIC: [u8; 2] = [0x04, 0x07];

/// Byte-order and type-size marker expected after [`NATIVE_MAGIC`].
pub const NATIVE_MARKER: [u8; 9] = [0x04, 0x34, 0x33, 0x32, 0x31, 0x04, 0x04, 0x04, 0x08];

/// Which preamble a buffer started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preamble {
    /// Network-order preamble.
    Network,
    /// Native-order preamble; `marker_ok` tells whether the 9-byte marker
    /// matched [`NATIVE_MARKER`].
    Native { marker_ok: bool },
    /// Unrecognised two-byte preamble. Decoding continues right after it.
    Unknown([u8; 2]),
}

/// Consumes the preamble and leaves `reader` at the start of the body.
///
/// Unrecognised preambles are accepted. The only failure is running out of
/// bytes.
pub fn parse_header(reader: &mut Reader<'_>) -> Result<Preamble, ThawError> {
    let magic = reader.array::<2>()?;
    match magic {
        NETWORK_MAGIC => Ok(Preamble::Network),
        NATIVE_MAGIC => {
            let marker = reader.array::<9>()?;
            let marker_ok = marker == NATIVE_MARKER;
            if !marker_ok {
                debug!("native preamble with unexpected marker {marker:02x?}");
            }
            Ok(Preamble::Native { marker_ok })
        }
        other => {
            warn!("unrecognised preamble {other:02x?}, decoding anyway");
            Ok(Preamble::Unknown(other))
        }
    }
}
