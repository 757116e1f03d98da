//! Forward-only binary reader with cursor tracking.

use crate::BufferError;

/// A forward-only reader over a borrowed byte slice.
///
/// The reader keeps a cursor and exposes exact-length reads. There is no
/// seek or rewind; once bytes are consumed they stay consumed.
///
/// # Example
///
/// ```
/// use storable_buffers::Reader;
///
/// let data = [0x0a, 0x00, 0x00, 0x00, 0x02];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x0a));
/// assert_eq!(reader.u32(), Ok(2));
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of bytes not yet consumed.
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        let remaining = self.size();
        if n > remaining {
            Err(BufferError::EndOfBuffer {
                offset: self.x,
                wanted: n,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Reads exactly `size` bytes and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        let end = x + size;
        self.x = end;
        Ok(&self.uint8[x..end])
    }

    /// Reads exactly `N` bytes into a fixed-size array.
    #[inline]
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads one unsigned byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 32-bit big-endian integer.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array::<4>().map(u32::from_be_bytes)
    }

    /// Reads a 64-bit float in the host's byte order.
    #[inline]
    pub fn f64_ne(&mut self) -> Result<f64, BufferError> {
        self.array::<8>().map(f64::from_ne_bytes)
    }
}
