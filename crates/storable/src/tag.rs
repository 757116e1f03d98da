//! Tag bytes of the Storable wire format.

/// One-byte item tag.
///
/// Every variant maps to exactly one decoding rule in
/// [`StorableDecoder`](crate::StorableDecoder). Storable's own names for the
/// tags are given in brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Object already stored, addressed by slot index. [SX_OBJECT]
    BackRef = 0x00,
    /// Binary scalar with a 4-byte length. [SX_LSCALAR]
    LargeScalar = 0x01,
    /// Array: 4-byte count, then items. [SX_ARRAY]
    Array = 0x02,
    /// Hash: 4-byte count, then value/key pairs. [SX_HASH]
    Hash = 0x03,
    /// Reference to the following item. [SX_REF]
    Ref = 0x04,
    /// Undefined scalar. [SX_UNDEF]
    Undef = 0x05,
    /// Native-order double. [SX_DOUBLE]
    Double = 0x07,
    /// Signed byte, biased by +128. [SX_BYTE]
    Byte = 0x08,
    /// Signed 32-bit integer in network order. [SX_NETINT]
    NetInt = 0x09,
    /// Binary scalar with a 1-byte length. [SX_SCALAR]
    Scalar = 0x0a,
    /// Tied array wrapper. [SX_TIED_ARRAY]
    TiedArray = 0x0b,
    /// Tied hash wrapper. [SX_TIED_HASH]
    TiedHash = 0x0c,
    /// Tied scalar wrapper. [SX_TIED_SCALAR]
    TiedScalar = 0x0d,
    /// Perl's immortal undef. [SX_SV_UNDEF]
    SvUndef = 0x0e,
    /// Perl's immortal true. [SX_SV_YES]
    SvYes = 0x0f,
    /// Perl's immortal false. [SX_SV_NO]
    SvNo = 0x10,
    /// Blessed item with an inline class name. [SX_BLESS]
    Bless = 0x11,
    /// Blessed item whose class name is given by index. [SX_IX_BLESS]
    IxBless = 0x12,
    /// Overloaded reference. [SX_OVERLOAD]
    Overload = 0x14,
    /// Tied magic key: data item followed by a key item. [SX_TIED_KEY]
    TiedKey = 0x15,
    /// Tied magic index: data item followed by a 4-byte index. [SX_TIED_IDX]
    TiedIdx = 0x16,
    /// UTF-8 string with a 1-byte length. [SX_UTF8STR]
    Utf8Str = 0x17,
    /// UTF-8 string with a 4-byte length. [SX_LUTF8STR]
    LargeUtf8Str = 0x18,
}

impl Tag {
    /// Maps a wire byte to its tag, or `None` when the byte is unknown.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        let tag = match byte {
            0x00 => Tag::BackRef,
            0x01 => Tag::LargeScalar,
            0x02 => Tag::Array,
            0x03 => Tag::Hash,
            0x04 => Tag::Ref,
            0x05 => Tag::Undef,
            0x07 => Tag::Double,
            0x08 => Tag::Byte,
            0x09 => Tag::NetInt,
            0x0a => Tag::Scalar,
            0x0b => Tag::TiedArray,
            0x0c => Tag::TiedHash,
            0x0d => Tag::TiedScalar,
            0x0e => Tag::SvUndef,
            0x0f => Tag::SvYes,
            0x10 => Tag::SvNo,
            0x11 => Tag::Bless,
            0x12 => Tag::IxBless,
            0x14 => Tag::Overload,
            0x15 => Tag::TiedKey,
            0x16 => Tag::TiedIdx,
            0x17 => Tag::Utf8Str,
            0x18 => Tag::LargeUtf8Str,
            _ => return None,
        };
        Some(tag)
    }

    /// Whether an item with this tag gets its own object slot.
    ///
    /// Back-references and the tied-container wrappers delegate to another
    /// item and never take a slot of their own.
    pub fn allocates_slot(self) -> bool {
        !matches!(
            self,
            Tag::BackRef | Tag::TiedArray | Tag::TiedHash | Tag::TiedScalar
        )
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Tag::from_u8(byte).ok_or(byte)
    }
}
