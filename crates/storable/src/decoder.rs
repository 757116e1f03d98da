//! `StorableDecoder`: reads a frozen buffer into a [`Value`].

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;
use storable_buffers::Reader;

use crate::cache::{Decoded, ObjectCache, Patch};
use crate::error::ThawError;
use crate::header::{parse_header, Preamble};
use crate::tag::Tag;
use crate::value::Value;

/// What to do with a tag byte outside the known set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTagPolicy {
    /// Fail with [`ThawError::UnknownTag`].
    #[default]
    Error,
    /// Consume the tag byte and yield `Null`. Whatever bytes belonged to the
    /// unknown item are then read as the next item, so the result is
    /// usually garbage; this exists for compatibility with lenient readers.
    Null,
}

/// Decoding options.
#[derive(Debug, Clone, Default)]
pub struct ThawOptions {
    pub unknown_tag: UnknownTagPolicy,
}

/// Storable decoder.
///
/// The decoder holds only options. Each call to [`decode`](Self::decode)
/// builds its own object cache, so one decoder can serve any number of
/// buffers.
#[derive(Debug, Clone, Default)]
pub struct StorableDecoder {
    options: ThawOptions,
}

impl StorableDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ThawOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ThawOptions {
        &self.options
    }

    /// Decodes a complete frozen buffer, preamble included.
    pub fn decode(&self, input: &[u8]) -> Result<Value, ThawError> {
        self.decode_with_preamble(input).map(|(_, value)| value)
    }

    /// Like [`decode`](Self::decode), also returning the preamble found.
    pub fn decode_with_preamble(&self, input: &[u8]) -> Result<(Preamble, Value), ThawError> {
        let mut reader = Reader::new(input);
        let preamble = parse_header(&mut reader)?;
        let mut thaw = Thaw {
            reader,
            cache: ObjectCache::new(),
            options: &self.options,
        };
        let root = thaw.read_item()?;
        Ok((preamble, thaw.cache.finish(root)))
    }
}

/// State of a single decode call.
struct Thaw<'a, 'o> {
    reader: Reader<'a>,
    cache: ObjectCache,
    options: &'o ThawOptions,
}

impl Thaw<'_, '_> {
    fn read_item(&mut self) -> Result<Decoded, ThawError> {
        let byte = self.reader.u8()?;
        let Some(tag) = Tag::from_u8(byte) else {
            return match self.options.unknown_tag {
                UnknownTagPolicy::Error => Err(ThawError::UnknownTag(byte)),
                UnknownTagPolicy::Null => {
                    let offset = self.reader.x - 1;
                    debug!("unknown tag 0x{byte:02x} at offset {offset}, reading as null");
                    Ok(Decoded::Ready(Value::Null))
                }
            };
        };
        if !tag.allocates_slot() {
            return self.read_body(tag, None);
        }
        let slot = self.cache.reserve();
        let decoded = self.read_body(tag, Some(slot))?;
        self.cache.fill(slot, &decoded);
        Ok(decoded)
    }

    fn read_body(&mut self, tag: Tag, slot: Option<usize>) -> Result<Decoded, ThawError> {
        let value = match tag {
            Tag::BackRef => {
                let index = self.reader.u32()? as usize;
                return self.cache.back_reference(index);
            }
            Tag::LargeScalar | Tag::LargeUtf8Str => {
                let len = self.reader.u32()? as usize;
                Value::Bytes(self.reader.buf(len)?.to_vec())
            }
            Tag::Scalar | Tag::Utf8Str => {
                let len = self.reader.u8()? as usize;
                Value::Bytes(self.reader.buf(len)?.to_vec())
            }
            Tag::Array => self.read_array(slot)?,
            Tag::Hash => self.read_hash(slot)?,
            Tag::Ref | Tag::Overload | Tag::TiedArray | Tag::TiedHash | Tag::TiedScalar => {
                return self.read_item();
            }
            Tag::Undef | Tag::SvUndef => Value::Null,
            Tag::SvYes => Value::Integer(1),
            Tag::SvNo => Value::Bytes(Vec::new()),
            Tag::Double => Value::Float(self.reader.f64_ne()?),
            Tag::Byte => Value::Integer(self.reader.u8()? as i64 - 128),
            Tag::NetInt => Value::Integer(self.reader.u32()? as i32 as i64),
            Tag::Bless => {
                let len = self.reader.u8()? as usize;
                let name = self.reader.buf(len)?.to_vec();
                self.cache.push_class(name);
                return self.read_item();
            }
            Tag::IxBless => {
                let index = self.reader.u8()? as usize;
                self.cache.class(index)?;
                return self.read_item();
            }
            Tag::TiedKey => {
                let data = self.read_item()?;
                self.read_item()?;
                return Ok(data);
            }
            Tag::TiedIdx => {
                let data = self.read_item()?;
                self.reader.u32()?;
                return Ok(data);
            }
        };
        Ok(Decoded::Ready(value))
    }

    /// Capacity hint for `len` upcoming items: each needs at least one byte.
    fn capacity(&self, len: usize) -> usize {
        len.min(self.reader.size())
    }

    fn read_array(&mut self, slot: Option<usize>) -> Result<Value, ThawError> {
        let len = self.reader.u32()? as usize;
        let array = Rc::new(RefCell::new(Vec::with_capacity(self.capacity(len))));
        let value = Value::Array(Rc::clone(&array));
        if let Some(slot) = slot {
            self.cache.fill(slot, &Decoded::Ready(value.clone()));
        }
        for index in 0..len {
            let item = match self.read_item()? {
                Decoded::Ready(item) => item,
                Decoded::Deferred(target) => {
                    self.cache.defer(Patch::Element {
                        array: Rc::clone(&array),
                        index,
                        slot: target,
                    });
                    Value::Null
                }
            };
            array.borrow_mut().push(item);
        }
        Ok(value)
    }

    // Each entry is the value first, then a 4-byte key length and the key.
    fn read_hash(&mut self, slot: Option<usize>) -> Result<Value, ThawError> {
        let len = self.reader.u32()? as usize;
        let hash = Rc::new(RefCell::new(IndexMap::with_capacity(self.capacity(len))));
        let value = Value::Hash(Rc::clone(&hash));
        if let Some(slot) = slot {
            self.cache.fill(slot, &Decoded::Ready(value.clone()));
        }
        for _ in 0..len {
            let item = self.read_item()?;
            let key_len = self.reader.u32()? as usize;
            let key = self.reader.buf(key_len)?.to_vec();
            // A later entry for the same key replaces the earlier one, including
            // any back-reference still waiting to be patched into it.
            self.cache.forget_entry(&hash, &key);
            let item = match item {
                Decoded::Ready(item) => item,
                Decoded::Deferred(target) => {
                    self.cache.defer(Patch::Entry {
                        hash: Rc::clone(&hash),
                        key: key.clone(),
                        slot: target,
                    });
                    Value::Null
                }
            };
            hash.borrow_mut().insert(key, item);
        }
        Ok(value)
    }
}
