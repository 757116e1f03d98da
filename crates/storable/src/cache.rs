//! Per-call object cache: slot arena, class names and deferred patches.
//!
//! Every referenceable item reserves a slot before its body is read, so a
//! back-reference nested inside the item can name it. Containers publish
//! their handle into the slot before reading children, which makes
//! references to an enclosing container resolve on the spot. A
//! back-reference to a slot whose value is still unknown (a wrapper such as
//! a `Ref` around the item being read) is recorded as a [`Patch`] and
//! filled in by [`ObjectCache::finish`].

use std::rc::Rc;

use log::trace;

use crate::error::ThawError;
use crate::value::{ArrayRef, HashRef, Value};

/// Result of reading one item.
#[derive(Debug)]
pub(crate) enum Decoded {
    /// The item's value is known.
    Ready(Value),
    /// The item is whatever the named slot holds once decoding is over.
    Deferred(usize),
}

#[derive(Debug)]
enum Slot {
    Pending,
    Ready(Value),
    /// Resolves to another slot.
    Alias(usize),
}

/// A container position holding a stand-in until its slot is known.
#[derive(Debug)]
pub(crate) enum Patch {
    Element { array: ArrayRef, index: usize, slot: usize },
    Entry { hash: HashRef, key: Vec<u8>, slot: usize },
}

#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
    objects: Vec<Slot>,
    classes: Vec<Vec<u8>>,
    has_back_reference: bool,
    patches: Vec<Patch>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next slot and returns its index.
    pub fn reserve(&mut self) -> usize {
        self.objects.push(Slot::Pending);
        self.objects.len() - 1
    }

    /// Records the final (or, for containers, early) value of `slot`.
    pub fn fill(&mut self, slot: usize, decoded: &Decoded) {
        self.objects[slot] = match decoded {
            Decoded::Ready(value) => Slot::Ready(value.clone()),
            Decoded::Deferred(target) => Slot::Alias(*target),
        };
    }

    /// Handles a back-reference to `slot`.
    pub fn back_reference(&mut self, slot: usize) -> Result<Decoded, ThawError> {
        self.has_back_reference = true;
        match self.objects.get(slot) {
            None => Err(ThawError::InvalidBackReference(slot)),
            Some(Slot::Ready(value)) => Ok(Decoded::Ready(value.clone())),
            Some(Slot::Pending | Slot::Alias(_)) => Ok(Decoded::Deferred(slot)),
        }
    }

    pub fn defer(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    /// Drops queued patches for `key` in `hash`.
    pub fn forget_entry(&mut self, hash: &HashRef, key: &[u8]) {
        self.patches.retain(|patch| match patch {
            Patch::Entry {
                hash: target,
                key: queued,
                ..
            } => !(Rc::ptr_eq(target, hash) && queued.as_slice() == key),
            Patch::Element { .. } => true,
        });
    }

    pub fn push_class(&mut self, name: Vec<u8>) {
        self.classes.push(name);
    }

    pub fn class(&self, index: usize) -> Result<&[u8], ThawError> {
        self.classes
            .get(index)
            .map(Vec::as_slice)
            .ok_or(ThawError::InvalidBlessIndex(index))
    }

    /// Follows aliases from `slot` to a value.
    ///
    /// A chain that loops back on itself (a reference whose target is the
    /// reference) has no value in this model and resolves to `Null`.
    fn resolve(&self, mut slot: usize) -> Value {
        for _ in 0..=self.objects.len() {
            match &self.objects[slot] {
                Slot::Ready(value) => return value.clone(),
                Slot::Alias(next) => slot = *next,
                Slot::Pending => break,
            }
        }
        Value::Null
    }

    /// Applies deferred patches and resolves the root item.
    pub fn finish(self, root: Decoded) -> Value {
        if self.has_back_reference {
            trace!("applying {} deferred back-references", self.patches.len());
            for patch in &self.patches {
                match patch {
                    Patch::Element { array, index, slot } => {
                        let value = self.resolve(*slot);
                        array.borrow_mut()[*index] = value;
                    }
                    Patch::Entry { hash, key, slot } => {
                        let value = self.resolve(*slot);
                        hash.borrow_mut().insert(key.clone(), value);
                    }
                }
            }
        }
        match root {
            Decoded::Ready(value) => value,
            Decoded::Deferred(slot) => self.resolve(slot),
        }
    }
}
