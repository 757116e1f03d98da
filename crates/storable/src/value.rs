//! [`Value`]: the decoded tree.
//!
//! Containers are shared handles (`Rc<RefCell<..>>`), so a back-reference in
//! the frozen data turns into two handles to the same container, and a
//! self-reference turns into a cycle. Cloning a `Value` clones handles, not
//! contents.
//!
//! A graph with a cycle holds strong references to itself and is not freed
//! when the last outside handle is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Shared handle to a decoded array.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a decoded hash. Keys are raw bytes.
pub type HashRef = Rc<RefCell<IndexMap<Vec<u8>, Value>>>;

/// A decoded Storable item.
#[derive(Clone)]
pub enum Value {
    /// `undef`.
    Null,
    /// A scalar string, as raw bytes.
    Bytes(Vec<u8>),
    /// An integer scalar.
    Integer(i64),
    /// A floating-point scalar.
    Float(f64),
    /// An array.
    Array(ArrayRef),
    /// A hash.
    Hash(HashRef),
}

impl Value {
    /// Wraps `items` in a fresh array handle.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Wraps `entries` in a fresh hash handle.
    pub fn hash(entries: IndexMap<Vec<u8>, Value>) -> Value {
        Value::Hash(Rc::new(RefCell::new(entries)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The scalar string, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashRef> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    /// Returns `true` when both values are the same container instance.
    ///
    /// Scalars are never identical in this sense, even when equal.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Address of the container, used to detect cycles while walking.
    pub(crate) fn container_ptr(&self) -> Option<*const ()> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const ()),
            Value::Hash(h) => Some(Rc::as_ptr(h) as *const ()),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = Vec::new();
        write_debug(self, f, &mut stack)
    }
}

// Containers already on `stack` are printed as `<cycle>`.
fn write_debug(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    stack: &mut Vec<*const ()>,
) -> fmt::Result {
    if let Some(ptr) = value.container_ptr() {
        if stack.contains(&ptr) {
            return f.write_str("<cycle>");
        }
        stack.push(ptr);
    }
    match value {
        Value::Null => f.write_str("Null")?,
        Value::Bytes(bytes) => write!(f, "Bytes(\"{}\")", bytes.escape_ascii())?,
        Value::Integer(n) => write!(f, "Integer({n})")?,
        Value::Float(n) => write!(f, "Float({n:?})")?,
        Value::Array(array) => {
            f.write_str("Array([")?;
            for (i, item) in array.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_debug(item, f, stack)?;
            }
            f.write_str("])")?;
        }
        Value::Hash(hash) => {
            f.write_str("Hash({")?;
            for (i, (key, item)) in hash.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "\"{}\": ", key.escape_ascii())?;
                write_debug(item, f, stack)?;
            }
            f.write_str("})")?;
        }
    }
    if value.container_ptr().is_some() {
        stack.pop();
    }
    Ok(())
}
