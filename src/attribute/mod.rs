//! The generic attribute envelope.
//!
//! Every attribute travels through the same shape: an array of individually tagged numbers, an
//! optional string, and an optional opaque object. What each position means is decided by the
//! attribute kind's [`Contract`], looked up in a versioned [`Catalog`].

mod catalog;
mod codec;
mod contract;

pub use catalog::Catalog;
pub use contract::{Check, Contract, Encoding, Numbers, Presence, Scope, Slot};

use core::any::Any;
use core::fmt;
use std::rc::Rc;

/// An attribute kind identifier.
///
/// Ids form an append-only external enumeration: new kinds may be added, ids are never reused,
/// and no meaning is attached to their numeric value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeKind(pub u32);

impl fmt::Debug for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Catalog::builtin_name(*self) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "AttributeKind({})", self.0),
        }
    }
}

/// The numeric subtype of a [`TaggedNumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    F32,
    I32,
    U32,
}

/// One element of the numeric array. Each element carries its own subtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaggedNumber {
    F32(f32),
    I32(i32),
    U32(u32),
}

impl TaggedNumber {
    pub fn kind(self) -> NumberKind {
        match self {
            TaggedNumber::F32(_) => NumberKind::F32,
            TaggedNumber::I32(_) => NumberKind::I32,
            TaggedNumber::U32(_) => NumberKind::U32,
        }
    }

    pub fn as_f32(self) -> Option<f32> {
        match self {
            TaggedNumber::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        match self {
            TaggedNumber::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(self) -> Option<u32> {
        match self {
            TaggedNumber::U32(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f32> for TaggedNumber {
    fn from(v: f32) -> Self {
        TaggedNumber::F32(v)
    }
}

impl From<i32> for TaggedNumber {
    fn from(v: i32) -> Self {
        TaggedNumber::I32(v)
    }
}

impl From<u32> for TaggedNumber {
    fn from(v: u32) -> Self {
        TaggedNumber::U32(v)
    }
}

/// A caller-owned opaque object carried in the envelope's object slot.
///
/// Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn Any>);

impl ObjectRef {
    pub fn new<T: Any>(value: T) -> ObjectRef {
        ObjectRef(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &ObjectRef) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ObjectRef({:p})", Rc::as_ptr(&self.0))
    }
}

/// The attribute envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeValue {
    pub numbers: Vec<TaggedNumber>,
    pub string: Option<String>,
    pub object: Option<ObjectRef>,
}

impl AttributeValue {
    pub fn new() -> AttributeValue {
        AttributeValue::default()
    }

    pub fn floats(values: &[f32]) -> AttributeValue {
        AttributeValue {
            numbers: values.iter().map(|v| TaggedNumber::F32(*v)).collect(),
            ..AttributeValue::default()
        }
    }

    pub fn ints(values: &[i32]) -> AttributeValue {
        AttributeValue {
            numbers: values.iter().map(|v| TaggedNumber::I32(*v)).collect(),
            ..AttributeValue::default()
        }
    }

    pub fn uints(values: &[u32]) -> AttributeValue {
        AttributeValue {
            numbers: values.iter().map(|v| TaggedNumber::U32(*v)).collect(),
            ..AttributeValue::default()
        }
    }

    pub fn text<S: Into<String>>(string: S) -> AttributeValue {
        AttributeValue {
            string: Some(string.into()),
            ..AttributeValue::default()
        }
    }

    pub fn object(object: ObjectRef) -> AttributeValue {
        AttributeValue {
            object: Some(object),
            ..AttributeValue::default()
        }
    }

    /// Appends a number of any subtype.
    pub fn with_number<N: Into<TaggedNumber>>(mut self, number: N) -> AttributeValue {
        self.numbers.push(number.into());
        self
    }

    pub fn with_text<S: Into<String>>(mut self, string: S) -> AttributeValue {
        self.string = Some(string.into());
        self
    }

    /// Length of the numeric array.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// True if the numeric array is empty. The string and object slots are not considered.
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TaggedNumber> {
        self.numbers.get(index).copied()
    }

    pub fn f32_at(&self, index: usize) -> Option<f32> {
        self.get(index).and_then(TaggedNumber::as_f32)
    }

    pub fn i32_at(&self, index: usize) -> Option<i32> {
        self.get(index).and_then(TaggedNumber::as_i32)
    }

    pub fn u32_at(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(TaggedNumber::as_u32)
    }
}

#[test]
fn test_envelope_length() {
    let text = AttributeValue::text("x");
    assert_eq!(text.len(), 0);
    assert!(text.is_empty());

    let value = AttributeValue::floats(&[1.]).with_number(2u32).with_text("label");
    assert_eq!(value.len(), 2);
    assert!(!value.is_empty());
    assert_eq!(value.f32_at(0), Some(1.));
    assert_eq!(value.u32_at(1), Some(2));
    assert_eq!(value.f32_at(1), None, "subtypes are not converted");
}
