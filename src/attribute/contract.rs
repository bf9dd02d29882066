//! Per-kind interpretation contracts.

use super::{AttributeValue, NumberKind, TaggedNumber};
use crate::error::{Error, Result};
use crate::kind::NodeKind;
use crate::tree::DirtyFlags;

/// A value check applied to one numeric position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    Any,
    /// Finite and `>= 0`.
    NonNegative,
    /// Finite and `> 0`.
    Positive,
    /// Inclusive float range.
    Range(f32, f32),
    /// Inclusive integer range.
    IntRange(i32, i32),
}

impl Check {
    fn admits(self, number: TaggedNumber) -> bool {
        let as_f64 = match number {
            TaggedNumber::F32(v) => {
                if v.is_nan() {
                    return false;
                }
                f64::from(v)
            }
            TaggedNumber::I32(v) => f64::from(v),
            TaggedNumber::U32(v) => f64::from(v),
        };
        match self {
            Check::Any => true,
            Check::NonNegative => as_f64.is_finite() && as_f64 >= 0.,
            Check::Positive => as_f64.is_finite() && as_f64 > 0.,
            Check::Range(min, max) => as_f64 >= f64::from(min) && as_f64 <= f64::from(max),
            Check::IntRange(min, max) => as_f64 >= f64::from(min) && as_f64 <= f64::from(max),
        }
    }
}

/// One position of the numeric array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub kind: NumberKind,
    pub check: Check,
    /// Filled in by the canonical form when the caller leaves the position out. Positions with
    /// a default must come after all required positions.
    pub default: Option<TaggedNumber>,
}

impl Slot {
    pub const fn required(kind: NumberKind, check: Check) -> Slot {
        Slot {
            kind,
            check,
            default: None,
        }
    }

    pub const fn optional(kind: NumberKind, check: Check, default: TaggedNumber) -> Slot {
        Slot {
            kind,
            check,
            default: Some(default),
        }
    }

    fn admits(&self, number: TaggedNumber) -> bool {
        number.kind() == self.kind && self.check.admits(number)
    }
}

/// Layout of the numeric array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numbers {
    /// No numbers allowed.
    None,
    /// Positional slots; trailing slots with defaults may be omitted.
    Slots(&'static [Slot]),
    /// Either one value for all four edges/corners or one value each, in top, right, bottom,
    /// left order. Canonical form always has four.
    Edges(Slot),
}

/// Whether the string or object slot must, may, or must not be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Forbidden,
    Optional,
    Required,
}

impl Presence {
    fn admits(self, present: bool) -> bool {
        match self {
            Presence::Forbidden => !present,
            Presence::Optional => true,
            Presence::Required => present,
        }
    }
}

/// One accepted encoding of an attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoding {
    pub numbers: Numbers,
    pub string: Presence,
    pub object: Presence,
}

impl Encoding {
    pub const fn numbers(numbers: Numbers) -> Encoding {
        Encoding {
            numbers,
            string: Presence::Forbidden,
            object: Presence::Forbidden,
        }
    }

    pub const fn string() -> Encoding {
        Encoding {
            numbers: Numbers::None,
            string: Presence::Required,
            object: Presence::Forbidden,
        }
    }

    pub const fn object() -> Encoding {
        Encoding {
            numbers: Numbers::None,
            string: Presence::Forbidden,
            object: Presence::Required,
        }
    }

    /// Returns the canonical form if the value matches this encoding.
    fn canonicalize(&self, value: &AttributeValue) -> Option<AttributeValue> {
        if !self.string.admits(value.string.is_some()) || !self.object.admits(value.object.is_some())
        {
            return None;
        }

        let numbers = match self.numbers {
            Numbers::None => {
                if !value.numbers.is_empty() {
                    return None;
                }
                Vec::new()
            }
            Numbers::Slots(slots) => {
                if value.numbers.len() > slots.len() {
                    return None;
                }
                let mut numbers = Vec::with_capacity(slots.len());
                for (i, slot) in slots.iter().enumerate() {
                    match value.numbers.get(i) {
                        Some(number) if slot.admits(*number) => numbers.push(*number),
                        Some(_) => return None,
                        None => numbers.push(slot.default?),
                    }
                }
                numbers
            }
            Numbers::Edges(slot) => match value.numbers.len() {
                1 if slot.admits(value.numbers[0]) => vec![value.numbers[0]; 4],
                4 if value.numbers.iter().all(|n| slot.admits(*n)) => value.numbers.clone(),
                _ => return None,
            },
        };

        Some(AttributeValue {
            numbers,
            string: value.string.clone(),
            object: value.object.clone(),
        })
    }
}

/// Which node kinds an attribute applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope {
    /// Every node kind.
    Common,
    Only(&'static [NodeKind]),
}

impl Scope {
    pub fn admits(self, kind: NodeKind) -> bool {
        match self {
            Scope::Common => true,
            Scope::Only(kinds) => kinds.contains(&kind),
        }
    }
}

/// The interpretation contract of one attribute kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contract {
    pub name: &'static str,
    /// Accepted encodings, tried in order. Alternatives must not overlap.
    pub encodings: &'static [Encoding],
    /// Passes that must re-run after the attribute changes.
    pub dirty: DirtyFlags,
    pub scope: Scope,
}

impl Contract {
    /// Validates `value` and returns its canonical form.
    pub fn canonicalize(&self, value: &AttributeValue) -> Result<AttributeValue> {
        self.encodings
            .iter()
            .find_map(|encoding| encoding.canonicalize(value))
            .ok_or(Error::InvalidParameter("payload does not match the attribute contract"))
    }
}
