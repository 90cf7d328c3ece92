//! Meta - packed metadata word
//!
//! A `Meta` describes *what kind of value* a record's data represents,
//! independent of where the value is stored. Two records may share identical
//! metadata while holding different data.
//!
//! ```text
//! | 63      56 | 55      48 | 47         32 | 31                    0 |
//! |   domain   |    role    |      tag      |     attribute bits      |
//! ```
//!
//! The low byte of the attribute block is universal (meaningful in every
//! domain); the remaining attribute bits are interpreted per-domain by
//! consumer schemas. Field widths are constants, not guarantees: downstream
//! schemas pick the authoritative layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit width of the domain selector.
pub const DOMAIN_BITS: u32 = 8;

/// Bit width of the role field.
pub const ROLE_BITS: u32 = 8;

/// Bit width of the tag field.
pub const TAG_BITS: u32 = 16;

/// Bit width of the attribute block.
pub const ATTR_BITS: u32 = 32;

const DOMAIN_SHIFT: u32 = 64 - DOMAIN_BITS;
const ROLE_SHIFT: u32 = DOMAIN_SHIFT - ROLE_BITS;
const TAG_SHIFT: u32 = ROLE_SHIFT - TAG_BITS;

const DOMAIN_MASK: u64 = ((1 << DOMAIN_BITS) - 1) << DOMAIN_SHIFT;
const ROLE_MASK: u64 = ((1 << ROLE_BITS) - 1) << ROLE_SHIFT;
const TAG_MASK: u64 = ((1 << TAG_BITS) - 1) << TAG_SHIFT;
const ATTR_MASK: u64 = (1 << ATTR_BITS) - 1;

// === Universal attribute bits (low attribute byte) ===

/// Value is a reference to another record rather than raw data.
pub const ATTR_REFERENCE: u32 = 1 << 0;

/// Value is immutable after first assignment.
pub const ATTR_FROZEN: u32 = 1 << 1;

/// Value is machine-generated rather than authored.
pub const ATTR_DERIVED: u32 = 1 << 2;

/// Packed metadata word: domain, role, tag and attribute bits
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meta(u64);

impl Meta {
    /// The all-zero metadata word ("untyped")
    pub const NONE: Meta = Meta(0);

    /// Build from all four fields
    pub fn new(domain: u8, role: u8, tag: u16, attrs: u32) -> Self {
        Meta((domain as u64) << DOMAIN_SHIFT
            | (role as u64) << ROLE_SHIFT
            | (tag as u64) << TAG_SHIFT
            | attrs as u64)
    }

    /// Rebuild from a raw packed word
    pub fn from_raw(raw: u64) -> Self {
        Meta(raw)
    }

    /// The full packed word
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Domain selector
    pub fn domain(&self) -> u8 {
        (self.0 >> DOMAIN_SHIFT) as u8
    }

    /// Role within the domain
    pub fn role(&self) -> u8 {
        ((self.0 & ROLE_MASK) >> ROLE_SHIFT) as u8
    }

    /// Free-form tag
    pub fn tag(&self) -> u16 {
        ((self.0 & TAG_MASK) >> TAG_SHIFT) as u16
    }

    /// The whole attribute block
    pub fn attrs(&self) -> u32 {
        (self.0 & ATTR_MASK) as u32
    }

    /// Copy with a new domain
    pub fn with_domain(self, domain: u8) -> Self {
        Meta(self.0 & !DOMAIN_MASK | (domain as u64) << DOMAIN_SHIFT)
    }

    /// Copy with a new role
    pub fn with_role(self, role: u8) -> Self {
        Meta(self.0 & !ROLE_MASK | (role as u64) << ROLE_SHIFT)
    }

    /// Copy with a new tag
    pub fn with_tag(self, tag: u16) -> Self {
        Meta(self.0 & !TAG_MASK | (tag as u64) << TAG_SHIFT)
    }

    /// Copy with a new attribute block
    pub fn with_attrs(self, attrs: u32) -> Self {
        Meta(self.0 & !ATTR_MASK | attrs as u64)
    }

    /// Copy with the given attribute bits raised
    pub fn with_attr_set(self, bits: u32) -> Self {
        self.with_attrs(self.attrs() | bits)
    }

    /// Test whether all the given attribute bits are raised
    pub fn has_attr(&self, bits: u32) -> bool {
        self.attrs() & bits == bits
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Meta(d:{} r:{} t:{} a:{:#010x})",
            self.domain(),
            self.role(),
            self.tag(),
            self.attrs()
        )
    }
}
