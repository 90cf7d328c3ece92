//! Ident - compact record identifier
//!
//! An `Ident` packs a naming convention and a value into a single `u64`:
//!
//! | Bits  | Field      | Meaning                                   |
//! |-------|------------|-------------------------------------------|
//! | 63-62 | convention | how the value bits are interpreted        |
//! | 61-0  | value      | packed text, text-pool code, or a number  |
//!
//! Four naming conventions exist:
//! - `Word`: short lowercase text, packed with a dense 5-bit alphabet
//! - `Acronym`: short uppercase text, packed with a dense 6-bit alphabet
//! - `Text`: a code into the interned text pool (for longer names)
//! - `Serial`: a per-parent number, usually assigned by the store
//!
//! ## Ordering
//!
//! Idents use strict total ordering on the raw word: convention first, then
//! value. This makes name-sorted stores deterministic and enables binary
//! search in sorted collections.
//!
//! ## Sentinels
//!
//! The all-ones `Serial` value is reserved as [`Ident::AUTO`]: "assign the
//! next auto-id on insert". It never names a stored record.
//!
//! ## Codec policy
//!
//! The word codec accepts lowercase only; uppercase input is rejected, not
//! folded. The acronym codec is the mirror image. Rejection returns `None`
//! and the caller decides whether that is fatal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits reserved for the naming convention tag.
pub const CONVENTION_BITS: u32 = 2;

/// Bits available to the identifier value.
pub const VALUE_BITS: u32 = 64 - CONVENTION_BITS;

/// Largest representable identifier value.
pub const VALUE_MAX: u64 = (1 << VALUE_BITS) - 1;

/// Word codec: bits per character (dense lowercase alphabet).
pub const WORD_CHAR_BITS: u32 = 5;

/// Word codec: maximum characters (11 * 5 = 55 bits <= 62).
pub const WORD_CAP: usize = 11;

/// Acronym codec: bits per character (dense uppercase alphabet).
pub const ACRONYM_CHAR_BITS: u32 = 6;

/// Acronym codec: maximum characters (10 * 6 = 60 bits <= 62).
pub const ACRONYM_CAP: usize = 10;

/// Naming convention tag (2 bits)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// Dense-packed lowercase text
    Word = 0,
    /// Dense-packed uppercase text
    Acronym = 1,
    /// Reference into the interned text pool
    Text = 2,
    /// Per-parent numeric id
    Serial = 3,
}

impl Convention {
    /// Get the short name of this convention
    pub fn name(&self) -> &'static str {
        match self {
            Convention::Word => "word",
            Convention::Acronym => "acronym",
            Convention::Text => "text",
            Convention::Serial => "serial",
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits {
            0 => Convention::Word,
            1 => Convention::Acronym,
            2 => Convention::Text,
            _ => Convention::Serial,
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Compact record identifier: convention tag + value in one `u64`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ident(u64);

impl Ident {
    /// "Assign automatically on insert": the reserved maximum serial value.
    pub const AUTO: Ident = Ident((Convention::Serial as u64) << VALUE_BITS | VALUE_MAX);

    /// Build from convention + value. The value must fit [`VALUE_BITS`].
    pub fn new(convention: Convention, value: u64) -> Option<Self> {
        if value > VALUE_MAX {
            return None;
        }
        Some(Ident((convention as u64) << VALUE_BITS | value))
    }

    /// Encode lowercase text as a `Word` ident.
    ///
    /// Accepts `a-z` and `_`, up to [`WORD_CAP`] characters. Empty input,
    /// over-long input, or any other character (uppercase included) yields
    /// `None`.
    pub fn word(text: &str) -> Option<Self> {
        let packed = pack_text(text, WORD_CAP, WORD_CHAR_BITS, word_code)?;
        Ident::new(Convention::Word, packed)
    }

    /// Encode uppercase text as an `Acronym` ident.
    ///
    /// Accepts `A-Z`, `0-9`, `_` and `-`, up to [`ACRONYM_CAP`] characters.
    pub fn acronym(text: &str) -> Option<Self> {
        let packed = pack_text(text, ACRONYM_CAP, ACRONYM_CHAR_BITS, acronym_code)?;
        Ident::new(Convention::Acronym, packed)
    }

    /// Build a `Text` ident from an interned-text code.
    pub fn text_ref(code: u64) -> Option<Self> {
        Ident::new(Convention::Text, code)
    }

    /// Build a `Serial` ident. The reserved maximum is not a valid name;
    /// use [`Ident::AUTO`] for it.
    pub fn serial(n: u64) -> Option<Self> {
        if n == VALUE_MAX {
            return None;
        }
        Ident::new(Convention::Serial, n)
    }

    /// The naming convention of this ident
    pub fn convention(&self) -> Convention {
        Convention::from_bits(self.0 >> VALUE_BITS)
    }

    /// The raw value bits of this ident
    pub fn value(&self) -> u64 {
        self.0 & VALUE_MAX
    }

    /// The full packed word
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Is this the auto-assign sentinel?
    pub fn is_auto(&self) -> bool {
        *self == Ident::AUTO
    }

    /// Decode a `Word` ident back to text. `None` for other conventions.
    ///
    /// Trailing padding is trimmed, so this is the exact inverse of
    /// [`Ident::word`] for any accepted input.
    pub fn word_text(&self) -> Option<String> {
        if self.convention() != Convention::Word {
            return None;
        }
        Some(unpack_text(
            self.value(),
            WORD_CAP,
            WORD_CHAR_BITS,
            word_char,
        ))
    }

    /// Decode an `Acronym` ident back to text. `None` for other conventions.
    pub fn acronym_text(&self) -> Option<String> {
        if self.convention() != Convention::Acronym {
            return None;
        }
        Some(unpack_text(
            self.value(),
            ACRONYM_CAP,
            ACRONYM_CHAR_BITS,
            acronym_char,
        ))
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({})", self)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.convention() {
            Convention::Word => write!(f, "{}", self.word_text().unwrap_or_default()),
            Convention::Acronym => write!(f, "{}", self.acronym_text().unwrap_or_default()),
            Convention::Text => write!(f, "@{}", self.value()),
            Convention::Serial => {
                if self.is_auto() {
                    write!(f, "#auto")
                } else {
                    write!(f, "#{}", self.value())
                }
            }
        }
    }
}

// === Dense sub-byte alphabets ===
// Code 0 is padding in both alphabets; character codes start at 1 so a
// decoded 0 terminates the text.

/// Word alphabet: `a-z` -> 1..=26, `_` -> 27
fn word_code(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 1),
        b'_' => Some(27),
        _ => None,
    }
}

fn word_char(code: u64) -> u8 {
    match code {
        1..=26 => b'a' + (code - 1) as u8,
        _ => b'_',
    }
}

/// Acronym alphabet: `A-Z` -> 1..=26, `0-9` -> 27..=36, `_` -> 37, `-` -> 38
fn acronym_code(c: u8) -> Option<u64> {
    match c {
        b'A'..=b'Z' => Some((c - b'A') as u64 + 1),
        b'0'..=b'9' => Some((c - b'0') as u64 + 27),
        b'_' => Some(37),
        b'-' => Some(38),
        _ => None,
    }
}

fn acronym_char(code: u64) -> u8 {
    match code {
        1..=26 => b'A' + (code - 1) as u8,
        27..=36 => b'0' + (code - 27) as u8,
        37 => b'_',
        _ => b'-',
    }
}

/// Pack text into value bits, one character per `char_bits` slot, first
/// character in the lowest slot. Empty, over-long or off-alphabet input
/// yields `None`.
fn pack_text(text: &str, cap: usize, char_bits: u32, code: fn(u8) -> Option<u64>) -> Option<u64> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || bytes.len() > cap {
        return None;
    }
    let mut packed = 0u64;
    for (i, &b) in bytes.iter().enumerate() {
        packed |= code(b)? << (char_bits * i as u32);
    }
    Some(packed)
}

/// Unpack value bits back to text, stopping at the first padding slot.
fn unpack_text(mut packed: u64, cap: usize, char_bits: u32, ch: fn(u64) -> u8) -> String {
    let mask = (1u64 << char_bits) - 1;
    let mut out = Vec::with_capacity(cap);
    for _ in 0..cap {
        let code = packed & mask;
        if code == 0 {
            break;
        }
        out.push(ch(code));
        packed >>= char_bits;
    }
    // Alphabet codes map back to ASCII only
    String::from_utf8(out).expect("codec alphabets are ASCII")
}
