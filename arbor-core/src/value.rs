//! Value - a record's data payload
//!
//! A record's data is either absent, inlined in the record's own fixed-size
//! slot ("near"), held in an owned heap buffer ("far"), or a non-owned
//! shared reference. Near storage avoids a heap allocation for the small
//! values that dominate real trees; the threshold is [`NEAR_CAP`].
//!
//! ## Ownership
//!
//! A far buffer is owned exclusively by its record and released when the
//! record is finalized (the buffer's `Drop` is the release callback).
//! Shared payloads are observed, never owned: dropping the record drops
//! only the reference.

use std::fmt;
use std::sync::Arc;

/// Capacity of the inline ("near") value slot in bytes.
pub const NEAR_CAP: usize = 16;

/// A record's data payload
#[derive(Clone, Default)]
pub enum Value {
    /// No data
    #[default]
    Empty,
    /// Data inlined in the record's own value slot
    Near { len: u8, bytes: [u8; NEAR_CAP] },
    /// Data in an owned heap buffer
    Far(Vec<u8>),
    /// Non-owned reference to shared bytes
    Shared(Arc<[u8]>),
}

impl Value {
    /// Copy bytes in, choosing near storage when they fit
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.is_empty() {
            return Value::Empty;
        }
        if data.len() <= NEAR_CAP {
            let mut bytes = [0u8; NEAR_CAP];
            bytes[..data.len()].copy_from_slice(data);
            Value::Near {
                len: data.len() as u8,
                bytes,
            }
        } else {
            Value::Far(data.to_vec())
        }
    }

    /// Take ownership of an existing buffer without copying.
    ///
    /// The swap-style update: the buffer's capacity is kept as-is.
    pub fn from_owned(buf: Vec<u8>) -> Self {
        if buf.is_empty() {
            Value::Empty
        } else {
            Value::Far(buf)
        }
    }

    /// Reference shared bytes without taking ownership
    pub fn from_shared(data: Arc<[u8]>) -> Self {
        if data.is_empty() {
            Value::Empty
        } else {
            Value::Shared(data)
        }
    }

    /// Inline a 64-bit integer payload
    pub fn long(n: i64) -> Self {
        Value::from_bytes(&n.to_le_bytes())
    }

    /// Is there no data at all?
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Is the data inlined?
    pub fn is_near(&self) -> bool {
        matches!(self, Value::Near { .. })
    }

    /// Is the data in an owned heap buffer?
    pub fn is_far(&self) -> bool {
        matches!(self, Value::Far(_))
    }

    /// Data length in bytes (0 when absent)
    pub fn len(&self) -> usize {
        match self {
            Value::Empty => 0,
            Value::Near { len, .. } => *len as usize,
            Value::Far(buf) => buf.len(),
            Value::Shared(data) => data.len(),
        }
    }

    /// The data bytes, or `None` when absent
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Empty => None,
            Value::Near { len, bytes } => Some(&bytes[..*len as usize]),
            Value::Far(buf) => Some(buf),
            Value::Shared(data) => Some(data),
        }
    }

    /// Decode a payload written by [`Value::long`]
    pub fn as_long(&self) -> Option<i64> {
        let bytes = self.as_bytes()?;
        let arr: [u8; 8] = bytes.try_into().ok()?;
        Some(i64::from_le_bytes(arr))
    }

    /// Approximate heap + inline size of this payload in bytes
    ///
    /// Used for store size estimation; speed over accuracy.
    pub fn size_bytes(&self) -> usize {
        match self {
            Value::Empty => 0,
            Value::Near { .. } => NEAR_CAP,
            Value::Far(buf) => buf.capacity(),
            Value::Shared(_) => std::mem::size_of::<Arc<[u8]>>(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        // Payloads compare by content, not by storage class
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Value {}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "Value::Empty"),
            Value::Near { len, .. } => write!(f, "Value::Near({} bytes)", len),
            Value::Far(buf) => write!(f, "Value::Far({} bytes)", buf.len()),
            Value::Shared(data) => write!(f, "Value::Shared({} bytes)", data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_far_threshold() {
        let small = Value::from_bytes(&[1u8; NEAR_CAP]);
        assert!(small.is_near());
        assert_eq!(small.len(), NEAR_CAP);

        let big = Value::from_bytes(&[2u8; NEAR_CAP + 1]);
        assert!(big.is_far());
        assert_eq!(big.len(), NEAR_CAP + 1);
    }

    #[test]
    fn test_empty_is_absent() {
        assert!(Value::from_bytes(&[]).is_empty());
        assert_eq!(Value::Empty.as_bytes(), None);
        assert_eq!(Value::Empty.len(), 0);
    }

    #[test]
    fn test_long_round_trip() {
        for n in [0i64, 1, -1, i64::MIN, i64::MAX] {
            assert_eq!(Value::long(n).as_long(), Some(n));
        }
        // Wrong-width payloads don't decode
        assert_eq!(Value::from_bytes(b"abc").as_long(), None);
    }

    #[test]
    fn test_owned_keeps_buffer() {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(b"xy");
        let v = Value::from_owned(buf);
        // Small, but stays far: ownership transferred without copy
        assert!(v.is_far());
        assert_eq!(v.as_bytes(), Some(&b"xy"[..]));
        assert_eq!(v.size_bytes(), 64);
    }

    #[test]
    fn test_content_equality_across_storage() {
        let near = Value::from_bytes(b"same");
        let far = Value::from_owned(b"same".to_vec());
        let shared = Value::from_shared(Arc::from(&b"same"[..]));
        assert_eq!(near, far);
        assert_eq!(far, shared);
        assert_ne!(near, Value::from_bytes(b"other"));
    }
}
