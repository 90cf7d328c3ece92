//! Spatial tree variant
//!
//! A grid store runs the same balancing and search discipline as the
//! ordered tree; what it adds is the key. Coordinates are packed onto a
//! Z-order (Morton) curve so that records close in space stay close in the
//! tree's total order, which keeps range walks local without any
//! extent-aware branching in the structure itself.
//!
//! True multi-dimensional partitioning (branch-by-extent) is deferred until
//! a consumer needs it; a grid store behaves as an ordered tree over the
//! packed key.

use std::cmp::Ordering;

use crate::record::Record;

/// Interleave the low 32 bits of `x` and `y` onto a 64-bit Z-order key.
pub fn zorder2(x: u32, y: u32) -> u64 {
    spread2(x) | (spread2(y) << 1)
}

/// Interleave the low 21 bits of `x`, `y` and `z` onto a 63-bit Z-order key.
pub fn zorder3(x: u32, y: u32, z: u32) -> u64 {
    spread3(x) | (spread3(y) << 1) | (spread3(z) << 2)
}

/// Spread 32 bits out to even bit positions
fn spread2(v: u32) -> u64 {
    let mut x = v as u64;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Spread 21 bits out to every third bit position
fn spread3(v: u32) -> u64 {
    let mut x = (v as u64) & 0x1F_FFFF;
    x = (x | (x << 32)) & 0x1F00_0000_0000_FFFF;
    x = (x | (x << 16)) & 0x1F_0000_FF00_00FF;
    x = (x | (x << 8)) & 0x100F_00F0_0F00_F00F;
    x = (x | (x << 4)) & 0x10C3_0C30_C30C_30C3;
    x = (x | (x << 2)) & 0x1249_2492_4924_9249;
    x
}

/// The spatial key of a record: the leading 8 bytes of its value,
/// little-endian. Records without such a payload sort first.
pub fn zorder_key(record: &Record) -> Option<u64> {
    let bytes = record.value().as_bytes()?;
    let head: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(head))
}

/// Ready-made comparator for grid catalogs keyed by [`zorder_key`]
pub fn by_zorder(a: &Record, b: &Record) -> Ordering {
    zorder_key(a).cmp(&zorder_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;
    use crate::meta::Meta;
    use crate::value::Value;

    #[test]
    fn test_zorder2_interleaves() {
        assert_eq!(zorder2(0, 0), 0);
        assert_eq!(zorder2(1, 0), 0b01);
        assert_eq!(zorder2(0, 1), 0b10);
        assert_eq!(zorder2(3, 3), 0b1111);
        assert_eq!(zorder2(u32::MAX, u32::MAX), u64::MAX);
    }

    #[test]
    fn test_zorder3_interleaves() {
        assert_eq!(zorder3(1, 0, 0), 0b001);
        assert_eq!(zorder3(0, 1, 0), 0b010);
        assert_eq!(zorder3(0, 0, 1), 0b100);
        assert_eq!(zorder3(0x1F_FFFF, 0x1F_FFFF, 0x1F_FFFF), (1u64 << 63) - 1);
    }

    #[test]
    fn test_zorder_preserves_locality_order() {
        // Along one axis the curve is monotonic
        let keys: Vec<u64> = (0..16).map(|x| zorder2(x, 0)).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_by_zorder_on_records() {
        let rec_at = |x, y| {
            Record::new(
                Ident::AUTO,
                Meta::NONE,
                Value::long(zorder2(x, y) as i64),
            )
        };
        let a = rec_at(1, 1);
        let b = rec_at(2, 2);
        assert_eq!(by_zorder(&a, &b), Ordering::Less);

        // A record without a key sorts before keyed records
        let empty = Record::new(Ident::AUTO, Meta::NONE, Value::Empty);
        assert_eq!(by_zorder(&empty, &a), Ordering::Less);
    }
}
