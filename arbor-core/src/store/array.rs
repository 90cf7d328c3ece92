//! Dynamic-array back-end
//!
//! Contiguous handle storage with capacity separate from the live count;
//! geometric growth keeps append amortized O(1). Positional access is O(1),
//! insert/remove at an arbitrary position shifts the tail contiguously.
//! In sorted mode, name and key lookups binary-search.
//!
//! Growth relocates only the handle array, never the records themselves, so
//! a reallocation is invisible to everything holding record handles.

use std::cmp::Ordering;

use crate::arena::Rid;
use crate::error::{Error, Result};
use crate::record::Record;

use super::{rec, OrderFn, RecArena};

/// Array back-end state: the handle vector
#[derive(Debug, Default)]
pub(crate) struct ArrayState {
    pub slots: Vec<Rid>,
}

/// Place a record at the front or back
pub(crate) fn append(st: &mut ArrayState, rid: Rid, prepend: bool) {
    if prepend {
        st.slots.insert(0, rid);
    } else {
        st.slots.push(rid);
    }
}

/// Place a record keeping ascending order under `order`.
///
/// Binary-searches the insertion point; an exact peer is rejected before
/// the array is touched.
pub(crate) fn insert_sorted(
    recs: &RecArena,
    st: &mut ArrayState,
    rid: Rid,
    order: OrderFn<'_>,
) -> Result<()> {
    let new = rec(recs, rid);
    match st.slots.binary_search_by(|&r| order(rec(recs, r), new)) {
        Ok(_) => Err(Error::DuplicateEntry),
        Err(pos) => {
            st.slots.insert(pos, rid);
            Ok(())
        }
    }
}

/// Remove a record, shifting the tail down. O(n) to locate.
pub(crate) fn remove(st: &mut ArrayState, rid: Rid) -> Result<()> {
    match st.slots.iter().position(|&r| r == rid) {
        Some(pos) => {
            st.slots.remove(pos);
            Ok(())
        }
        None => Err(Error::not_attached(format!("record {rid}"))),
    }
}

/// Binary search over a sorted array.
///
/// `probe` orders each record relative to the target.
pub(crate) fn find_sorted(
    recs: &RecArena,
    st: &ArrayState,
    probe: &dyn Fn(&Record) -> Ordering,
) -> Option<Rid> {
    st.slots
        .binary_search_by(|&r| probe(rec(recs, r)))
        .ok()
        .map(|pos| st.slots[pos])
}
