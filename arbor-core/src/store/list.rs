//! Linked-list back-end
//!
//! Doubly linked via the records' intrusive `prev`/`next` fields. Head and
//! tail operations are O(1); positional and name lookup are O(n). A
//! name-sorted list maintains ascending order on insert, which lets lookups
//! stop as soon as the scan passes the target.

use std::cmp::Ordering;

use crate::arena::Rid;
use crate::error::{Error, Result};
use crate::record::Record;

use super::{rec, rec_mut, OrderFn, RecArena};

/// Linked-list back-end state: the end pointers
#[derive(Debug, Default)]
pub(crate) struct ListState {
    pub head: Option<Rid>,
    pub tail: Option<Rid>,
}

/// Link a record at the head or tail
pub(crate) fn append(recs: &mut RecArena, st: &mut ListState, rid: Rid, prepend: bool) {
    if prepend {
        let old = st.head;
        rec_mut(recs, rid).links.next = old;
        if let Some(h) = old {
            rec_mut(recs, h).links.prev = Some(rid);
        } else {
            st.tail = Some(rid);
        }
        st.head = Some(rid);
    } else {
        let old = st.tail;
        rec_mut(recs, rid).links.prev = old;
        if let Some(t) = old {
            rec_mut(recs, t).links.next = Some(rid);
        } else {
            st.head = Some(rid);
        }
        st.tail = Some(rid);
    }
}

/// Link a record keeping ascending order under `order`.
///
/// Scans from the head and stops at the first sibling that sorts above the
/// new record. An exact peer under `order` is rejected before any link is
/// touched.
pub(crate) fn insert_sorted(
    recs: &mut RecArena,
    st: &mut ListState,
    rid: Rid,
    order: OrderFn<'_>,
) -> Result<()> {
    let mut at = st.head;
    while let Some(cur) = at {
        match order(rec(recs, rid), rec(recs, cur)) {
            Ordering::Less => break,
            Ordering::Equal => return Err(Error::DuplicateEntry),
            Ordering::Greater => at = rec(recs, cur).links.next,
        }
    }
    insert_before(recs, st, at, rid);
    Ok(())
}

/// Link `rid` immediately before `at` (or at the tail when `at` is `None`)
fn insert_before(recs: &mut RecArena, st: &mut ListState, at: Option<Rid>, rid: Rid) {
    match at {
        None => append(recs, st, rid, false),
        Some(cur) => {
            let before = rec(recs, cur).links.prev;
            rec_mut(recs, rid).links.prev = before;
            rec_mut(recs, rid).links.next = Some(cur);
            rec_mut(recs, cur).links.prev = Some(rid);
            match before {
                Some(b) => rec_mut(recs, b).links.next = Some(rid),
                None => st.head = Some(rid),
            }
        }
    }
}

/// Unlink a record from wherever it sits
pub(crate) fn unlink(recs: &mut RecArena, st: &mut ListState, rid: Rid) {
    let links = rec(recs, rid).links;
    match links.prev {
        Some(p) => rec_mut(recs, p).links.next = links.next,
        None => st.head = links.next,
    }
    match links.next {
        Some(n) => rec_mut(recs, n).links.prev = links.prev,
        None => st.tail = links.prev,
    }
    rec_mut(recs, rid).links.clear();
}

/// Walk to the i-th record from the head
pub(crate) fn nth(recs: &RecArena, st: &ListState, pos: usize) -> Option<Rid> {
    let mut cur = st.head;
    for _ in 0..pos {
        cur = rec(recs, cur?).links.next;
    }
    cur
}

/// Early-exit search over a sorted list.
///
/// `probe` orders each record relative to the target; the scan stops as
/// soon as it passes the target's position.
pub(crate) fn find_sorted(
    recs: &RecArena,
    st: &ListState,
    probe: &dyn Fn(&Record) -> Ordering,
) -> Option<Rid> {
    let mut cur = st.head;
    while let Some(c) = cur {
        match probe(rec(recs, c)) {
            Ordering::Less => cur = rec(recs, c).links.next,
            Ordering::Equal => return Some(c),
            Ordering::Greater => return None,
        }
    }
    None
}
