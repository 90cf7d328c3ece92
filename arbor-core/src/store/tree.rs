//! Balanced ordered-tree back-end
//!
//! A red-black binary search tree threaded through the records' intrusive
//! links: `prev`/`next` double as left/right child pointers, `up` is the
//! parent link, `red` the node color. Insert, find and remove are O(log n).
//!
//! Invariants maintained: the root is black, a red node never has a red
//! child, and every path from a node down to its leaves crosses the same
//! number of black nodes.
//!
//! Removal transplants handles rather than copying payloads, so a record's
//! identity survives rebalancing untouched.

use std::cmp::Ordering;

use crate::arena::Rid;
use crate::error::{Error, Result};
use crate::record::Record;

use super::{rec, rec_mut, OrderFn, RecArena};

/// Tree back-end state: the root handle
#[derive(Debug, Default)]
pub(crate) struct TreeState {
    pub root: Option<Rid>,
}

// === Link accessors ===
// `None` is a leaf and is always black.

fn left(recs: &RecArena, r: Rid) -> Option<Rid> {
    rec(recs, r).links.prev
}

fn right(recs: &RecArena, r: Rid) -> Option<Rid> {
    rec(recs, r).links.next
}

fn up(recs: &RecArena, r: Rid) -> Option<Rid> {
    rec(recs, r).links.up
}

fn is_red(recs: &RecArena, r: Option<Rid>) -> bool {
    r.map(|r| rec(recs, r).links.red).unwrap_or(false)
}

fn set_left(recs: &mut RecArena, r: Rid, v: Option<Rid>) {
    rec_mut(recs, r).links.prev = v;
}

fn set_right(recs: &mut RecArena, r: Rid, v: Option<Rid>) {
    rec_mut(recs, r).links.next = v;
}

fn set_up(recs: &mut RecArena, r: Rid, v: Option<Rid>) {
    rec_mut(recs, r).links.up = v;
}

fn set_red(recs: &mut RecArena, r: Rid, red: bool) {
    rec_mut(recs, r).links.red = red;
}

/// Leftmost record of the subtree under `from`
pub(crate) fn min(recs: &RecArena, mut from: Rid) -> Rid {
    while let Some(l) = left(recs, from) {
        from = l;
    }
    from
}

/// Rightmost record of the subtree under `from`
pub(crate) fn max(recs: &RecArena, mut from: Rid) -> Rid {
    while let Some(r) = right(recs, from) {
        from = r;
    }
    from
}

/// In-order successor
pub(crate) fn successor(recs: &RecArena, r: Rid) -> Option<Rid> {
    if let Some(rt) = right(recs, r) {
        return Some(min(recs, rt));
    }
    let mut cur = r;
    let mut above = up(recs, cur);
    while let Some(p) = above {
        if right(recs, p) != Some(cur) {
            return Some(p);
        }
        cur = p;
        above = up(recs, p);
    }
    None
}

/// In-order predecessor
pub(crate) fn predecessor(recs: &RecArena, r: Rid) -> Option<Rid> {
    if let Some(lt) = left(recs, r) {
        return Some(max(recs, lt));
    }
    let mut cur = r;
    let mut above = up(recs, cur);
    while let Some(p) = above {
        if left(recs, p) != Some(cur) {
            return Some(p);
        }
        cur = p;
        above = up(recs, p);
    }
    None
}

/// Descend by `probe`, which orders each record relative to the target
pub(crate) fn find(
    recs: &RecArena,
    st: &TreeState,
    probe: &dyn Fn(&Record) -> Ordering,
) -> Option<Rid> {
    let mut cur = st.root;
    while let Some(c) = cur {
        cur = match probe(rec(recs, c)) {
            Ordering::Equal => return Some(c),
            Ordering::Less => right(recs, c),
            Ordering::Greater => left(recs, c),
        };
    }
    None
}

/// Insert maintaining ascending order under `order`.
///
/// An exact peer under `order` is rejected before any link is touched.
pub(crate) fn insert(
    recs: &mut RecArena,
    st: &mut TreeState,
    rid: Rid,
    order: OrderFn<'_>,
) -> Result<()> {
    // Phase 1: find the attachment point (read-only)
    let mut parent: Option<Rid> = None;
    let mut cur = st.root;
    let mut went_left = false;
    while let Some(c) = cur {
        parent = Some(c);
        match order(rec(recs, rid), rec(recs, c)) {
            Ordering::Equal => return Err(Error::DuplicateEntry),
            Ordering::Less => {
                went_left = true;
                cur = left(recs, c);
            }
            Ordering::Greater => {
                went_left = false;
                cur = right(recs, c);
            }
        }
    }

    // Phase 2: attach as a red leaf
    {
        let links = &mut rec_mut(recs, rid).links;
        links.clear();
        links.up = parent;
        links.red = true;
    }
    match parent {
        None => st.root = Some(rid),
        Some(p) => {
            if went_left {
                set_left(recs, p, Some(rid));
            } else {
                set_right(recs, p, Some(rid));
            }
        }
    }

    insert_fixup(recs, st, rid);
    Ok(())
}

fn rotate_left(recs: &mut RecArena, st: &mut TreeState, x: Rid) {
    let y = right(recs, x).expect("rotate_left requires a right child");
    let y_left = left(recs, y);
    set_right(recs, x, y_left);
    if let Some(l) = y_left {
        set_up(recs, l, Some(x));
    }
    let x_up = up(recs, x);
    set_up(recs, y, x_up);
    match x_up {
        None => st.root = Some(y),
        Some(p) => {
            if left(recs, p) == Some(x) {
                set_left(recs, p, Some(y));
            } else {
                set_right(recs, p, Some(y));
            }
        }
    }
    set_left(recs, y, Some(x));
    set_up(recs, x, Some(y));
}

fn rotate_right(recs: &mut RecArena, st: &mut TreeState, x: Rid) {
    let y = left(recs, x).expect("rotate_right requires a left child");
    let y_right = right(recs, y);
    set_left(recs, x, y_right);
    if let Some(r) = y_right {
        set_up(recs, r, Some(x));
    }
    let x_up = up(recs, x);
    set_up(recs, y, x_up);
    match x_up {
        None => st.root = Some(y),
        Some(p) => {
            if left(recs, p) == Some(x) {
                set_left(recs, p, Some(y));
            } else {
                set_right(recs, p, Some(y));
            }
        }
    }
    set_right(recs, y, Some(x));
    set_up(recs, x, Some(y));
}

fn insert_fixup(recs: &mut RecArena, st: &mut TreeState, mut z: Rid) {
    while let Some(p) = up(recs, z) {
        if !rec(recs, p).links.red {
            break;
        }
        // A red parent is never the root, so the grandparent exists
        let g = up(recs, p).expect("red node has a parent");
        if left(recs, g) == Some(p) {
            let uncle = right(recs, g);
            if is_red(recs, uncle) {
                set_red(recs, p, false);
                set_red(recs, uncle.expect("red uncle"), false);
                set_red(recs, g, true);
                z = g;
            } else {
                if right(recs, p) == Some(z) {
                    z = p;
                    rotate_left(recs, st, z);
                }
                let p = up(recs, z).expect("rotated child has a parent");
                let g = up(recs, p).expect("red node has a parent");
                set_red(recs, p, false);
                set_red(recs, g, true);
                rotate_right(recs, st, g);
            }
        } else {
            let uncle = left(recs, g);
            if is_red(recs, uncle) {
                set_red(recs, p, false);
                set_red(recs, uncle.expect("red uncle"), false);
                set_red(recs, g, true);
                z = g;
            } else {
                if left(recs, p) == Some(z) {
                    z = p;
                    rotate_right(recs, st, z);
                }
                let p = up(recs, z).expect("rotated child has a parent");
                let g = up(recs, p).expect("red node has a parent");
                set_red(recs, p, false);
                set_red(recs, g, true);
                rotate_left(recs, st, g);
            }
        }
    }
    if let Some(root) = st.root {
        set_red(recs, root, false);
    }
}

/// Replace the subtree rooted at `u` with the subtree rooted at `v`
fn transplant(recs: &mut RecArena, st: &mut TreeState, u: Rid, v: Option<Rid>) {
    match up(recs, u) {
        None => st.root = v,
        Some(p) => {
            if left(recs, p) == Some(u) {
                set_left(recs, p, v);
            } else {
                set_right(recs, p, v);
            }
        }
    }
    if let Some(v) = v {
        set_up(recs, v, up(recs, u));
    }
}

/// Detach a record, rebalancing as needed. The record's links are cleared.
pub(crate) fn remove(recs: &mut RecArena, st: &mut TreeState, z: Rid) {
    let mut fix_black = !rec(recs, z).links.red;
    let x: Option<Rid>;
    let x_parent: Option<Rid>;

    if left(recs, z).is_none() {
        x = right(recs, z);
        x_parent = up(recs, z);
        transplant(recs, st, z, x);
    } else if right(recs, z).is_none() {
        x = left(recs, z);
        x_parent = up(recs, z);
        transplant(recs, st, z, x);
    } else {
        // Two children: splice in the in-order successor by handle,
        // preserving both records' identities
        let y = min(recs, right(recs, z).expect("checked above"));
        fix_black = !rec(recs, y).links.red;
        x = right(recs, y);
        if up(recs, y) == Some(z) {
            x_parent = Some(y);
            if let Some(x) = x {
                set_up(recs, x, Some(y));
            }
        } else {
            x_parent = up(recs, y);
            transplant(recs, st, y, x);
            let z_right = right(recs, z).expect("checked above");
            set_right(recs, y, Some(z_right));
            set_up(recs, z_right, Some(y));
        }
        transplant(recs, st, z, Some(y));
        let z_left = left(recs, z).expect("checked above");
        set_left(recs, y, Some(z_left));
        set_up(recs, z_left, Some(y));
        let z_red = rec(recs, z).links.red;
        set_red(recs, y, z_red);
    }

    if fix_black {
        remove_fixup(recs, st, x, x_parent);
    }
    rec_mut(recs, z).links.clear();
}

fn remove_fixup(
    recs: &mut RecArena,
    st: &mut TreeState,
    mut x: Option<Rid>,
    mut xp: Option<Rid>,
) {
    while x != st.root && !is_red(recs, x) {
        let p = match xp {
            Some(p) => p,
            None => break,
        };
        if left(recs, p) == x {
            // Sibling exists: the path through x is one black short
            let mut w = right(recs, p).expect("black-height sibling");
            if rec(recs, w).links.red {
                set_red(recs, w, false);
                set_red(recs, p, true);
                rotate_left(recs, st, p);
                w = right(recs, p).expect("black-height sibling");
            }
            if !is_red(recs, left(recs, w)) && !is_red(recs, right(recs, w)) {
                set_red(recs, w, true);
                x = Some(p);
                xp = up(recs, p);
            } else {
                if !is_red(recs, right(recs, w)) {
                    let wl = left(recs, w).expect("red nephew");
                    set_red(recs, wl, false);
                    set_red(recs, w, true);
                    rotate_right(recs, st, w);
                    w = right(recs, p).expect("black-height sibling");
                }
                let p_red = rec(recs, p).links.red;
                set_red(recs, w, p_red);
                set_red(recs, p, false);
                if let Some(wr) = right(recs, w) {
                    set_red(recs, wr, false);
                }
                rotate_left(recs, st, p);
                x = st.root;
                xp = None;
            }
        } else {
            let mut w = left(recs, p).expect("black-height sibling");
            if rec(recs, w).links.red {
                set_red(recs, w, false);
                set_red(recs, p, true);
                rotate_right(recs, st, p);
                w = left(recs, p).expect("black-height sibling");
            }
            if !is_red(recs, left(recs, w)) && !is_red(recs, right(recs, w)) {
                set_red(recs, w, true);
                x = Some(p);
                xp = up(recs, p);
            } else {
                if !is_red(recs, left(recs, w)) {
                    let wr = right(recs, w).expect("red nephew");
                    set_red(recs, wr, false);
                    set_red(recs, w, true);
                    rotate_left(recs, st, w);
                    w = left(recs, p).expect("black-height sibling");
                }
                let p_red = rec(recs, p).links.red;
                set_red(recs, w, p_red);
                set_red(recs, p, false);
                if let Some(wl) = left(recs, w) {
                    set_red(recs, wl, false);
                }
                rotate_right(recs, st, p);
                x = st.root;
                xp = None;
            }
        }
    }
    if let Some(x) = x {
        set_red(recs, x, false);
    }
}
