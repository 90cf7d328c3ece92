//! Store - the child-collection facade
//!
//! A store is the shared state of one record's children: a back-end kind, an
//! ordering discipline, bookkeeping (child count, auto-id counter), and the
//! back-end's own structural state. Every generic operation dispatches on
//! the kind tag; the semantics are identical across back-ends, only the
//! asymptotics differ.
//!
//! | Kind  | Structure            | Strengths                           |
//! |-------|----------------------|-------------------------------------|
//! | List  | doubly-linked        | O(1) end ops, cheap arbitrary remove|
//! | Array | contiguous handles   | O(1) positional access              |
//! | Queue | fixed-size chunks    | FIFO without per-element allocation |
//! | Tree  | red-black tree       | O(log n) sorted insert/find/remove  |
//! | Grid  | red-black tree       | Z-order spatial keys                |
//!
//! ## Ordering disciplines
//!
//! - `Sequence`: insertion order, duplicates permitted
//! - `Dictionary`: ascending unique identifiers
//! - `Catalog`: ascending under a user comparator, exact peers rejected
//! - `HashedCatalog`: ascending under a user hash, comparator on ties

mod array;
mod list;
mod queue;
mod tree;

pub mod grid;

pub use self::queue::CHUNK_CAP;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Rid};
use crate::error::{Error, Result};
use crate::ident::{Ident, VALUE_MAX};
use crate::record::Record;

use self::array::ArrayState;
use self::list::ListState;
use self::queue::QueueState;
use self::tree::TreeState;

/// The record arena, as every back-end sees it
pub(crate) type RecArena = Arena<Record>;

/// Comparator for catalog stores
pub type Compare = fn(&Record, &Record) -> Ordering;

/// Hash function for hashed-catalog stores
pub type HashFn = fn(&Record) -> u64;

/// Internal ordering closure handed to back-ends
pub(crate) type OrderFn<'a> = &'a dyn Fn(&Record, &Record) -> Ordering;

/// Fetch a record the store holds a handle to.
///
/// Store-held handles are live by construction; a stale one means the
/// structure has been corrupted, which is a fatal contract violation.
pub(crate) fn rec(recs: &RecArena, rid: Rid) -> &Record {
    recs.get(rid).expect("store child handle is live")
}

pub(crate) fn rec_mut(recs: &mut RecArena, rid: Rid) -> &mut Record {
    recs.get_mut(rid).expect("store child handle is live")
}

/// Back-end kind enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    /// Doubly-linked list
    List,
    /// Growable contiguous array
    Array,
    /// Packed chunk queue
    Queue,
    /// Balanced ordered tree
    Tree,
    /// Spatial tree variant
    Grid,
}

impl StoreKind {
    /// Get all store kinds
    pub fn all() -> &'static [StoreKind] {
        &[
            StoreKind::List,
            StoreKind::Array,
            StoreKind::Queue,
            StoreKind::Tree,
            StoreKind::Grid,
        ]
    }

    /// Get the short name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            StoreKind::List => "list",
            StoreKind::Array => "array",
            StoreKind::Queue => "queue",
            StoreKind::Tree => "tree",
            StoreKind::Grid => "grid",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(StoreKind::List),
            "array" => Ok(StoreKind::Array),
            "queue" => Ok(StoreKind::Queue),
            "tree" => Ok(StoreKind::Tree),
            "grid" => Ok(StoreKind::Grid),
            _ => Err(format!("Unknown store kind: {}", s)),
        }
    }
}

/// Ordering discipline of a store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    /// Insertion order; duplicate names permitted
    Sequence,
    /// Ascending unique names
    Dictionary,
    /// Ascending under a user comparator
    Catalog,
    /// Ascending under a user hash, comparator on ties
    HashedCatalog,
}

impl Discipline {
    /// Get the short name of this discipline
    pub fn name(&self) -> &'static str {
        match self {
            Discipline::Sequence => "sequence",
            Discipline::Dictionary => "dictionary",
            Discipline::Catalog => "catalog",
            Discipline::HashedCatalog => "hashed-catalog",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Back-end structural state, selected at store creation
enum Backend {
    List(ListState),
    Array(ArrayState),
    Queue(QueueState),
    /// Shared by the Tree and Grid kinds
    Tree(TreeState),
}

/// One visit during a traversal
///
/// The callback sees the record, its immediate neighbors in store order,
/// and its 0-based position. The final sentinel visit carries `rec: None`,
/// `next: None` and `pos` equal to the child count so callers can flush
/// per-traversal state.
pub struct Visit<'a> {
    /// The visited record, `None` on the end-of-store sentinel
    pub rec: Option<(Rid, &'a Record)>,
    /// The previous record in store order
    pub prev: Option<Rid>,
    /// The next record in store order
    pub next: Option<Rid>,
    /// 0-based position of the visited record
    pub pos: usize,
}

/// Child-collection state owned by exactly one record
pub struct Store {
    pub(crate) kind: StoreKind,
    pub(crate) discipline: Discipline,
    pub(crate) owner: Rid,
    pub(crate) count: usize,
    pub(crate) auto_id: u64,
    pub(crate) compare: Option<Compare>,
    pub(crate) hash: Option<HashFn>,
    pub(crate) sealed: bool,
    backend: Backend,
}

fn ident_order(a: &Record, b: &Record) -> Ordering {
    a.ident().cmp(&b.ident())
}

impl Store {
    /// Build a store, validating the kind/discipline pairing:
    /// queues are insertion-ordered only, trees are sorted only, and
    /// catalogs need their comparator (and hash, when hashed).
    pub(crate) fn new(
        kind: StoreKind,
        discipline: Discipline,
        owner: Rid,
        compare: Option<Compare>,
        hash: Option<HashFn>,
    ) -> Result<Self> {
        match (kind, discipline) {
            (StoreKind::Queue, d) if d != Discipline::Sequence => {
                return Err(Error::Unsupported {
                    kind,
                    op: "sorted discipline",
                })
            }
            (StoreKind::Tree | StoreKind::Grid, Discipline::Sequence) => {
                return Err(Error::Unsupported {
                    kind,
                    op: "insertion ordering",
                })
            }
            _ => {}
        }
        if matches!(discipline, Discipline::Catalog | Discipline::HashedCatalog)
            && compare.is_none()
        {
            return Err(Error::Config(format!(
                "{discipline} store requires a comparator"
            )));
        }
        if discipline == Discipline::HashedCatalog && hash.is_none() {
            return Err(Error::Config(
                "hashed-catalog store requires a hash function".into(),
            ));
        }

        let backend = match kind {
            StoreKind::List => Backend::List(ListState::default()),
            StoreKind::Array => Backend::Array(ArrayState::default()),
            StoreKind::Queue => Backend::Queue(QueueState::default()),
            StoreKind::Tree | StoreKind::Grid => Backend::Tree(TreeState::default()),
        };
        Ok(Store {
            kind,
            discipline,
            owner,
            count: 0,
            auto_id: 0,
            compare,
            hash,
            sealed: false,
            backend,
        })
    }

    // === Predicates & bookkeeping ===

    /// The back-end kind
    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// The ordering discipline
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// The record owning this store
    pub fn owner(&self) -> Rid {
        self.owner
    }

    /// Number of live children
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Children keep insertion order
    pub fn is_insertion_ordered(&self) -> bool {
        self.discipline == Discipline::Sequence
    }

    /// Children have unique names (dictionary)
    pub fn is_name_unique(&self) -> bool {
        self.discipline == Discipline::Dictionary
    }

    /// Children are ordered by a user comparator
    pub fn is_comparator_sorted(&self) -> bool {
        matches!(
            self.discipline,
            Discipline::Catalog | Discipline::HashedCatalog
        )
    }

    /// Children are in any non-insertion order
    pub fn is_sorted(&self) -> bool {
        self.discipline != Discipline::Sequence
    }

    /// Is the store flagged immutable?
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The next identifier the auto counter would assign
    pub fn auto_id(&self) -> u64 {
        self.auto_id
    }

    fn check_mutable(&self) -> Result<()> {
        if self.sealed {
            Err(Error::Sealed)
        } else {
            Ok(())
        }
    }

    /// Consume and return the next auto identifier
    pub(crate) fn next_auto_ident(&mut self) -> Result<Ident> {
        let ident = Ident::serial(self.auto_id)
            .ok_or_else(|| Error::auto_id("counter reached the reserved maximum"))?;
        self.auto_id += 1;
        Ok(ident)
    }

    pub(crate) fn rollback_auto_ident(&mut self) {
        self.auto_id -= 1;
    }

    /// Move the auto-id counter forward. Moving it backwards or to the
    /// reserved maximum is a contract error.
    pub(crate) fn set_auto_id(&mut self, id: u64) -> Result<()> {
        if id < self.auto_id {
            return Err(Error::auto_id(format!(
                "counter may only move forward ({} -> {id})",
                self.auto_id
            )));
        }
        if id >= VALUE_MAX {
            return Err(Error::auto_id("counter beyond the reserved maximum"));
        }
        self.auto_id = id;
        Ok(())
    }

    // === Mutation ===

    /// Insert a child. Sorted stores ignore `prepend` and keep their
    /// order; sequence stores append or prepend.
    pub(crate) fn insert(&mut self, recs: &mut RecArena, rid: Rid, prepend: bool) -> Result<()> {
        self.check_mutable()?;
        if self.is_sorted() {
            return self.insert_ordered(recs, rid, None);
        }
        match &mut self.backend {
            Backend::List(st) => list::append(recs, st, rid, prepend),
            Backend::Array(st) => array::append(st, rid, prepend),
            Backend::Queue(st) => st.push(rid, prepend),
            Backend::Tree(_) => {
                return Err(Error::Unsupported {
                    kind: self.kind,
                    op: "unordered insert",
                })
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Insert maintaining ascending order.
    ///
    /// Uses the store's own ordering; a sequence store may be given a
    /// one-off comparator via `override_cmp`.
    pub(crate) fn insert_sorted(
        &mut self,
        recs: &mut RecArena,
        rid: Rid,
        override_cmp: Option<Compare>,
    ) -> Result<()> {
        self.check_mutable()?;
        self.insert_ordered(recs, rid, override_cmp)
    }

    fn insert_ordered(
        &mut self,
        recs: &mut RecArena,
        rid: Rid,
        override_cmp: Option<Compare>,
    ) -> Result<()> {
        let cmp: Compare = match self.discipline {
            Discipline::Dictionary => ident_order,
            _ => override_cmp.or(self.compare).ok_or_else(|| {
                Error::Config("ordered insert on a sequence store requires a comparator".into())
            })?,
        };
        let hash = if self.discipline == Discipline::HashedCatalog {
            self.hash
        } else {
            None
        };
        let order = move |a: &Record, b: &Record| {
            let by_hash = hash
                .map(|h| h(a).cmp(&h(b)))
                .unwrap_or(Ordering::Equal);
            by_hash.then_with(|| cmp(a, b))
        };

        let dictionary = self.is_name_unique();
        let res = match &mut self.backend {
            Backend::List(st) => list::insert_sorted(recs, st, rid, &order),
            Backend::Array(st) => array::insert_sorted(recs, st, rid, &order),
            Backend::Tree(st) => tree::insert(recs, st, rid, &order),
            Backend::Queue(_) => Err(Error::Unsupported {
                kind: self.kind,
                op: "sorted insert",
            }),
        };
        match res {
            Ok(()) => {
                self.count += 1;
                Ok(())
            }
            Err(Error::DuplicateEntry) if dictionary => {
                Err(Error::DuplicateName(rec(recs, rid).ident()))
            }
            Err(e) => Err(e),
        }
    }

    /// Detach an arbitrary child. The queue permits head/tail only.
    pub(crate) fn remove(&mut self, recs: &mut RecArena, rid: Rid) -> Result<()> {
        self.check_mutable()?;
        match &mut self.backend {
            Backend::List(st) => {
                list::unlink(recs, st, rid);
                Ok(())
            }
            Backend::Array(st) => array::remove(st, rid),
            Backend::Queue(st) => st.remove(rid),
            Backend::Tree(st) => {
                tree::remove(recs, st, rid);
                Ok(())
            }
        }
        .map(|()| self.count -= 1)
    }

    /// Remove and return the first or last child
    pub(crate) fn take(&mut self, recs: &mut RecArena, last: bool) -> Result<Option<Rid>> {
        self.check_mutable()?;
        let rid = match &mut self.backend {
            Backend::List(st) => {
                let r = if last { st.tail } else { st.head };
                if let Some(r) = r {
                    list::unlink(recs, st, r);
                }
                r
            }
            Backend::Array(st) => {
                if last {
                    st.slots.pop()
                } else if st.slots.is_empty() {
                    None
                } else {
                    Some(st.slots.remove(0))
                }
            }
            Backend::Queue(st) => {
                if last {
                    st.pop_back()
                } else {
                    st.pop_front()
                }
            }
            Backend::Tree(st) => {
                let r = st
                    .root
                    .map(|root| if last { tree::max(recs, root) } else { tree::min(recs, root) });
                if let Some(r) = r {
                    tree::remove(recs, st, r);
                }
                r
            }
        };
        if rid.is_some() {
            self.count -= 1;
        }
        Ok(rid)
    }

    /// Re-order a sequence store by `compare`. Sorted stores already hold
    /// their order and are left untouched; the queue cannot reorder.
    pub(crate) fn sort(&mut self, recs: &mut RecArena, compare: Compare) -> Result<()> {
        self.check_mutable()?;
        if self.is_sorted() {
            return Ok(());
        }
        match &mut self.backend {
            Backend::Array(st) => {
                let recs = &*recs;
                st.slots
                    .sort_by(|&a, &b| compare(rec(recs, a), rec(recs, b)));
                Ok(())
            }
            Backend::List(st) => {
                let mut order: Vec<Rid> = Vec::with_capacity(self.count);
                let mut cur = st.head;
                while let Some(c) = cur {
                    order.push(c);
                    cur = rec(recs, c).links.next;
                }
                order.sort_by(|&a, &b| compare(rec(recs, a), rec(recs, b)));
                st.head = None;
                st.tail = None;
                for &r in &order {
                    rec_mut(recs, r).links.clear();
                    list::append(recs, st, r, false);
                }
                Ok(())
            }
            Backend::Queue(_) => Err(Error::Unsupported {
                kind: self.kind,
                op: "sort",
            }),
            Backend::Tree(_) => Ok(()),
        }
    }

    // === Query ===

    /// First child in store order
    pub(crate) fn first(&self, recs: &RecArena) -> Option<Rid> {
        match &self.backend {
            Backend::List(st) => st.head,
            Backend::Array(st) => st.slots.first().copied(),
            Backend::Queue(st) => st.front(),
            Backend::Tree(st) => st.root.map(|r| tree::min(recs, r)),
        }
    }

    /// Last child in store order
    pub(crate) fn last(&self, recs: &RecArena) -> Option<Rid> {
        match &self.backend {
            Backend::List(st) => st.tail,
            Backend::Array(st) => st.slots.last().copied(),
            Backend::Queue(st) => st.back(),
            Backend::Tree(st) => st.root.map(|r| tree::max(recs, r)),
        }
    }

    /// Neighbor after `rid` in store order
    pub(crate) fn next_of(&self, recs: &RecArena, rid: Rid) -> Option<Rid> {
        match &self.backend {
            Backend::List(_) => rec(recs, rid).links.next,
            Backend::Tree(_) => tree::successor(recs, rid),
            _ => {
                let pos = self.position_of(recs, rid)?;
                self.nth(recs, pos + 1)
            }
        }
    }

    /// Neighbor before `rid` in store order
    pub(crate) fn prev_of(&self, recs: &RecArena, rid: Rid) -> Option<Rid> {
        match &self.backend {
            Backend::List(_) => rec(recs, rid).links.prev,
            Backend::Tree(_) => tree::predecessor(recs, rid),
            _ => {
                let pos = self.position_of(recs, rid)?;
                pos.checked_sub(1).and_then(|p| self.nth(recs, p))
            }
        }
    }

    /// Child at 0-based position
    pub(crate) fn nth(&self, recs: &RecArena, pos: usize) -> Option<Rid> {
        match &self.backend {
            Backend::List(st) => list::nth(recs, st, pos),
            Backend::Array(st) => st.slots.get(pos).copied(),
            Backend::Queue(st) => st.nth(pos),
            Backend::Tree(st) => {
                let mut cur = st.root.map(|r| tree::min(recs, r));
                for _ in 0..pos {
                    cur = tree::successor(recs, cur?);
                }
                cur
            }
        }
    }

    fn position_of(&self, recs: &RecArena, rid: Rid) -> Option<usize> {
        self.iter(recs).position(|r| r == rid)
    }

    /// Look a child up by name.
    ///
    /// Dictionary stores search natively (binary/tree search, or the
    /// early-exit scan on a sorted list); everything else scans.
    pub(crate) fn find_by_name(&self, recs: &RecArena, ident: Ident) -> Option<Rid> {
        if self.is_name_unique() {
            let probe = |r: &Record| r.ident().cmp(&ident);
            match &self.backend {
                Backend::List(st) => list::find_sorted(recs, st, &probe),
                Backend::Array(st) => array::find_sorted(recs, st, &probe),
                Backend::Tree(st) => tree::find(recs, st, &probe),
                Backend::Queue(_) => None,
            }
        } else {
            self.iter(recs).find(|&r| rec(recs, r).ident() == ident)
        }
    }

    /// Look a child up by key.
    ///
    /// `probe` orders each record relative to the target. On a
    /// comparator-sorted store the probe must agree with the store's
    /// ordering, which enables the native search; elsewhere it only needs
    /// to recognize equality.
    pub(crate) fn find_by_key(
        &self,
        recs: &RecArena,
        probe: &dyn Fn(&Record) -> Ordering,
    ) -> Option<Rid> {
        if self.is_comparator_sorted() {
            match &self.backend {
                Backend::List(st) => list::find_sorted(recs, st, probe),
                Backend::Array(st) => array::find_sorted(recs, st, probe),
                Backend::Tree(st) => tree::find(recs, st, probe),
                Backend::Queue(_) => None,
            }
        } else {
            self.iter(recs)
                .find(|&r| probe(rec(recs, r)) == Ordering::Equal)
        }
    }

    /// Iterate child handles in store order
    pub(crate) fn iter<'a>(&'a self, recs: &'a RecArena) -> StoreIter<'a> {
        match &self.backend {
            Backend::List(st) => StoreIter::Linked {
                recs,
                cur: st.head,
            },
            Backend::Array(st) => StoreIter::Slice(st.slots.iter()),
            Backend::Queue(st) => StoreIter::Chunked {
                state: st,
                pos: 0,
                len: self.count,
            },
            Backend::Tree(st) => StoreIter::Ordered {
                recs,
                cur: st.root.map(|r| tree::min(recs, r)),
            },
        }
    }

    /// All child handles in store order
    pub(crate) fn collect_rids(&self, recs: &RecArena) -> Vec<Rid> {
        self.iter(recs).collect()
    }

    /// Empty the store structurally and hand back what it held.
    ///
    /// The caller owns releasing the returned records; bookkeeping other
    /// than the child count (auto-id, seal, comparator) is untouched.
    pub(crate) fn drain(&mut self, recs: &RecArena) -> Vec<Rid> {
        let rids = self.collect_rids(recs);
        self.backend = match self.kind {
            StoreKind::List => Backend::List(ListState::default()),
            StoreKind::Array => Backend::Array(ArrayState::default()),
            StoreKind::Queue => Backend::Queue(QueueState::default()),
            StoreKind::Tree | StoreKind::Grid => Backend::Tree(TreeState::default()),
        };
        self.count = 0;
        rids
    }

    /// Visit every child in store order.
    ///
    /// Stops early when the callback returns `false`; otherwise ends with
    /// the sentinel visit (see [`Visit`]).
    pub(crate) fn traverse(&self, recs: &RecArena, mut f: impl FnMut(&Visit<'_>) -> bool) {
        let mut iter = self.iter(recs);
        let mut prev: Option<Rid> = None;
        let mut cur = iter.next();
        let mut pos = 0usize;
        while let Some(c) = cur {
            let next = iter.next();
            let visit = Visit {
                rec: Some((c, rec(recs, c))),
                prev,
                next,
                pos,
            };
            if !f(&visit) {
                return;
            }
            prev = Some(c);
            cur = next;
            pos += 1;
        }
        f(&Visit {
            rec: None,
            prev,
            next: None,
            pos,
        });
    }
}

/// Per-back-end child cursor
pub(crate) enum StoreIter<'a> {
    Linked {
        recs: &'a RecArena,
        cur: Option<Rid>,
    },
    Slice(std::slice::Iter<'a, Rid>),
    Chunked {
        state: &'a QueueState,
        pos: usize,
        len: usize,
    },
    Ordered {
        recs: &'a RecArena,
        cur: Option<Rid>,
    },
}

impl Iterator for StoreIter<'_> {
    type Item = Rid;

    fn next(&mut self) -> Option<Rid> {
        match self {
            StoreIter::Linked { recs, cur } => {
                let c = (*cur)?;
                *cur = rec(recs, c).links.next;
                Some(c)
            }
            StoreIter::Slice(iter) => iter.next().copied(),
            StoreIter::Chunked { state, pos, len } => {
                if pos >= len {
                    return None;
                }
                let r = state.nth(*pos);
                *pos += 1;
                r
            }
            StoreIter::Ordered { recs, cur } => {
                let c = (*cur)?;
                *cur = tree::successor(recs, c);
                Some(c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Meta;
    use crate::value::Value;

    fn rid(recs: &mut RecArena, n: u64) -> Rid {
        recs.alloc(Record::new(
            Ident::serial(n).unwrap(),
            Meta::NONE,
            Value::long(n as i64 * 10),
        ))
    }

    fn new_store(kind: StoreKind, discipline: Discipline, recs: &mut RecArena) -> Store {
        let owner = rid(recs, 999_999);
        Store::new(kind, discipline, owner, None, None).unwrap()
    }

    #[test]
    fn test_kind_name_round_trip() {
        for kind in StoreKind::all() {
            assert_eq!(kind.name().parse::<StoreKind>().unwrap(), *kind);
        }
        assert!("octopus".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_invalid_pairings_rejected() {
        let mut recs: RecArena = Arena::new();
        let owner = rid(&mut recs, 1);
        assert!(Store::new(StoreKind::Queue, Discipline::Dictionary, owner, None, None).is_err());
        assert!(Store::new(StoreKind::Tree, Discipline::Sequence, owner, None, None).is_err());
        assert!(Store::new(StoreKind::Array, Discipline::Catalog, owner, None, None).is_err());
        assert!(Store::new(
            StoreKind::Tree,
            Discipline::HashedCatalog,
            owner,
            Some(ident_order),
            None
        )
        .is_err());
    }

    #[test]
    fn test_count_tracks_traversal_every_kind() {
        for &kind in StoreKind::all() {
            let mut recs: RecArena = Arena::new();
            let discipline = match kind {
                StoreKind::Tree | StoreKind::Grid => Discipline::Dictionary,
                _ => Discipline::Sequence,
            };
            let mut store = new_store(kind, discipline, &mut recs);
            for n in 0..10 {
                let r = rid(&mut recs, n);
                if store.is_sorted() {
                    store.insert_sorted(&mut recs, r, None).unwrap();
                } else {
                    store.insert(&mut recs, r, false).unwrap();
                }
            }
            assert_eq!(store.len(), 10, "{kind}");
            assert_eq!(store.collect_rids(&recs).len(), 10, "{kind}");

            store.take(&mut recs, false).unwrap();
            store.take(&mut recs, true).unwrap();
            assert_eq!(store.len(), 8, "{kind}");
            assert_eq!(store.collect_rids(&recs).len(), 8, "{kind}");
        }
    }

    #[test]
    fn test_traverse_neighbors_and_sentinel() {
        let mut recs: RecArena = Arena::new();
        let mut store = new_store(StoreKind::List, Discipline::Sequence, &mut recs);
        let handles: Vec<Rid> = (0..3)
            .map(|n| {
                let r = rid(&mut recs, n);
                store.insert(&mut recs, r, false).unwrap();
                r
            })
            .collect();

        let mut seen = Vec::new();
        let mut sentinel = false;
        store.traverse(&recs, |v| {
            match v.rec {
                Some((r, _)) => {
                    seen.push((r, v.prev, v.next, v.pos));
                }
                None => {
                    sentinel = true;
                    assert_eq!(v.next, None);
                    assert_eq!(v.prev, Some(handles[2]));
                    assert_eq!(v.pos, 3);
                }
            }
            true
        });
        assert!(sentinel);
        assert_eq!(
            seen,
            vec![
                (handles[0], None, Some(handles[1]), 0),
                (handles[1], Some(handles[0]), Some(handles[2]), 1),
                (handles[2], Some(handles[1]), None, 2),
            ]
        );
    }

    #[test]
    fn test_traverse_early_exit_skips_sentinel() {
        let mut recs: RecArena = Arena::new();
        let mut store = new_store(StoreKind::Array, Discipline::Sequence, &mut recs);
        for n in 0..5 {
            let r = rid(&mut recs, n);
            store.insert(&mut recs, r, false).unwrap();
        }
        let mut visited = 0;
        store.traverse(&recs, |v| {
            assert!(v.rec.is_some());
            visited += 1;
            visited < 2
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_sequence_find_by_name_permits_duplicates() {
        let mut recs: RecArena = Arena::new();
        let mut store = new_store(StoreKind::List, Discipline::Sequence, &mut recs);
        let a = rid(&mut recs, 7);
        let b = rid(&mut recs, 7);
        store.insert(&mut recs, a, false).unwrap();
        store.insert(&mut recs, b, false).unwrap();

        // First match in store order
        let ident = Ident::serial(7).unwrap();
        assert_eq!(store.find_by_name(&recs, ident), Some(a));
        assert_eq!(store.next_of(&recs, a), Some(b));
    }

    #[test]
    fn test_sealed_store_rejects_mutation() {
        let mut recs: RecArena = Arena::new();
        let mut store = new_store(StoreKind::Array, Discipline::Sequence, &mut recs);
        let a = rid(&mut recs, 1);
        store.insert(&mut recs, a, false).unwrap();
        store.sealed = true;

        let b = rid(&mut recs, 2);
        assert_eq!(store.insert(&mut recs, b, false), Err(Error::Sealed));
        assert_eq!(store.take(&mut recs, false), Err(Error::Sealed));
        assert_eq!(store.remove(&mut recs, a), Err(Error::Sealed));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sort_sequence_store() {
        let mut recs: RecArena = Arena::new();
        for kind in [StoreKind::List, StoreKind::Array] {
            let mut store = new_store(kind, Discipline::Sequence, &mut recs);
            for n in [3, 1, 2] {
                let r = rid(&mut recs, n);
                store.insert(&mut recs, r, false).unwrap();
            }
            store.sort(&mut recs, ident_order).unwrap();
            let names: Vec<u64> = store
                .collect_rids(&recs)
                .iter()
                .map(|&r| rec(&recs, r).ident().value())
                .collect();
            assert_eq!(names, vec![1, 2, 3], "{kind}");
        }

        let mut store = new_store(StoreKind::Queue, Discipline::Sequence, &mut recs);
        assert!(matches!(
            store.sort(&mut recs, ident_order),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_auto_id_monotonic() {
        let mut recs: RecArena = Arena::new();
        let mut store = new_store(StoreKind::List, Discipline::Sequence, &mut recs);
        assert_eq!(store.next_auto_ident().unwrap().value(), 0);
        assert_eq!(store.next_auto_ident().unwrap().value(), 1);

        store.set_auto_id(100).unwrap();
        assert_eq!(store.next_auto_ident().unwrap().value(), 100);

        // Backwards movement is a contract error
        assert!(store.set_auto_id(5).is_err());
        assert!(store.set_auto_id(VALUE_MAX).is_err());
    }

    #[test]
    fn test_hashed_catalog_orders_by_hash_then_compare() {
        fn by_value(a: &Record, b: &Record) -> Ordering {
            a.value().as_long().cmp(&b.value().as_long())
        }
        fn bucket(r: &Record) -> u64 {
            // Two buckets: even and odd names
            r.ident().value() % 2
        }

        let mut recs: RecArena = Arena::new();
        let owner = rid(&mut recs, 999_999);
        let mut store = Store::new(
            StoreKind::Tree,
            Discipline::HashedCatalog,
            owner,
            Some(by_value),
            Some(bucket),
        )
        .unwrap();

        for n in [1, 2, 3, 4] {
            let r = rid(&mut recs, n);
            store.insert_sorted(&mut recs, r, None).unwrap();
        }
        let names: Vec<u64> = store
            .collect_rids(&recs)
            .iter()
            .map(|&r| rec(&recs, r).ident().value())
            .collect();
        // Evens (bucket 0) before odds (bucket 1), by value within a bucket
        assert_eq!(names, vec![2, 4, 1, 3]);
    }
}
