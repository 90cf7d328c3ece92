//! System - the owning aggregate
//!
//! A `System` owns everything: the record arena, the store arena, the link
//! registry, the interned text pool, and the root record. All operations go
//! through it, so the single-threaded discipline of the engine is explicit
//! in the borrow: every mutation takes `&mut System`.
//!
//! No operation suspends or blocks, and none is internally synchronized;
//! callers mutating one system from several threads must serialize
//! externally.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::arena::{Arena, Rid, StoreId};
use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::links::LinkRegistry;
use crate::record::{Record, RecordSpec};
use crate::store::{rec, Compare, Discipline, Store, StoreKind, Visit};
use crate::text::TextPool;
use crate::value::Value;

/// Process-wide record store: arenas, registry, text pool and root
pub struct System {
    pub(crate) recs: Arena<Record>,
    pub(crate) stores: Arena<Store>,
    pub(crate) links: LinkRegistry,
    text: TextPool,
    root: Rid,
}

impl System {
    /// Set up a system with its root record.
    ///
    /// The root owns a dictionary tree store, so top-level names are unique
    /// and ordered.
    pub fn initiate() -> Self {
        let mut recs = Arena::new();
        let mut stores = Arena::new();
        let root = recs.alloc(Record::new(
            Ident::word("root").expect("static root name"),
            crate::meta::Meta::NONE,
            Value::Empty,
        ));
        let store = Store::new(StoreKind::Tree, Discipline::Dictionary, root, None, None)
            .expect("root store configuration is static");
        let sid = stores.alloc(store);
        recs.get_mut(root).expect("root just allocated").kids = Some(sid);

        debug!("record system initiated");
        System {
            recs,
            stores,
            links: LinkRegistry::new(),
            text: TextPool::new(),
            root,
        }
    }

    /// Tear the whole tree down and consume the system
    pub fn shutdown(mut self) {
        let root = self.root;
        self.teardown(root);
        debug!("record system shut down");
    }

    /// The root record
    pub fn root(&self) -> Rid {
        self.root
    }

    /// The interned text pool backing `Text` idents
    pub fn text(&self) -> &TextPool {
        &self.text
    }

    /// Intern a name and wrap it as a `Text` ident
    pub fn text_ident(&self, name: &str) -> Result<Ident> {
        let code = self.text.intern(name);
        Ident::text_ref(code)
            .ok_or_else(|| Error::invalid_ident(format!("text pool code {code} overflows")))
    }

    // === Internal handle plumbing ===

    fn rec_ref(&self, rid: Rid) -> Result<&Record> {
        self.recs
            .get(rid)
            .ok_or_else(|| Error::stale(format!("record {rid}")))
    }

    fn rec_mut(&mut self, rid: Rid) -> Result<&mut Record> {
        self.recs
            .get_mut(rid)
            .ok_or_else(|| Error::stale(format!("record {rid}")))
    }

    fn child_store_id(&self, parent: Rid) -> Result<StoreId> {
        self.rec_ref(parent)?
            .kids
            .ok_or_else(|| Error::no_child_store(format!("record {parent}")))
    }

    // === Record lifecycle ===

    /// Create a detached record from a spec.
    ///
    /// The record floats until attached; only attached records are
    /// reachable by path.
    pub fn create(&mut self, spec: RecordSpec) -> Result<Rid> {
        let rid = self
            .recs
            .alloc(Record::new(spec.ident, spec.meta, spec.value));
        if let Some((kind, discipline)) = spec.store {
            match Store::new(kind, discipline, rid, spec.compare, spec.hash) {
                Ok(store) => {
                    let sid = self.stores.alloc(store);
                    self.recs.get_mut(rid).expect("just allocated").kids = Some(sid);
                }
                Err(e) => {
                    self.recs.free(rid);
                    return Err(e);
                }
            }
        }
        trace!(%rid, "record created");
        Ok(rid)
    }

    /// Create a detached copy of `src`: same metadata and data, optionally
    /// a different name. Children are not cloned.
    pub fn create_clone(&mut self, ident: Option<Ident>, src: Rid) -> Result<Rid> {
        let src_rec = self.rec_ref(src)?;
        let rid = self.recs.alloc(Record::new(
            ident.unwrap_or(src_rec.ident),
            src_rec.meta,
            src_rec.value.clone(),
        ));
        trace!(%rid, %src, "record cloned");
        Ok(rid)
    }

    /// Destroy a record: detach it, sever its links, recursively release
    /// its children and their stores, and reclaim every slot.
    pub fn finalize(&mut self, rid: Rid) -> Result<()> {
        if rid == self.root {
            return Err(Error::Config("the root record cannot be finalized".into()));
        }
        let parent = self.rec_ref(rid)?.parent;
        if let Some(sid) = parent {
            let store = self.stores.get_mut(sid).expect("parent store handle is live");
            store.remove(&mut self.recs, rid)?;
        }
        self.teardown(rid);
        Ok(())
    }

    /// Iterative post-order release of a subtree. The caller has already
    /// detached `rid` from any parent store.
    fn teardown(&mut self, rid: Rid) {
        let mut stack = vec![rid];
        let mut released = 0usize;
        while let Some(r) = stack.pop() {
            self.links.sever(r);
            if let Some(sid) = self.recs.get(r).and_then(|rec| rec.kids) {
                if let Some(store) = self.stores.free(sid) {
                    stack.extend(store.collect_rids(&self.recs));
                }
            }
            self.recs.free(r);
            released += 1;
        }
        debug!(released, "record subtree finalized");
    }

    /// Release a freshly created record that never got attached
    fn discard(&mut self, rid: Rid) {
        if let Some(sid) = self.recs.get(rid).and_then(|r| r.kids) {
            self.stores.free(sid);
        }
        self.recs.free(rid);
    }

    // === Mutation ===

    /// Create a record from `spec` and append it to `parent`'s store
    pub fn add(&mut self, parent: Rid, spec: RecordSpec) -> Result<Rid> {
        let rid = self.create(spec)?;
        match self.do_attach(parent, rid, false, false, None) {
            Ok(()) => Ok(rid),
            Err(e) => {
                self.discard(rid);
                Err(e)
            }
        }
    }

    /// Create a record from `spec` and prepend it to `parent`'s store
    pub fn add_first(&mut self, parent: Rid, spec: RecordSpec) -> Result<Rid> {
        let rid = self.create(spec)?;
        match self.do_attach(parent, rid, true, false, None) {
            Ok(()) => Ok(rid),
            Err(e) => {
                self.discard(rid);
                Err(e)
            }
        }
    }

    /// Attach an existing detached record at the end (or in order, for
    /// sorted stores)
    pub fn attach(&mut self, parent: Rid, child: Rid) -> Result<()> {
        self.do_attach(parent, child, false, false, None)
    }

    /// Attach an existing detached record at the front (or in order, for
    /// sorted stores)
    pub fn attach_first(&mut self, parent: Rid, child: Rid) -> Result<()> {
        self.do_attach(parent, child, true, false, None)
    }

    /// Attach maintaining ascending order. A sequence store needs the
    /// one-off comparator; sorted stores use their own.
    pub fn sorted_insert(
        &mut self,
        parent: Rid,
        child: Rid,
        compare: Option<Compare>,
    ) -> Result<()> {
        self.do_attach(parent, child, false, true, compare)
    }

    fn do_attach(
        &mut self,
        parent: Rid,
        child: Rid,
        prepend: bool,
        force_sorted: bool,
        override_cmp: Option<Compare>,
    ) -> Result<()> {
        let sid = self.child_store_id(parent)?;
        let child_rec = self
            .recs
            .get(child)
            .ok_or_else(|| Error::stale(format!("record {child}")))?;
        if child_rec.parent.is_some() {
            return Err(Error::already_attached(format!("record {child}")));
        }
        // Ownership is a tree: a record may not own any of its ancestors
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(Error::Config(format!(
                    "record {child} cannot own its own ancestor chain"
                )));
            }
            ancestor = self.parent(a);
        }
        let is_auto = child_rec.ident.is_auto();

        let store = self.stores.get_mut(sid).expect("child store handle is live");
        if store.is_sealed() {
            return Err(Error::Sealed);
        }
        if is_auto {
            let ident = store.next_auto_ident()?;
            self.recs.get_mut(child).expect("checked above").ident = ident;
        }

        let res = if force_sorted {
            store.insert_sorted(&mut self.recs, child, override_cmp)
        } else {
            store.insert(&mut self.recs, child, prepend)
        };
        match res {
            Ok(()) => {
                self.recs.get_mut(child).expect("checked above").parent = Some(sid);
                trace!(%child, %parent, "record attached");
                Ok(())
            }
            Err(e) => {
                // Leave the pre-call state: give back the consumed auto id
                if is_auto {
                    store.rollback_auto_ident();
                    self.recs.get_mut(child).expect("checked above").ident = Ident::AUTO;
                }
                Err(e)
            }
        }
    }

    /// Finalize every child of `parent`, keeping the record and its
    /// (now empty) store
    pub fn delete_children(&mut self, parent: Rid) -> Result<()> {
        let sid = self.child_store_id(parent)?;
        let store = self.stores.get_mut(sid).expect("child store handle is live");
        if store.is_sealed() {
            return Err(Error::Sealed);
        }
        let children = store.drain(&self.recs);
        for child in children {
            self.teardown(child);
        }
        Ok(())
    }

    /// Detach a record from its parent store without destroying it.
    ///
    /// The record floats afterwards; the caller owns re-attaching or
    /// finalizing it.
    pub fn detach(&mut self, rid: Rid) -> Result<()> {
        let sid = self
            .rec_ref(rid)?
            .parent
            .ok_or_else(|| Error::not_attached(format!("record {rid}")))?;
        let store = self.stores.get_mut(sid).expect("parent store handle is live");
        store.remove(&mut self.recs, rid)?;
        self.recs.get_mut(rid).expect("checked above").parent = None;
        trace!(%rid, "record detached");
        Ok(())
    }

    /// Remove and return the first child
    pub fn take_first(&mut self, parent: Rid) -> Result<Option<Rid>> {
        self.take_end(parent, false)
    }

    /// Remove and return the last child
    pub fn take_last(&mut self, parent: Rid) -> Result<Option<Rid>> {
        self.take_end(parent, true)
    }

    fn take_end(&mut self, parent: Rid, last: bool) -> Result<Option<Rid>> {
        let sid = self.child_store_id(parent)?;
        let store = self.stores.get_mut(sid).expect("child store handle is live");
        let rid = store.take(&mut self.recs, last)?;
        if let Some(r) = rid {
            self.recs.get_mut(r).expect("taken child is live").parent = None;
        }
        Ok(rid)
    }

    /// Replace a record's data, copying the bytes (near when they fit)
    pub fn update(&mut self, rid: Rid, data: &[u8]) -> Result<()> {
        self.rec_mut(rid)?.value = Value::from_bytes(data);
        Ok(())
    }

    /// Replace a record's data by taking ownership of the buffer, no copy
    pub fn update_owned(&mut self, rid: Rid, buf: Vec<u8>) -> Result<()> {
        self.rec_mut(rid)?.value = Value::from_owned(buf);
        Ok(())
    }

    /// Replace a record's data with a shared, non-owned reference
    pub fn update_shared(&mut self, rid: Rid, data: Arc<[u8]>) -> Result<()> {
        self.rec_mut(rid)?.value = Value::from_shared(data);
        Ok(())
    }

    /// Drop a record's data
    pub fn clear_value(&mut self, rid: Rid) -> Result<()> {
        self.rec_mut(rid)?.value = Value::Empty;
        Ok(())
    }

    /// Replace a record's metadata word
    pub fn set_meta(&mut self, rid: Rid, meta: crate::meta::Meta) -> Result<()> {
        self.rec_mut(rid)?.meta = meta;
        Ok(())
    }

    /// Re-order a sequence store by `compare`
    pub fn sort(&mut self, parent: Rid, compare: Compare) -> Result<()> {
        let sid = self.child_store_id(parent)?;
        let store = self.stores.get_mut(sid).expect("child store handle is live");
        store.sort(&mut self.recs, compare)
    }

    /// Flag a store immutable. One-way: a sealed store stays sealed.
    pub fn seal(&mut self, parent: Rid) -> Result<()> {
        let sid = self.child_store_id(parent)?;
        self.stores
            .get_mut(sid)
            .expect("child store handle is live")
            .sealed = true;
        Ok(())
    }

    /// Move a store's auto-id counter forward
    pub fn set_auto_id(&mut self, parent: Rid, id: u64) -> Result<()> {
        let sid = self.child_store_id(parent)?;
        self.stores
            .get_mut(sid)
            .expect("child store handle is live")
            .set_auto_id(id)
    }

    // === Links ===

    /// Register a non-owning link from `linker` to `target`
    pub fn link(&mut self, linker: Rid, target: Rid) -> Result<()> {
        self.rec_ref(linker)?;
        self.rec_ref(target)?;
        self.links.link(linker, target);
        Ok(())
    }

    /// Drop a previously registered link
    pub fn unlink(&mut self, linker: Rid, target: Rid) -> Result<()> {
        self.links.unlink(linker, target);
        Ok(())
    }

    /// The shadow list: records currently linking to `target`
    pub fn links_of(&self, target: Rid) -> &[Rid] {
        self.links.links_of(target)
    }

    // === Query ===

    /// Borrow a record by handle; `None` when stale
    pub fn record(&self, rid: Rid) -> Option<&Record> {
        self.recs.get(rid)
    }

    /// The record owning the store that holds `rid`
    pub fn parent(&self, rid: Rid) -> Option<Rid> {
        let sid = self.recs.get(rid)?.parent?;
        Some(self.stores.get(sid)?.owner())
    }

    /// Borrow a record's child store (for predicates and bookkeeping)
    pub fn child_store(&self, rid: Rid) -> Option<&Store> {
        let sid = self.recs.get(rid)?.kids?;
        self.stores.get(sid)
    }

    /// Number of children of `rid` (0 without a store)
    pub fn children_count(&self, rid: Rid) -> usize {
        self.child_store(rid).map(Store::len).unwrap_or(0)
    }

    /// Number of records in the store holding `rid`, itself included
    pub fn siblings_count(&self, rid: Rid) -> usize {
        self.parent(rid)
            .map(|owner| self.children_count(owner))
            .unwrap_or(0)
    }

    /// First child in store order
    pub fn first(&self, parent: Rid) -> Option<Rid> {
        self.child_store(parent)?.first(&self.recs)
    }

    /// Last child in store order
    pub fn last(&self, parent: Rid) -> Option<Rid> {
        self.child_store(parent)?.last(&self.recs)
    }

    /// Sibling after `rid` in its store's order
    pub fn next_of(&self, rid: Rid) -> Option<Rid> {
        let sid = self.recs.get(rid)?.parent?;
        self.stores.get(sid)?.next_of(&self.recs, rid)
    }

    /// Sibling before `rid` in its store's order
    pub fn prev_of(&self, rid: Rid) -> Option<Rid> {
        let sid = self.recs.get(rid)?.parent?;
        self.stores.get(sid)?.prev_of(&self.recs, rid)
    }

    /// Child of `parent` with the given name
    pub fn find_by_name(&self, parent: Rid, ident: Ident) -> Option<Rid> {
        self.child_store(parent)?.find_by_name(&self.recs, ident)
    }

    /// Child of `parent` matching a key probe (see [`Store::find_by_key`])
    pub fn find_by_key(
        &self,
        parent: Rid,
        probe: impl Fn(&Record) -> Ordering,
    ) -> Option<Rid> {
        self.child_store(parent)?.find_by_key(&self.recs, &probe)
    }

    /// Child of `parent` at a 0-based position
    pub fn find_by_position(&self, parent: Rid, pos: usize) -> Option<Rid> {
        self.child_store(parent)?.nth(&self.recs, pos)
    }

    /// Next child named `ident` after `prev` (or the first match when
    /// `prev` is `None`). The resumable cursor for duplicate-permitting
    /// stores: feed each result back in to get the one after it.
    pub fn next_by_name(&self, parent: Rid, ident: Ident, prev: Option<Rid>) -> Option<Rid> {
        let store = self.child_store(parent)?;
        let mut cur = match prev {
            None => return store.find_by_name(&self.recs, ident),
            Some(p) => store.next_of(&self.recs, p),
        };
        while let Some(c) = cur {
            let name = rec(&self.recs, c).ident();
            if name == ident {
                return Some(c);
            }
            if store.is_name_unique() && name > ident {
                return None;
            }
            cur = store.next_of(&self.recs, c);
        }
        None
    }

    // === Traversal ===

    /// Visit `parent`'s direct children in store order.
    ///
    /// Stops early when the callback returns `false`; otherwise ends with
    /// the sentinel visit (see [`Visit`]). A record without a store is
    /// traversed as empty.
    pub fn traverse(&self, parent: Rid, f: impl FnMut(&Visit<'_>) -> bool) {
        if let Some(store) = self.child_store(parent) {
            store.traverse(&self.recs, f);
        }
    }

    /// Pre-order descent below `start`, bounded in depth.
    ///
    /// `visit` sees each record with its depth (direct children at 0);
    /// returning `false` aborts the whole walk. `level_end` fires after the
    /// last child of each store, with that level's depth. Children at
    /// `max_depth` and beyond are not visited.
    ///
    /// Returns `false` when the walk was aborted.
    pub fn deep_traverse(
        &self,
        start: Rid,
        max_depth: usize,
        visit: &mut dyn FnMut(Rid, &Record, usize) -> bool,
        level_end: &mut dyn FnMut(usize),
    ) -> bool {
        if max_depth == 0 {
            return true;
        }
        self.deep(start, 0, max_depth, visit, level_end)
    }

    fn deep(
        &self,
        parent: Rid,
        depth: usize,
        max_depth: usize,
        visit: &mut dyn FnMut(Rid, &Record, usize) -> bool,
        level_end: &mut dyn FnMut(usize),
    ) -> bool {
        let store = match self.child_store(parent) {
            Some(s) => s,
            None => return true,
        };
        for r in store.iter(&self.recs) {
            if !visit(r, rec(&self.recs, r), depth) {
                return false;
            }
            if depth + 1 < max_depth && !self.deep(r, depth + 1, max_depth, visit, level_end) {
                return false;
            }
        }
        level_end(depth);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Meta;

    fn word(s: &str) -> Ident {
        Ident::word(s).unwrap()
    }

    #[test]
    fn test_initiate_and_root() {
        let sys = System::initiate();
        let root = sys.root();
        assert_eq!(sys.record(root).unwrap().ident(), word("root"));
        assert_eq!(sys.children_count(root), 0);
        assert!(sys.child_store(root).unwrap().is_name_unique());
    }

    #[test]
    fn test_add_and_find() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys
            .add(root, RecordSpec::named(word("alpha")).value(Value::long(1)))
            .unwrap();
        let _b = sys
            .add(root, RecordSpec::named(word("beta")).value(Value::long(2)))
            .unwrap();

        assert_eq!(sys.children_count(root), 2);
        assert_eq!(sys.find_by_name(root, word("alpha")), Some(a));
        assert_eq!(sys.find_by_name(root, word("missing")), None);
        assert_eq!(sys.parent(a), Some(root));
        assert_eq!(sys.siblings_count(a), 2);
    }

    #[test]
    fn test_duplicate_name_rejected_cleanly() {
        let mut sys = System::initiate();
        let root = sys.root();
        sys.add(root, RecordSpec::named(word("twin"))).unwrap();
        let err = sys.add(root, RecordSpec::named(word("twin"))).unwrap_err();
        assert_eq!(err, Error::DuplicateName(word("twin")));
        // The failed add left no trace
        assert_eq!(sys.children_count(root), 1);
        assert_eq!(sys.recs.len(), 2); // root + twin
    }

    #[test]
    fn test_auto_ident_assignment_and_rollback() {
        let mut sys = System::initiate();
        let root = sys.root();
        let list = sys
            .add(
                root,
                RecordSpec::named(word("items")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();

        let a = sys.add(list, RecordSpec::auto()).unwrap();
        let b = sys.add(list, RecordSpec::auto()).unwrap();
        assert_eq!(sys.record(a).unwrap().ident(), Ident::serial(0).unwrap());
        assert_eq!(sys.record(b).unwrap().ident(), Ident::serial(1).unwrap());

        sys.set_auto_id(list, 10).unwrap();
        let c = sys.add(list, RecordSpec::auto()).unwrap();
        assert_eq!(sys.record(c).unwrap().ident(), Ident::serial(10).unwrap());

        // A failed auto insert must give its id back
        sys.seal(list).unwrap();
        assert!(sys.add(list, RecordSpec::auto()).is_err());
        assert_eq!(sys.child_store(list).unwrap().auto_id(), 11);
    }

    #[test]
    fn test_finalize_releases_subtree_and_slots() {
        let mut sys = System::initiate();
        let root = sys.root();
        let branch = sys
            .add(
                root,
                RecordSpec::named(word("branch")).store(StoreKind::Tree, Discipline::Dictionary),
            )
            .unwrap();
        let leaf = sys
            .add(
                branch,
                RecordSpec::named(word("leaf")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        sys.add(leaf, RecordSpec::auto().value(Value::long(7)))
            .unwrap();

        assert_eq!(sys.recs.len(), 4);
        assert_eq!(sys.stores.len(), 3);

        sys.finalize(branch).unwrap();
        assert_eq!(sys.recs.len(), 1); // root only
        assert_eq!(sys.stores.len(), 1);
        assert_eq!(sys.children_count(root), 0);

        // Idempotent removal: the handle is stale now
        assert_eq!(sys.find_by_name(root, word("branch")), None);
        assert!(matches!(sys.finalize(branch), Err(Error::StaleHandle(_))));
        assert!(sys.record(leaf).is_none());
    }

    #[test]
    fn test_finalize_severs_links() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys.add(root, RecordSpec::named(word("a"))).unwrap();
        let b = sys.add(root, RecordSpec::named(word("b"))).unwrap();
        sys.link(b, a).unwrap();
        assert_eq!(sys.links_of(a), &[b]);

        sys.finalize(a).unwrap();
        assert!(sys.links.is_empty());
        // b survives, a's shadow list is gone with it
        assert!(sys.record(b).is_some());
    }

    #[test]
    fn test_detach_and_reattach() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys.add(root, RecordSpec::named(word("wanderer"))).unwrap();

        sys.detach(a).unwrap();
        assert_eq!(sys.children_count(root), 0);
        assert_eq!(sys.parent(a), None);
        assert!(matches!(sys.detach(a), Err(Error::NotAttached(_))));

        let home = sys
            .add(
                root,
                RecordSpec::named(word("home")).store(StoreKind::Array, Discipline::Sequence),
            )
            .unwrap();
        sys.attach(home, a).unwrap();
        assert_eq!(sys.parent(a), Some(home));

        // A record cannot be owned twice
        assert!(matches!(
            sys.attach(root, a),
            Err(Error::AlreadyAttached(_))
        ));
    }

    #[test]
    fn test_ownership_stays_a_tree() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys
            .add(
                root,
                RecordSpec::named(word("a")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let b = sys
            .add(
                a,
                RecordSpec::named(word("b")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();

        // A detached ancestor cannot be re-attached under its own subtree
        sys.detach(a).unwrap();
        assert!(matches!(sys.attach(b, a), Err(Error::Config(_))));
        sys.attach(root, a).unwrap();
    }

    #[test]
    fn test_update_variants() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys.add(root, RecordSpec::named(word("v"))).unwrap();

        sys.update(a, b"small").unwrap();
        assert!(sys.record(a).unwrap().value().is_near());

        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&[9u8; 64]);
        sys.update_owned(a, buf).unwrap();
        assert!(sys.record(a).unwrap().value().is_far());

        let shared: Arc<[u8]> = Arc::from(&b"shared"[..]);
        sys.update_shared(a, shared.clone()).unwrap();
        assert_eq!(sys.record(a).unwrap().value().as_bytes(), Some(&b"shared"[..]));

        sys.clear_value(a).unwrap();
        assert!(sys.record(a).unwrap().value().is_empty());
    }

    #[test]
    fn test_clone_copies_data_not_children() {
        let mut sys = System::initiate();
        let root = sys.root();
        let src = sys
            .add(
                root,
                RecordSpec::named(word("src"))
                    .meta(Meta::new(1, 2, 3, 4))
                    .value(Value::long(42))
                    .store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        sys.add(src, RecordSpec::auto()).unwrap();

        let copy = sys.create_clone(Some(word("copy")), src).unwrap();
        let rec = sys.record(copy).unwrap();
        assert_eq!(rec.ident(), word("copy"));
        assert_eq!(rec.meta(), Meta::new(1, 2, 3, 4));
        assert_eq!(rec.value().as_long(), Some(42));
        assert!(!rec.has_kids());
        assert!(!rec.is_attached());
    }

    #[test]
    fn test_next_by_name_resumes_over_duplicates() {
        let mut sys = System::initiate();
        let root = sys.root();
        let seq = sys
            .add(
                root,
                RecordSpec::named(word("seq")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let twin = word("twin");
        let a = sys.add(seq, RecordSpec::named(twin).value(Value::long(1))).unwrap();
        let other = sys.add(seq, RecordSpec::named(word("other"))).unwrap();
        let b = sys.add(seq, RecordSpec::named(twin).value(Value::long(2))).unwrap();

        assert_eq!(sys.next_by_name(seq, twin, None), Some(a));
        assert_eq!(sys.next_by_name(seq, twin, Some(a)), Some(b));
        assert_eq!(sys.next_by_name(seq, twin, Some(b)), None);
        assert_eq!(sys.next_by_name(seq, word("other"), None), Some(other));
    }

    #[test]
    fn test_deep_traverse_depth_bound_and_level_end() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = sys
            .add(
                root,
                RecordSpec::named(word("a")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let b = sys
            .add(
                a,
                RecordSpec::named(word("b")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        sys.add(b, RecordSpec::named(word("c"))).unwrap();

        let mut names = Vec::new();
        let mut ends = Vec::new();
        sys.deep_traverse(
            root,
            usize::MAX,
            &mut |_, rec, depth| {
                names.push((rec.ident().to_string(), depth));
                true
            },
            &mut |depth| ends.push(depth),
        );
        assert_eq!(
            names,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
            ]
        );
        // Deepest level flushes first on the way back up
        assert_eq!(ends, vec![2, 1, 0]);

        // Bounded: only direct children
        let mut shallow = Vec::new();
        sys.deep_traverse(
            root,
            1,
            &mut |_, rec, depth| {
                shallow.push((rec.ident().to_string(), depth));
                true
            },
            &mut |_| {},
        );
        assert_eq!(shallow, vec![("a".to_string(), 0)]);
    }

    #[test]
    fn test_deep_traverse_early_exit() {
        let mut sys = System::initiate();
        let root = sys.root();
        for name in ["a", "b", "c"] {
            sys.add(root, RecordSpec::named(word(name))).unwrap();
        }
        let mut seen = 0;
        let aborted = !sys.deep_traverse(
            root,
            usize::MAX,
            &mut |_, _, _| {
                seen += 1;
                seen < 2
            },
            &mut |_| {},
        );
        assert!(aborted);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_text_idents() {
        let sys = System::initiate();
        let a = sys.text_ident("a name far too long for the word codec").unwrap();
        let b = sys.text_ident("a name far too long for the word codec").unwrap();
        assert_eq!(a, b);
        let name = sys.text().resolve(a.value()).unwrap();
        assert_eq!(&*name, "a name far too long for the word codec");
    }

    #[test]
    fn test_shutdown_consumes_everything() {
        let mut sys = System::initiate();
        let root = sys.root();
        for n in 0..10u64 {
            let r = sys
                .add(
                    root,
                    RecordSpec::named(Ident::serial(n).unwrap())
                        .store(StoreKind::List, Discipline::Sequence),
                )
                .unwrap();
            sys.add(r, RecordSpec::auto()).unwrap();
        }
        sys.shutdown();
    }
}
