//! Path resolution - root-relative identifier sequences
//!
//! A path is the sequence of identifiers from the root down to a record,
//! one per level, root excluded. Resolution is two-phase: walk the owner
//! chain upward counting depth (detecting floating records, which have no
//! chain to the root), then fill a sequence of exactly that length
//! back-to-front on a second walk.
//!
//! `find_by_path` walks downward with a name lookup per level; the
//! `next_by_path` cursor resumes after a previous match, advancing the
//! deepest level first and backtracking through earlier levels when a
//! branch is exhausted, so every instance of a duplicate-named path is
//! reachable in order.

use crate::arena::Rid;
use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::system::System;

impl System {
    /// The root-relative path of `rid`.
    ///
    /// A record not reachable from the root (floating, or inside a
    /// detached subtree) is an error, not an empty path.
    pub fn path(&self, rid: Rid) -> Result<Vec<Ident>> {
        if self.record(rid).is_none() {
            return Err(Error::stale(format!("record {rid}")));
        }

        // Phase 1: count depth
        let mut depth = 0usize;
        let mut cur = rid;
        while let Some(owner) = self.parent(cur) {
            depth += 1;
            cur = owner;
        }
        if cur != self.root() {
            return Err(Error::detached(format!("record {rid}")));
        }

        // Phase 2: fill back-to-front
        let mut path = vec![Ident::AUTO; depth];
        let mut cur = rid;
        for slot in path.iter_mut().rev() {
            *slot = self.record(cur).expect("walked above").ident();
            cur = self.parent(cur).expect("depth counted above");
        }
        Ok(path)
    }

    /// Walk `path` down from `start`, taking the first name match at each
    /// level. An empty path resolves to `start` itself.
    pub fn find_by_path(&self, start: Rid, path: &[Ident]) -> Option<Rid> {
        let mut cur = start;
        for &ident in path {
            cur = self.find_by_name(cur, ident)?;
        }
        Some(cur)
    }

    /// Next record matching `path` after a previous match.
    ///
    /// With `prev = None` this is `find_by_path`. Feeding each result back
    /// in enumerates every match of the path in store order, across
    /// duplicate names at any level.
    pub fn next_by_path(&self, start: Rid, path: &[Ident], prev: Option<Rid>) -> Option<Rid> {
        let (&last, prefix) = path.split_last()?;
        match prev {
            None => {
                if prefix.is_empty() {
                    return self.find_by_name(start, last);
                }
                let mut parent = self.find_by_path(start, prefix)?;
                loop {
                    if let Some(hit) = self.find_by_name(parent, last) {
                        return Some(hit);
                    }
                    parent = self.next_by_path(start, prefix, Some(parent))?;
                }
            }
            Some(prev) => {
                let mut parent = self.parent(prev)?;
                if let Some(hit) = self.next_by_name(parent, last, Some(prev)) {
                    return Some(hit);
                }
                loop {
                    if prefix.is_empty() {
                        return None;
                    }
                    parent = self.next_by_path(start, prefix, Some(parent))?;
                    if let Some(hit) = self.find_by_name(parent, last) {
                        return Some(hit);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordSpec;
    use crate::store::{Discipline, StoreKind};
    use crate::value::Value;

    fn word(s: &str) -> Ident {
        Ident::word(s).unwrap()
    }

    fn branch(sys: &mut System, parent: Rid, name: &str) -> Rid {
        sys.add(
            parent,
            RecordSpec::named(word(name)).store(StoreKind::Tree, Discipline::Dictionary),
        )
        .unwrap()
    }

    #[test]
    fn test_path_round_trip() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = branch(&mut sys, root, "usr");
        let b = branch(&mut sys, a, "share");
        let c = sys.add(b, RecordSpec::named(word("doc"))).unwrap();

        let path = sys.path(c).unwrap();
        assert_eq!(path, vec![word("usr"), word("share"), word("doc")]);
        assert_eq!(sys.find_by_path(root, &path), Some(c));

        // Root's own path is empty, and resolves to root
        assert_eq!(sys.path(root).unwrap(), Vec::<Ident>::new());
        assert_eq!(sys.find_by_path(root, &[]), Some(root));
    }

    #[test]
    fn test_floating_record_is_an_error() {
        let mut sys = System::initiate();
        let floater = sys.create(RecordSpec::named(word("lost"))).unwrap();
        assert!(matches!(sys.path(floater), Err(Error::Detached(_))));

        // A record inside a detached subtree floats too
        let root = sys.root();
        let a = branch(&mut sys, root, "a");
        let b = sys.add(a, RecordSpec::named(word("b"))).unwrap();
        sys.detach(a).unwrap();
        assert!(matches!(sys.path(b), Err(Error::Detached(_))));
    }

    #[test]
    fn test_find_by_path_missing_level() {
        let mut sys = System::initiate();
        let root = sys.root();
        let a = branch(&mut sys, root, "a");
        branch(&mut sys, a, "b");
        assert_eq!(sys.find_by_path(root, &[word("a"), word("nope")]), None);
        assert_eq!(sys.find_by_path(root, &[word("nope")]), None);
    }

    #[test]
    fn test_next_by_path_resumes_across_duplicates() {
        let mut sys = System::initiate();
        let root = sys.root();
        // Two same-named branches in a sequence store, each holding "leaf"
        let seq = sys
            .add(
                root,
                RecordSpec::named(word("seq")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let twin = word("twin");
        let t1 = sys
            .add(
                seq,
                RecordSpec::named(twin).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let t2 = sys
            .add(
                seq,
                RecordSpec::named(twin).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let l1 = sys
            .add(t1, RecordSpec::named(word("leaf")).value(Value::long(1)))
            .unwrap();
        let l2 = sys
            .add(t2, RecordSpec::named(word("leaf")).value(Value::long(2)))
            .unwrap();

        let path = [word("seq"), twin, word("leaf")];
        let first = sys.next_by_path(root, &path, None).unwrap();
        assert_eq!(first, l1);
        let second = sys.next_by_path(root, &path, Some(first)).unwrap();
        assert_eq!(second, l2);
        assert_eq!(sys.next_by_path(root, &path, Some(second)), None);
    }

    #[test]
    fn test_next_by_path_skips_childless_duplicates() {
        let mut sys = System::initiate();
        let root = sys.root();
        let seq = sys
            .add(
                root,
                RecordSpec::named(word("seq")).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let twin = word("twin");
        // First twin has no "leaf"; the match must come from the second
        let t1 = sys
            .add(
                seq,
                RecordSpec::named(twin).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        sys.add(t1, RecordSpec::named(word("other"))).unwrap();
        let t2 = sys
            .add(
                seq,
                RecordSpec::named(twin).store(StoreKind::List, Discipline::Sequence),
            )
            .unwrap();
        let leaf = sys.add(t2, RecordSpec::named(word("leaf"))).unwrap();

        let path = [word("seq"), twin, word("leaf")];
        assert_eq!(sys.next_by_path(root, &path, None), Some(leaf));
        assert_eq!(sys.next_by_path(root, &path, Some(leaf)), None);
    }
}
