//! Link registry - weak back-references between records
//!
//! A link is a non-owning reference from one record to another. Links never
//! affect ownership or lifetime; they exist so a record's deletion can
//! invalidate everything still pointing at it. The registry is the engine's
//! shadow list: it maps each target to its linkers (and mirrors the reverse
//! direction so a linker's own deletion cleans up after itself). Because
//! links live here rather than inside records, severing the registry
//! entries *is* the invalidation step, and no dangling reference can
//! survive a finalize.

use hashbrown::HashMap;

use crate::arena::Rid;

/// Registry of non-owning record-to-record links
#[derive(Default)]
pub(crate) struct LinkRegistry {
    /// target -> records linking to it (the shadow list)
    incoming: HashMap<Rid, Vec<Rid>>,
    /// linker -> targets it links to
    outgoing: HashMap<Rid, Vec<Rid>>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link. Duplicate links collapse to one entry.
    pub fn link(&mut self, linker: Rid, target: Rid) {
        let incoming = self.incoming.entry(target).or_default();
        if !incoming.contains(&linker) {
            incoming.push(linker);
            self.outgoing.entry(linker).or_default().push(target);
        }
    }

    /// Drop one link. Unknown links are ignored.
    pub fn unlink(&mut self, linker: Rid, target: Rid) {
        if let Some(incoming) = self.incoming.get_mut(&target) {
            incoming.retain(|&r| r != linker);
            if incoming.is_empty() {
                self.incoming.remove(&target);
            }
        }
        if let Some(outgoing) = self.outgoing.get_mut(&linker) {
            outgoing.retain(|&r| r != target);
            if outgoing.is_empty() {
                self.outgoing.remove(&linker);
            }
        }
    }

    /// The shadow list: records currently linking to `target`
    pub fn links_of(&self, target: Rid) -> &[Rid] {
        self.incoming.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove every link touching `rid`, in either direction, and return
    /// the linkers that were pointing at it. Called before a record's slot
    /// is released.
    pub fn sever(&mut self, rid: Rid) -> Vec<Rid> {
        let linkers = self.incoming.remove(&rid).unwrap_or_default();
        for &linker in &linkers {
            if let Some(outgoing) = self.outgoing.get_mut(&linker) {
                outgoing.retain(|&t| t != rid);
                if outgoing.is_empty() {
                    self.outgoing.remove(&linker);
                }
            }
        }
        if let Some(targets) = self.outgoing.remove(&rid) {
            for target in targets {
                if let Some(incoming) = self.incoming.get_mut(&target) {
                    incoming.retain(|&l| l != rid);
                    if incoming.is_empty() {
                        self.incoming.remove(&target);
                    }
                }
            }
        }
        linkers
    }

    /// Total number of live links
    pub fn len(&self) -> usize {
        self.incoming.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }
}
