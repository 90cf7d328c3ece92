//! Interned text pool
//!
//! Backs the `Text` naming convention: names too long or too rich for the
//! word/acronym codecs are interned once and referenced by code. Interning
//! deduplicates, so equal names share one allocation and compare by code.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Deduplicating pool of interned names
///
/// Codes are dense and never reused; the pool only grows until cleared.
#[derive(Debug, Default)]
pub struct TextPool {
    inner: RwLock<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    codes: HashMap<Arc<str>, u64>,
    names: Vec<Arc<str>>,
}

impl TextPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning its code.
    ///
    /// Interning the same text twice returns the same code.
    pub fn intern(&self, text: &str) -> u64 {
        let mut inner = self.inner.write();
        if let Some(&code) = inner.codes.get(text) {
            return code;
        }
        let arc: Arc<str> = Arc::from(text);
        let code = inner.names.len() as u64;
        inner.names.push(arc.clone());
        inner.codes.insert(arc, code);
        code
    }

    /// Resolve a code back to its name
    pub fn resolve(&self, code: u64) -> Option<Arc<str>> {
        self.inner.read().names.get(code as usize).cloned()
    }

    /// Number of unique interned names
    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().names.is_empty()
    }
}
