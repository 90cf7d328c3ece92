//! Record - the atomic unit of the store
//!
//! A record holds an identifier, a metadata word, an optional data value,
//! and optionally owns one child store. It is owned by at most one parent
//! store at a time (ownership is a tree, never a graph); any number of
//! non-owning links may additionally point at it through the link registry.
//!
//! The embedded [`Links`] block is intrusive sibling state, interpreted by
//! whichever back-end the owning store runs: the list back-end reads
//! `prev`/`next` as neighbor pointers, the tree back-ends reuse them as
//! left/right child pointers with `up` as the parent link and `red` as the
//! balance color. The array and queue back-ends leave it untouched.

use crate::arena::{Rid, StoreId};
use crate::ident::Ident;
use crate::meta::Meta;
use crate::store::{Compare, Discipline, HashFn, StoreKind};
use crate::value::Value;

/// Intrusive sibling links, interpreted by the owning store's back-end
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Links {
    /// List: previous sibling. Tree: left child.
    pub prev: Option<Rid>,
    /// List: next sibling. Tree: right child.
    pub next: Option<Rid>,
    /// Tree: parent node.
    pub up: Option<Rid>,
    /// Tree: red/black color (`true` = red).
    pub red: bool,
}

impl Links {
    /// Reset to the detached state
    pub fn clear(&mut self) {
        *self = Links::default();
    }
}

/// The atomic unit: metadata + data value + optional child store
pub struct Record {
    pub(crate) ident: Ident,
    pub(crate) meta: Meta,
    pub(crate) value: Value,
    /// The store that owns this record, if attached
    pub(crate) parent: Option<StoreId>,
    /// The child store this record owns, if any
    pub(crate) kids: Option<StoreId>,
    pub(crate) links: Links,
}

impl Record {
    pub(crate) fn new(ident: Ident, meta: Meta, value: Value) -> Self {
        Record {
            ident,
            meta,
            value,
            parent: None,
            kids: None,
            links: Links::default(),
        }
    }

    /// The record's identifier
    pub fn ident(&self) -> Ident {
        self.ident
    }

    /// The record's metadata word
    pub fn meta(&self) -> Meta {
        self.meta
    }

    /// The record's data value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Does this record own a child store?
    pub fn has_kids(&self) -> bool {
        self.kids.is_some()
    }

    /// Is this record owned by a parent store?
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Approximate size of this record in bytes
    ///
    /// Struct plus payload; child store and children not included.
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Record>() + self.value.size_bytes()
    }
}

/// Builder describing a record to create
///
/// Collects what the initialize operation needs: identifier, optional
/// metadata, optional initial data, and the child-store configuration.
///
/// # Example
///
/// ```
/// use arbor_core::{Discipline, Ident, Meta, RecordSpec, StoreKind, Value};
///
/// let spec = RecordSpec::named(Ident::word("config").unwrap())
///     .meta(Meta::new(1, 0, 0, 0))
///     .value(Value::long(42))
///     .store(StoreKind::Tree, Discipline::Dictionary);
/// ```
#[derive(Clone)]
pub struct RecordSpec {
    pub(crate) ident: Ident,
    pub(crate) meta: Meta,
    pub(crate) value: Value,
    pub(crate) store: Option<(StoreKind, Discipline)>,
    pub(crate) compare: Option<Compare>,
    pub(crate) hash: Option<HashFn>,
}

impl RecordSpec {
    /// Start a spec with an explicit identifier
    pub fn named(ident: Ident) -> Self {
        RecordSpec {
            ident,
            meta: Meta::NONE,
            value: Value::Empty,
            store: None,
            compare: None,
            hash: None,
        }
    }

    /// Start a spec whose identifier the store assigns on insert
    pub fn auto() -> Self {
        Self::named(Ident::AUTO)
    }

    /// Set the metadata word
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set the initial data value
    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Give the record a child store of the given kind and discipline
    pub fn store(mut self, kind: StoreKind, discipline: Discipline) -> Self {
        self.store = Some((kind, discipline));
        self
    }

    /// Comparator for a catalog child store
    pub fn compare(mut self, compare: Compare) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Hash function for a hashed-catalog child store
    pub fn hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }
}
