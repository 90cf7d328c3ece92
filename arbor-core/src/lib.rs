//! # Arbor Core
//!
//! Hierarchical, cache-conscious record store: a generic substitute for a
//! filesystem or DOM tree in which every node ("record") can hold a typed
//! data value and an ordered collection of child records at the same time.
//!
//! This crate is the record/store engine only:
//! - Compact identifiers ([`Ident`]) and packed metadata words ([`Meta`])
//! - The record model ([`Record`], near/far/shared payloads in [`Value`])
//! - Five child-store back-ends behind one contract ([`StoreKind`]):
//!   linked list, growable array, packed queue, balanced ordered tree, and
//!   the spatial tree variant
//! - Uniform operations: insert, find, traverse, remove, sort, path-resolve
//!
//! ## Design Principles
//!
//! 1. **Handles, not addresses**: records and stores live in generational
//!    slot arenas; a handle survives any growth or slot reuse, so nothing
//!    in the engine ever fixes up raw pointers.
//! 2. **One contract, five structures**: every back-end answers the same
//!    operations with the same semantics; only the asymptotics differ.
//! 3. **Single-threaded by construction**: every mutation takes
//!    `&mut System`; there is no internal synchronization to misuse.
//!
//! ## Example
//!
//! ```
//! use arbor_core::{Discipline, Ident, RecordSpec, StoreKind, System, Value};
//!
//! let mut sys = System::initiate();
//! let root = sys.root();
//!
//! let fruit = sys
//!     .add(
//!         root,
//!         RecordSpec::named(Ident::word("fruit").unwrap())
//!             .store(StoreKind::Tree, Discipline::Dictionary),
//!     )
//!     .unwrap();
//! sys.add(fruit, RecordSpec::named(Ident::word("pear").unwrap()).value(Value::long(5)))
//!     .unwrap();
//!
//! let pear = sys.find_by_path(root, &[Ident::word("fruit").unwrap(),
//!                                     Ident::word("pear").unwrap()]).unwrap();
//! assert_eq!(sys.record(pear).unwrap().value().as_long(), Some(5));
//! sys.shutdown();
//! ```

pub mod arena;
pub mod error;
pub mod ident;
mod links;
pub mod meta;
mod path;
pub mod record;
pub mod store;
pub mod system;
pub mod text;
pub mod value;

// Re-export main types
pub use arena::{Rid, StoreId};
pub use error::{Error, Result};
pub use ident::{Convention, Ident, ACRONYM_CAP, VALUE_MAX, WORD_CAP};
pub use meta::{Meta, ATTR_DERIVED, ATTR_FROZEN, ATTR_REFERENCE};
pub use record::{Record, RecordSpec};
pub use store::{grid, Compare, Discipline, HashFn, Store, StoreKind, Visit, CHUNK_CAP};
pub use system::System;
pub use text::TextPool;
pub use value::{Value, NEAR_CAP};
