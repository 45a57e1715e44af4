//! Per-user entry trees.
//!
//! This crate holds the pure part of the entries service:
//! - The entry model and its JSON wire form
//! - Directory path parsing and entry name validation
//! - Path resolution to index paths
//! - Create and delete on an in-memory tree
//!
//! Loading and saving trees is left to the caller; a [`Tree`] is always
//! read, mutated and written back as a whole.

pub mod entry;
pub mod error;
pub mod path;
pub mod resolve;
pub mod tree;

pub use entry::{AppId, Entry, EntryKind, EntryType, NewEntry, NewEntryKind};
pub use error::{Result, TreeError};
pub use path::{validate_entry_name, DirPath};
pub use resolve::IndexPath;
pub use tree::{Slot, Tree};
