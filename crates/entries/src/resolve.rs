//! Path resolution.
//!
//! Resolving a [`DirPath`] yields an [`IndexPath`]: the child index taken at
//! each level from the root. Callers re-walk the index path to reach the
//! directory's children, shared or mutable, without holding a borrow between
//! the lookup and the mutation.

use crate::entry::{Entry, EntryKind};
use crate::error::{Result, TreeError};
use crate::path::DirPath;
use crate::tree::Tree;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl Tree {
    /// Locates the directory named by `path`.
    ///
    /// Only directories match a segment; the first segment with no matching
    /// directory is reported as [`TreeError::EntryNotFound`].
    pub fn resolve(&self, path: &DirPath) -> Result<IndexPath> {
        let mut current: &[Entry] = self.entries();
        let mut indices = Vec::with_capacity(path.segments().len());
        for segment in path.segments() {
            let (index, children) = current
                .iter()
                .enumerate()
                .find_map(|(index, entry)| match &entry.kind {
                    EntryKind::Directory { children } if entry.name == *segment => {
                        Some((index, children.as_slice()))
                    }
                    _ => None,
                })
                .ok_or_else(|| TreeError::EntryNotFound(segment.clone()))?;
            indices.push(index);
            current = children;
        }
        Ok(IndexPath(indices))
    }

    pub fn children(&self, at: &IndexPath) -> Option<&[Entry]> {
        let mut current: &[Entry] = self.entries();
        for &index in at.indices() {
            current = current.get(index)?.children()?;
        }
        Some(current)
    }

    pub fn children_mut(&mut self, at: &IndexPath) -> Option<&mut Vec<Entry>> {
        let mut current = self.entries_mut();
        for &index in at.indices() {
            current = current.get_mut(index)?.children_mut()?;
        }
        Some(current)
    }

    /// Children of the directory at `path`.
    pub fn directory(&self, path: &DirPath) -> Result<&[Entry]> {
        let at = self.resolve(path)?;
        self.children(&at).ok_or_else(|| stale(path))
    }

    pub fn directory_mut(&mut self, path: &DirPath) -> Result<&mut Vec<Entry>> {
        let at = self.resolve(path)?;
        self.children_mut(&at).ok_or_else(|| stale(path))
    }
}

fn stale(path: &DirPath) -> TreeError {
    TreeError::Invariant(format!("resolved path {path} does not lead to a directory"))
}
