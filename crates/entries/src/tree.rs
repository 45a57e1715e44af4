//! A user's namespace and the mutations allowed on it.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryKind};
use crate::error::{Result, TreeError};
use crate::path::{validate_entry_name, DirPath};
use crate::resolve::IndexPath;

/// One user's root directory.
///
/// Serializes as a JSON array of entries and is always stored and loaded as a
/// whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    entries: Vec<Entry>,
}

/// A checked position for a new entry: the directory exists and holds no
/// sibling with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    dir: DirPath,
    parent: IndexPath,
    name: String,
}

impl Slot {
    pub fn dir(&self) -> &DirPath {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes a stored blob. A missing, blank or `null` blob is an empty
    /// tree.
    pub fn from_blob(blob: Option<&str>) -> Result<Self> {
        let blob = blob.map(str::trim).unwrap_or_default();
        if blob.is_empty() {
            return Ok(Self::new());
        }
        let entries: Option<Vec<Entry>> =
            serde_json::from_str(blob).map_err(|error| TreeError::Corrupt(error.to_string()))?;
        Ok(Self::from_entries(entries.unwrap_or_default()))
    }

    pub fn to_blob(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|error| TreeError::Invariant(error.to_string()))
    }

    /// Checks that an entry called `name` may be created in `dir`.
    ///
    /// Nothing is modified; the returned slot is consumed by [`Tree::insert`].
    pub fn reserve(&self, dir: &DirPath, name: &str) -> Result<Slot> {
        validate_entry_name("entry.name", name)?;
        let parent = self.resolve(dir)?;
        let siblings = self
            .children(&parent)
            .ok_or_else(|| TreeError::Invariant(format!("{dir} resolved to a non-directory")))?;
        if siblings.iter().any(|entry| entry.name == name) {
            return Err(TreeError::EntryAlreadyExists {
                dir: dir.to_string(),
                name: name.to_string(),
            });
        }
        Ok(Slot {
            dir: dir.clone(),
            parent,
            name: name.to_string(),
        })
    }

    /// Appends `entry` to the directory reserved by `slot`.
    pub fn insert(&mut self, slot: Slot, entry: Entry) -> Result<()> {
        if entry.name != slot.name {
            return Err(TreeError::Invariant(format!(
                "entry {} inserted into slot reserved for {}",
                entry.name, slot.name
            )));
        }
        if matches!(entry.kind, EntryKind::Unknown) {
            return Err(TreeError::Invariant(format!(
                "entry {} has unknown kind",
                entry.name
            )));
        }
        let siblings = self.children_mut(&slot.parent).ok_or_else(|| {
            TreeError::Invariant(format!("slot {} no longer resolves", slot.dir))
        })?;
        if siblings.iter().any(|sibling| sibling.name == entry.name) {
            return Err(TreeError::EntryAlreadyExists {
                dir: slot.dir.to_string(),
                name: slot.name,
            });
        }
        log::debug!(
            "insert {} entry {} into {}",
            entry.entry_type(),
            entry.name,
            slot.dir
        );
        siblings.push(entry);
        Ok(())
    }

    /// Reserves a slot and inserts `entry` in one step.
    pub fn create_entry(&mut self, dir: &DirPath, entry: Entry) -> Result<()> {
        let slot = self.reserve(dir, &entry.name)?;
        self.insert(slot, entry)
    }

    /// Removes `name` from the directory at `dir`.
    ///
    /// Deleting a name that is not present succeeds and changes nothing.
    /// A directory that still has children is refused. Returns the removed
    /// entry.
    pub fn delete_entry(&mut self, dir: &DirPath, name: &str) -> Result<Option<Entry>> {
        validate_entry_name("entryName", name)?;
        let siblings = self.directory_mut(dir)?;

        let blocked = siblings.iter().any(|entry| {
            entry.name == name && entry.children().is_some_and(|children| !children.is_empty())
        });
        if blocked {
            return Err(TreeError::DirectoryNotEmpty(dir.to_string()));
        }

        let (kept, dropped): (Vec<Entry>, Vec<Entry>) = std::mem::take(siblings)
            .into_iter()
            .partition(|entry| entry.name != name);
        *siblings = kept;

        let removed = dropped.into_iter().next();
        if let Some(entry) = &removed {
            log::debug!("removed {} entry {} from {}", entry.entry_type(), name, dir);
        }
        Ok(removed)
    }
}
