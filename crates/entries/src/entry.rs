//! Entry model and its wire form.
//!
//! On the wire an entry is a flat object:
//! `{ name, type, comment, icon, appId?, children? }`. In memory the kind is a
//! sum type so `appId` only exists on applications and `children` only on
//! directories.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TreeError};

/// Identifier of an application record owned by the application store.
pub type AppId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireEntry")]
pub struct Entry {
    pub name: String,
    pub comment: String,
    pub icon: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory { children: Vec<Entry> },
    Application { app_id: AppId },
    /// Stored data with a type this build does not recognize. Kept so the
    /// tree round-trips; never produced by create.
    Unknown,
}

/// The `type` tag of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryType {
    Directory,
    Application,
    #[default]
    Unknown,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Directory => "directory",
            EntryType::Application => "application",
            EntryType::Unknown => "unknown",
        }
    }

    /// Case-insensitive; `app` is the legacy spelling of `application`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "directory" => EntryType::Directory,
            "application" | "app" => EntryType::Application,
            _ => EntryType::Unknown,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TagVisitor;

        impl Visitor<'_> for TagVisitor {
            type Value = EntryType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an entry type string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<EntryType, E> {
                Ok(EntryType::from_tag(value))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<EntryType, E> {
                Ok(EntryType::Unknown)
            }
        }

        deserializer.deserialize_any(TagVisitor)
    }
}

impl Entry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            icon: String::new(),
            kind: EntryKind::Directory {
                children: Vec::new(),
            },
        }
    }

    pub fn application(name: impl Into<String>, app_id: AppId) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            icon: String::new(),
            kind: EntryKind::Application { app_id },
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_children(mut self, entries: Vec<Entry>) -> Self {
        if let EntryKind::Directory { children } = &mut self.kind {
            *children = entries;
        }
        self
    }

    pub fn entry_type(&self) -> EntryType {
        match self.kind {
            EntryKind::Directory { .. } => EntryType::Directory,
            EntryKind::Application { .. } => EntryType::Application,
            EntryKind::Unknown => EntryType::Unknown,
        }
    }

    pub fn children(&self) -> Option<&[Entry]> {
        match &self.kind {
            EntryKind::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Entry>> {
        match &mut self.kind {
            EntryKind::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub fn app_id(&self) -> Option<AppId> {
        match self.kind {
            EntryKind::Application { app_id } => Some(app_id),
            _ => None,
        }
    }
}

/// Kinds a caller may create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewEntryKind {
    Directory,
    Application,
}

impl NewEntryKind {
    pub fn parse(field: &'static str, tag: &str) -> Result<Self> {
        match EntryType::from_tag(tag) {
            EntryType::Directory => Ok(NewEntryKind::Directory),
            EntryType::Application => Ok(NewEntryKind::Application),
            EntryType::Unknown => Err(TreeError::invalid(
                field,
                format!("unsupported entry type {tag:?}"),
            )),
        }
    }
}

/// Caller-supplied description of an entry to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub kind: NewEntryKind,
    pub comment: String,
    pub icon: String,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, kind: NewEntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            comment: String::new(),
            icon: String::new(),
        }
    }

    /// Builds the stored entry. Applications need the id of their freshly
    /// created record.
    pub fn into_entry(self, app_id: Option<AppId>) -> Result<Entry> {
        let kind = match (self.kind, app_id) {
            (NewEntryKind::Directory, _) => EntryKind::Directory {
                children: Vec::new(),
            },
            (NewEntryKind::Application, Some(app_id)) => EntryKind::Application { app_id },
            (NewEntryKind::Application, None) => {
                return Err(TreeError::Invariant(format!(
                    "application entry {} has no app record",
                    self.name
                )))
            }
        };
        Ok(Entry {
            name: self.name,
            comment: self.comment,
            icon: self.icon,
            kind,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    entry_type: EntryType,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    app_id: Option<AppId>,
    #[serde(default)]
    children: Option<Vec<Entry>>,
}

impl From<WireEntry> for Entry {
    fn from(wire: WireEntry) -> Self {
        let kind = match wire.entry_type {
            EntryType::Directory => EntryKind::Directory {
                children: wire.children.unwrap_or_default(),
            },
            EntryType::Application => EntryKind::Application {
                app_id: wire.app_id.unwrap_or_default(),
            },
            EntryType::Unknown => EntryKind::Unknown,
        };
        Entry {
            name: wire.name,
            comment: wire.comment.unwrap_or_default(),
            icon: wire.icon.unwrap_or_default(),
            kind,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntryRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    entry_type: EntryType,
    comment: &'a str,
    icon: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<AppId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<&'a [Entry]>,
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireEntryRef {
            name: &self.name,
            entry_type: self.entry_type(),
            comment: &self.comment,
            icon: &self.icon,
            app_id: self.app_id(),
            children: self.children(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_wire_form_has_no_children() {
        let entry = Entry::application("report", 7).with_icon("chart");
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(
            value,
            json!({
                "name": "report",
                "type": "application",
                "comment": "",
                "icon": "chart",
                "appId": 7
            })
        );
    }

    #[test]
    fn directory_wire_form_has_no_app_id() {
        let entry = Entry::directory("a").with_children(vec![Entry::application("b", 1)]);
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["type"], "directory");
        assert!(value.get("appId").is_none());
        assert_eq!(value["children"][0]["name"], "b");
    }

    #[test]
    fn legacy_app_tag_and_case_are_accepted() {
        let entry: Entry =
            serde_json::from_value(json!({ "name": "x", "type": "APP", "appId": 3 }))
                .expect("decode");
        assert_eq!(entry.app_id(), Some(3));
        assert_eq!(entry.comment, "");
    }

    #[test]
    fn null_children_decode_as_empty_directory() {
        let entry: Entry = serde_json::from_value(json!({
            "name": "docs",
            "type": "directory",
            "comment": "",
            "icon": "",
            "appId": 0,
            "children": null
        }))
        .expect("decode");
        assert_eq!(entry.children(), Some(&[][..]));
    }

    #[test]
    fn unrecognized_type_decodes_as_unknown() {
        let entry: Entry = serde_json::from_value(json!({ "name": "?", "type": "symlink" }))
            .expect("decode");
        assert_eq!(entry.entry_type(), EntryType::Unknown);
        assert_eq!(serde_json::to_value(&entry).expect("serialize")["type"], "unknown");

        let untyped: Entry = serde_json::from_value(json!({ "name": "?", "type": null }))
            .expect("decode");
        assert_eq!(untyped.kind, EntryKind::Unknown);
    }

    #[test]
    fn new_entry_kind_rejects_unknown() {
        assert_eq!(
            NewEntryKind::parse("entry.type", "Directory"),
            Ok(NewEntryKind::Directory)
        );
        let err = NewEntryKind::parse("entry.type", "unknown").expect_err("unknown type");
        assert!(matches!(err, TreeError::InvalidParameter { field: "entry.type", .. }));
    }

    #[test]
    fn application_requires_app_id() {
        let pending = NewEntry::new("c", NewEntryKind::Application);
        assert!(matches!(
            pending.clone().into_entry(None),
            Err(TreeError::Invariant(_))
        ));
        assert_eq!(pending.into_entry(Some(9)).expect("entry").app_id(), Some(9));
    }
}
