//! In-memory record of the menu items this process has created.
//!
//! The host offers no way to list context-menu items, so the reconciler
//! keeps its own list to know what to tear down on the next pass.

use crate::ids::{MENU_NEW_GROUP_ID, MENU_PARENT_ID};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MenuMirror {
    entries: Vec<MenuEntry>,
}

impl MenuMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a created item. Tracking an id twice keeps one entry.
    pub fn track(&mut self, id: impl Into<String>, parent_id: Option<&str>) {
        let id = id.into();
        if self.contains(&id) {
            return;
        }
        self.entries.push(MenuEntry {
            id,
            parent_id: parent_id.map(str::to_string),
        });
    }

    pub fn forget(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Per-group leaves under the submenu, i.e. everything a pass rebuilds.
    pub fn group_entries(&self) -> Vec<MenuEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                entry.parent_id.as_deref() == Some(MENU_PARENT_ID) && entry.id != MENU_NEW_GROUP_ID
            })
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
