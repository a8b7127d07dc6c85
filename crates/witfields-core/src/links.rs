//! Links and file attachments of a work item.
//!
//! Both collections track pending additions and removals so that the count
//! fields can report the saved ("original") count next to the current one.

use serde::{Deserialize, Serialize};

/// Link categories counted by the link-count fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Hyperlink,
    External,
    Related,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Existing,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<T> {
    item: T,
    state: EntryState,
}

/// A list with pending adds and removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedList<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for TrackedList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: PartialEq> TrackedList<T> {
    /// A list of already-saved items.
    #[must_use]
    pub fn from_saved(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            entries: items
                .into_iter()
                .map(|item| Entry {
                    item,
                    state: EntryState::Existing,
                })
                .collect(),
        }
    }

    /// Adds a pending item. Re-adding a pending removal restores it; adding
    /// an item that is already present does nothing.
    pub fn add(&mut self, item: T) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.item == item) {
            if entry.state == EntryState::Removed {
                entry.state = EntryState::Existing;
            }
            return;
        }
        self.entries.push(Entry {
            item,
            state: EntryState::Added,
        });
    }

    /// Removes an item. Returns `false` when it is not present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.state != EntryState::Removed && &e.item == item)
        else {
            return false;
        };
        if self.entries[pos].state == EntryState::Added {
            self.entries.remove(pos);
        } else {
            self.entries[pos].state = EntryState::Removed;
        }
        true
    }

    /// Items counted by `filter`, either as saved (`original`) or as they
    /// are now.
    pub fn count_where(&self, original: bool, filter: impl Fn(&T) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|e| match e.state {
                EntryState::Existing => true,
                EntryState::Added => !original,
                EntryState::Removed => original,
            })
            .filter(|e| filter(&e.item))
            .count()
    }

    #[must_use]
    pub fn count(&self, original: bool) -> usize {
        self.count_where(original, |_| true)
    }

    /// Current items.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(|e| e.state != EntryState::Removed)
            .map(|e| &e.item)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.entries.iter().any(|e| e.state != EntryState::Existing)
    }

    /// Makes pending changes permanent.
    pub fn commit(&mut self) {
        self.entries.retain(|e| e.state != EntryState::Removed);
        for entry in &mut self.entries {
            entry.state = EntryState::Existing;
        }
    }

    /// Discards pending changes.
    pub fn revert(&mut self) {
        self.entries.retain(|e| e.state != EntryState::Added);
        for entry in &mut self.entries {
            entry.state = EntryState::Existing;
        }
    }
}

/// One work-item link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub kind: LinkKind,
    pub target: String,
}

/// One attached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub length: u64,
}

pub type LinkCollection = TrackedList<Link>;
pub type AttachmentCollection = TrackedList<Attachment>;

impl LinkCollection {
    #[must_use]
    pub fn count_of(&self, kind: LinkKind, original: bool) -> usize {
        self.count_where(original, |l| l.kind == kind)
    }
}
