//! Multi-key index over fields: by id, by reference name and by display
//! name, each in an exact and a case-folded variant.
//!
//! The cache is append-only. Every entry stays reachable by all of its keys
//! for the life of the cache. One mutex guards all indexes so that readers
//! never observe an entry that is present in one index but not another.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::FieldError;

/// Separator that distinguishes reference names from display names.
pub const REFERENCE_SEPARATOR: char = '.';

/// Lookup key: a field id or a name.
///
/// Names containing [`REFERENCE_SEPARATOR`] are reference names
/// (`System.State`); all others are display names (`State`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey<'a> {
    Id(i32),
    Name(&'a str),
}

impl FieldKey<'_> {
    #[must_use]
    pub fn is_reference_name(&self) -> bool {
        matches!(self, Self::Name(n) if n.contains(REFERENCE_SEPARATOR))
    }
}

impl From<i32> for FieldKey<'_> {
    fn from(id: i32) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a str> for FieldKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for FieldKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug)]
struct Indexes<T> {
    entries: Vec<T>,
    by_id: HashMap<i32, usize>,
    by_reference: HashMap<String, usize>,
    by_reference_folded: HashMap<String, usize>,
    by_display: HashMap<String, usize>,
    by_display_folded: HashMap<String, usize>,
}

impl<T> Default for Indexes<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_id: HashMap::new(),
            by_reference: HashMap::new(),
            by_reference_folded: HashMap::new(),
            by_display: HashMap::new(),
            by_display_folded: HashMap::new(),
        }
    }
}

/// Multi-index cache of `T` keyed by field id, reference name and display
/// name.
#[derive(Debug)]
pub struct FieldReferenceCache<T> {
    case_sensitive: bool,
    inner: Mutex<Indexes<T>>,
}

impl<T: Clone> FieldReferenceCache<T> {
    /// Creates an empty cache. With `case_sensitive == false` names are
    /// matched through the case-folded indexes.
    #[must_use]
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            inner: Mutex::new(Indexes::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Indexes<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Adds `value` under all of its keys.
    ///
    /// # Errors
    ///
    /// - [`FieldError::InvalidReferenceName`] when `reference_name` lacks the
    ///   `.` separator.
    /// - [`FieldError::InvalidDisplayName`] when `display_name` is empty or
    ///   contains a `.`.
    /// - [`FieldError::DuplicateField`] when the id or reference name is
    ///   already present.
    pub fn put(
        &self,
        value: T,
        display_name: &str,
        reference_name: &str,
        id: i32,
    ) -> Result<(), FieldError> {
        if !reference_name.contains(REFERENCE_SEPARATOR) {
            return Err(FieldError::InvalidReferenceName(reference_name.to_string()));
        }
        if display_name.is_empty() || display_name.contains(REFERENCE_SEPARATOR) {
            return Err(FieldError::InvalidDisplayName(display_name.to_string()));
        }

        let mut idx = self.lock();
        if idx.by_id.contains_key(&id) {
            return Err(FieldError::DuplicateField { id });
        }
        let folded_reference = reference_name.to_lowercase();
        if idx.by_reference.contains_key(reference_name)
            || idx.by_reference_folded.contains_key(&folded_reference)
        {
            return Err(FieldError::DuplicateField { id });
        }

        let slot = idx.entries.len();
        idx.entries.push(value);
        idx.by_id.insert(id, slot);
        idx.by_reference.insert(reference_name.to_string(), slot);
        idx.by_reference_folded.insert(folded_reference, slot);
        idx.by_display.entry(display_name.to_string()).or_insert(slot);
        idx.by_display_folded
            .entry(display_name.to_lowercase())
            .or_insert(slot);
        drop(idx);
        Ok(())
    }

    /// Looks up an entry by id or name.
    #[must_use]
    pub fn get<'k>(&self, key: impl Into<FieldKey<'k>>) -> Option<T> {
        let idx = self.lock();
        let key = key.into();
        let slot = match key {
            FieldKey::Id(id) => idx.by_id.get(&id).copied(),
            FieldKey::Name(name) => {
                match (key.is_reference_name(), self.case_sensitive) {
                    (true, true) => idx.by_reference.get(name).copied(),
                    (true, false) => idx.by_reference_folded.get(&name.to_lowercase()).copied(),
                    (false, true) => idx.by_display.get(name).copied(),
                    (false, false) => idx.by_display_folded.get(&name.to_lowercase()).copied(),
                }
            }
        };
        slot.and_then(|s| idx.entries.get(s).cloned())
    }

    #[must_use]
    pub fn contains<'k>(&self, key: impl Into<FieldKey<'k>>) -> bool {
        self.get(key).is_some()
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.lock().entries.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> FieldReferenceCache<&'static str> {
        let c = FieldReferenceCache::new(false);
        c.put("state", "State", "System.State", 2).expect("put state");
        c.put("title", "Title", "System.Title", 1).expect("put title");
        c
    }

    #[test]
    fn every_key_reaches_the_entry() {
        let c = cache();
        assert_eq!(c.get(2), Some("state"));
        assert_eq!(c.get("System.State"), Some("state"));
        assert_eq!(c.get("system.state"), Some("state"));
        assert_eq!(c.get("State"), Some("state"));
        assert_eq!(c.get("STATE"), Some("state"));
        assert_eq!(c.get("Missing"), None);
        assert_eq!(c.get(99), None);
    }

    #[test]
    fn dotted_names_are_reference_names() {
        assert!(FieldKey::from("System.State").is_reference_name());
        assert!(!FieldKey::from("State").is_reference_name());
        assert!(!FieldKey::from(2).is_reference_name());
    }

    #[test]
    fn case_sensitive_cache_uses_exact_indexes() {
        let c = FieldReferenceCache::new(true);
        c.put(1, "Title", "System.Title", 1).expect("put");
        assert_eq!(c.get("Title"), Some(1));
        assert_eq!(c.get("title"), None);
        assert_eq!(c.get("system.title"), None);
    }

    #[test]
    fn rejects_malformed_names() {
        let c: FieldReferenceCache<u8> = FieldReferenceCache::new(false);
        assert_eq!(
            c.put(0, "State", "State", 2),
            Err(FieldError::InvalidReferenceName("State".into()))
        );
        assert_eq!(
            c.put(0, "", "System.State", 2),
            Err(FieldError::InvalidDisplayName(String::new()))
        );
        assert_eq!(
            c.put(0, "Sys.State", "System.State", 2),
            Err(FieldError::InvalidDisplayName("Sys.State".into()))
        );
        assert!(c.is_empty());
    }

    #[test]
    fn rejects_duplicates() {
        let c = cache();
        assert_eq!(
            c.put("x", "Other", "Custom.Other", 2),
            Err(FieldError::DuplicateField { id: 2 })
        );
        assert_eq!(
            c.put("x", "Other", "SYSTEM.STATE", 77),
            Err(FieldError::DuplicateField { id: 77 })
        );
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn values_keep_insertion_order() {
        assert_eq!(cache().values(), vec!["state", "title"]);
    }
}
