//! Server metadata: field records, the area/iteration hierarchy, constants,
//! constant-set memberships and the rule table.
//!
//! A [`MetadataSnapshot`] is the serialized form (JSON). [`Metadata`] is the
//! indexed, read-only view built from it and shared by every work item of
//! one context.

pub mod constant_set;
pub mod hierarchy;
pub mod rules;

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FieldError;
use crate::field::FieldUsage;
use crate::field::storage::StorageType;

pub use constant_set::{ConstantSet, ConstantSetGraph};
pub use hierarchy::{Hierarchy, TreeType};
pub use rules::{RuleFlags, RuleTable};

/// One field definition as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub id: i32,
    pub name: String,
    pub reference_name: String,
    pub storage_type: StorageType,
    #[serde(default = "default_usage")]
    pub usage: FieldUsage,
    #[serde(default)]
    pub supports_text_query: bool,
}

const fn default_usage() -> FieldUsage {
    FieldUsage::WorkItem
}

/// Per-field usage flags of the work-item data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUsageRecord {
    pub field_id: i32,
    #[serde(default)]
    pub often_queried: bool,
    #[serde(default)]
    pub supports_text_query: bool,
}

/// One area/iteration hierarchy node. Project nodes have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub parent: Option<i32>,
    pub type_id: i32,
}

/// One row of the constants table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRecord {
    pub id: i32,
    pub string: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_identity: bool,
}

impl ConstantRecord {
    /// The display name, falling back to the raw string.
    #[must_use]
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.string)
    }
}

/// Membership of `child` in the constant set `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantSetEntry {
    pub parent: i32,
    pub child: i32,
}

/// One rule row. Only the columns allowed-value computation reads are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: i32,
    pub then_field: i32,
    pub then_const: i32,
    #[serde(default)]
    pub flags: RuleFlags,
}

/// Serialized metadata for one server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub field_usages: Vec<FieldUsageRecord>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub constants: Vec<ConstantRecord>,
    #[serde(default)]
    pub constant_sets: Vec<ConstantSetEntry>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

impl MetadataSnapshot {
    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Metadata`] when the text is not a valid snapshot.
    pub fn from_json(text: &str) -> Result<Self, FieldError> {
        serde_json::from_str(text).map_err(|e| FieldError::Metadata(e.to_string()))
    }

    /// Reads and parses a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata snapshot {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse metadata snapshot {}", path.display()))
    }
}

/// Indexed constants table.
#[derive(Debug, Default)]
pub struct Constants {
    by_id: HashMap<i32, ConstantRecord>,
}

impl Constants {
    #[must_use]
    pub fn get(&self, id: i32) -> Option<&ConstantRecord> {
        self.by_id.get(&id)
    }

    /// Display value of a constant, if it exists.
    #[must_use]
    pub fn display(&self, id: i32) -> Option<&str> {
        self.get(id).map(ConstantRecord::display)
    }

    /// Display values of every identity constant, in id order.
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        let mut people: Vec<&ConstantRecord> =
            self.by_id.values().filter(|c| c.is_identity).collect();
        people.sort_unstable_by_key(|c| c.id);
        people.into_iter().map(|c| c.display().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Read-only indexed metadata.
#[derive(Debug, Default)]
pub struct Metadata {
    fields: Vec<FieldRecord>,
    usages: HashMap<i32, FieldUsageRecord>,
    hierarchy: Hierarchy,
    constants: Constants,
    constant_sets: ConstantSetGraph,
    rules: RuleTable,
}

impl Metadata {
    /// Builds the indexes.
    ///
    /// Duplicate constant or usage rows keep the last occurrence and are
    /// logged; hierarchy problems are reported by [`Hierarchy::new`].
    #[must_use]
    pub fn new(snapshot: MetadataSnapshot) -> Self {
        let MetadataSnapshot {
            fields,
            field_usages,
            nodes,
            constants,
            constant_sets,
            rules,
        } = snapshot;

        let mut usages = HashMap::with_capacity(field_usages.len());
        for usage in field_usages {
            if usages.insert(usage.field_id, usage).is_some() {
                warn!(field_id = usage.field_id, "duplicate field usage row");
            }
        }

        let mut by_id = HashMap::with_capacity(constants.len());
        for constant in constants {
            let id = constant.id;
            if by_id.insert(id, constant).is_some() {
                warn!(const_id = id, "duplicate constant row");
            }
        }

        Self {
            fields,
            usages,
            hierarchy: Hierarchy::new(nodes),
            constants: Constants { by_id },
            constant_sets: ConstantSetGraph::new(&constant_sets),
            rules: RuleTable::new(rules),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    #[must_use]
    pub fn usage(&self, field_id: i32) -> Option<&FieldUsageRecord> {
        self.usages.get(&field_id)
    }

    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub const fn constants(&self) -> &Constants {
        &self.constants
    }

    #[must_use]
    pub const fn constant_sets(&self) -> &ConstantSetGraph {
        &self.constant_sets
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }
}
