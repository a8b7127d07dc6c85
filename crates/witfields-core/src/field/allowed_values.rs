//! Allowed-value computation for a field definition.
//!
//! Tree-node, node-name and authorized-as fields take their values straight
//! from the hierarchy or the identity constants. Every other field collects
//! the then-constants of the rules targeting it, groups them into slots by
//! traversal flags, and unions the populated constant sets.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use super::definition::FieldDefinition;
use super::storage::BaseType;
use crate::core_fields;
use crate::metadata::{ConstantSet, Metadata, RuleFlags};
use crate::value::ValueType;

pub use crate::metadata::constant_set::SlotFlags;

/// Immutable, deduplicated list of legal values for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedValuesCollection {
    values: Vec<String>,
}

impl AllowedValuesCollection {
    /// Deduplicates `values` and, when `sort` is set, orders them for the
    /// field's value type: numerically for integer and double fields,
    /// case-insensitively otherwise.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = String>, value_type: ValueType, sort: bool) -> Self {
        let mut seen = HashSet::new();
        let mut values: Vec<String> = values.into_iter().filter(|v| seen.insert(v.clone())).collect();
        if sort {
            match value_type {
                ValueType::Integer | ValueType::Double => values.sort_by(|a, b| cmp_numeric(a, b)),
                _ => values.sort_by(|a, b| cmp_folded(a, b)),
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.index_of(value).is_some()
    }

    #[must_use]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        let folded = value.to_lowercase();
        self.values.iter().position(|v| v.to_lowercase() == folded)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a AllowedValuesCollection {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

fn cmp_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn cmp_numeric(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => cmp_folded(a, b),
    }
}

/// Whether a rule contributes to the allowed values of its then-field.
///
/// Suggestions always do. Deny-write rules do when they name a concrete
/// (non-special) constant, are not pattern rules, and carry exactly one of
/// the unless / then-not inversions.
#[must_use]
pub fn should_use_rule(flags: RuleFlags, then_const: i32) -> bool {
    if flags.contains(RuleFlags::SUGGESTION) {
        return true;
    }
    flags.contains(RuleFlags::DENY_WRITE)
        && !flags.contains(RuleFlags::THEN_LIKE)
        && then_const >= 0
        && (flags.contains(RuleFlags::UNLESS) ^ flags.contains(RuleFlags::THEN_NOT))
}

/// Slot of a contributing rule.
#[must_use]
pub const fn slot_flags(flags: RuleFlags) -> SlotFlags {
    SlotFlags {
        one_level: flags.contains(RuleFlags::THEN_ONE_LEVEL),
        two_plus_levels: flags.contains(RuleFlags::THEN_TWO_PLUS_LEVELS),
        leaf: flags.contains(RuleFlags::THEN_LEAF),
        interior: flags.contains(RuleFlags::THEN_INTERIOR),
    }
}

/// Computes the raw allowed values of `definition`.
///
/// Returns `None` only for `System.NodeType`, whose values are not
/// resolvable from metadata.
#[must_use]
pub fn compute(metadata: &Metadata, definition: &FieldDefinition) -> Option<Vec<String>> {
    let id = definition.id();

    if definition.storage_type().is_base(BaseType::TreeNode) {
        return Some(metadata.hierarchy().nodes_of_type(id));
    }

    match id {
        core_fields::NODE_NAME => return Some(metadata.hierarchy().names()),
        core_fields::NODE_TYPE => {
            warn!(field_id = id, "allowed values of the node type field are not resolvable");
            return None;
        }
        core_fields::AUTHORIZED_AS => return Some(metadata.constants().identities()),
        _ => {}
    }

    let mut slots: [Vec<i32>; SlotFlags::COUNT] = Default::default();
    for rule in metadata.rules().for_field(id) {
        if should_use_rule(rule.flags, rule.then_const) {
            slots[slot_flags(rule.flags).index()].push(rule.then_const);
        }
    }

    let mut values = Vec::new();
    for (index, roots) in slots.iter().enumerate() {
        if roots.is_empty() {
            continue;
        }
        let set = ConstantSet::populate(
            metadata.constant_sets(),
            metadata.constants(),
            roots,
            SlotFlags::from_index(index),
        );
        values.extend(set.into_values());
    }

    debug!(field_id = id, count = values.len(), "computed allowed values");
    Some(values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_sort_puts_unparseable_last() {
        let c = AllowedValuesCollection::new(
            ["10", "9", "x", "1.5", "9"].map(String::from),
            ValueType::Integer,
            true,
        );
        assert_eq!(c.as_slice(), ["1.5", "9", "10", "x"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let c = AllowedValuesCollection::new(
            ["beta", "Alpha", "gamma"].map(String::from),
            ValueType::String,
            true,
        );
        assert_eq!(c.as_slice(), ["Alpha", "beta", "gamma"]);
        assert!(c.contains("ALPHA"));
        assert_eq!(c.index_of("Gamma"), Some(2));
    }

    #[test]
    fn unsorted_keeps_first_seen_order() {
        let c = AllowedValuesCollection::new(
            ["b", "a", "b"].map(String::from),
            ValueType::String,
            false,
        );
        assert_eq!(c.as_slice(), ["b", "a"]);
    }

    #[test]
    fn rule_selection() {
        assert!(should_use_rule(RuleFlags::SUGGESTION, -5));
        assert!(should_use_rule(RuleFlags::DENY_WRITE | RuleFlags::UNLESS, 3));
        assert!(should_use_rule(RuleFlags::DENY_WRITE | RuleFlags::THEN_NOT, 3));
        assert!(!should_use_rule(RuleFlags::DENY_WRITE | RuleFlags::UNLESS | RuleFlags::THEN_NOT, 3));
        assert!(!should_use_rule(RuleFlags::DENY_WRITE | RuleFlags::UNLESS, -1));
        assert!(!should_use_rule(RuleFlags::DENY_WRITE | RuleFlags::UNLESS | RuleFlags::THEN_LIKE, 3));
        assert!(!should_use_rule(RuleFlags::DEFAULT, 3));
    }

    #[test]
    fn slot_flags_follow_rule_flags() {
        let s = slot_flags(RuleFlags::THEN_ONE_LEVEL | RuleFlags::THEN_LEAF);
        assert!(s.one_level && s.leaf && !s.interior && !s.two_plus_levels);
        assert_eq!(s.index(), 0b0101);
    }
}
