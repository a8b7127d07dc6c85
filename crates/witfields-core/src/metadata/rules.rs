//! Rule flags and the rule table indexed by then-field.

use std::collections::HashMap;

use super::RuleRecord;

bitflags::bitflags! {
    /// Flags of a rule row. Serialized as `"SUGGESTION | THEN_LEAF"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct RuleFlags: u32 {
        /// Values are suggested, not enforced.
        const SUGGESTION = 1 << 0;
        /// Restricts writes to the then-field.
        const DENY_WRITE = 1 << 1;
        /// Inverts the rule condition.
        const UNLESS = 1 << 2;
        /// Inverts the then-clause.
        const THEN_NOT = 1 << 3;
        /// Then-constant is a pattern, not a value.
        const THEN_LIKE = 1 << 4;
        /// Take the direct members of the then-constant set.
        const THEN_ONE_LEVEL = 1 << 5;
        /// Take members below the first level.
        const THEN_TWO_PLUS_LEVELS = 1 << 6;
        /// Keep leaf members.
        const THEN_LEAF = 1 << 7;
        /// Keep members that are themselves sets.
        const THEN_INTERIOR = 1 << 8;
        /// Rule supplies a default value.
        const DEFAULT = 1 << 9;
    }
}

/// Rules grouped by the field their then-clause targets.
#[derive(Debug, Default)]
pub struct RuleTable {
    by_then_field: HashMap<i32, Vec<RuleRecord>>,
    len: usize,
}

impl RuleTable {
    #[must_use]
    pub fn new(rules: Vec<RuleRecord>) -> Self {
        let len = rules.len();
        let mut by_then_field: HashMap<i32, Vec<RuleRecord>> = HashMap::new();
        for rule in rules {
            by_then_field.entry(rule.then_field).or_default().push(rule);
        }
        Self { by_then_field, len }
    }

    /// Rules whose then-field is `field_id`, in snapshot order.
    #[must_use]
    pub fn for_field(&self, field_id: i32) -> &[RuleRecord] {
        self.by_then_field.get(&field_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip_as_names() {
        let flags = RuleFlags::SUGGESTION | RuleFlags::THEN_LEAF;
        let json = serde_json::to_string(&flags).expect("serialize");
        assert_eq!(json, r#""SUGGESTION | THEN_LEAF""#);
        let back: RuleFlags = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, flags);
    }

    #[test]
    fn groups_by_then_field() {
        let rule = |id, then_field| RuleRecord {
            id,
            then_field,
            then_const: 0,
            flags: RuleFlags::empty(),
        };
        let table = RuleTable::new(vec![rule(1, 2), rule(2, 3), rule(3, 2)]);
        assert_eq!(table.len(), 3);
        let ids: Vec<i32> = table.for_field(2).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(table.for_field(99).is_empty());
    }
}
