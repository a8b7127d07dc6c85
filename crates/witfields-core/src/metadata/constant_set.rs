//! Constant sets: named lists of constants that can nest.
//!
//! A rule's then-constant usually names a set ("Allowed States") rather than
//! a single value. Which members count depends on the rule's level and leaf
//! flags, captured in [`SlotFlags`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::{ConstantSetEntry, Constants};

/// Membership graph from the constant-sets table.
#[derive(Debug, Default)]
pub struct ConstantSetGraph {
    children: HashMap<i32, Vec<i32>>,
}

impl ConstantSetGraph {
    #[must_use]
    pub fn new(entries: &[ConstantSetEntry]) -> Self {
        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        for entry in entries {
            children.entry(entry.parent).or_default().push(entry.child);
        }
        Self { children }
    }

    /// True when `id` has members.
    #[must_use]
    pub fn is_set(&self, id: i32) -> bool {
        self.children.contains_key(&id)
    }

    fn children_of(&self, parents: &HashSet<i32>) -> HashSet<i32> {
        parents
            .iter()
            .filter_map(|p| self.children.get(p))
            .flatten()
            .copied()
            .collect()
    }
}

/// Traversal flags of one allowed-values slot.
///
/// The four flags map onto a 4-bit slot index so that rules with the same
/// flags can share one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotFlags {
    pub one_level: bool,
    pub two_plus_levels: bool,
    pub leaf: bool,
    pub interior: bool,
}

impl SlotFlags {
    /// Number of distinct slots.
    pub const COUNT: usize = 16;

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.one_level)
            | (usize::from(self.two_plus_levels) << 1)
            | (usize::from(self.leaf) << 2)
            | (usize::from(self.interior) << 3)
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self {
            one_level: index & 1 != 0,
            two_plus_levels: index & 2 != 0,
            leaf: index & 4 != 0,
            interior: index & 8 != 0,
        }
    }

    /// Neither level flag: every root is a value by itself.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        !self.one_level && !self.two_plus_levels
    }
}

/// The populated values of one or more constant-set roots, in the order
/// they were reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantSet {
    values: Vec<String>,
    seen_values: HashSet<String>,
    const_ids: HashSet<i32>,
}

impl ConstantSet {
    /// Populates a set from `roots` with the given traversal flags.
    #[must_use]
    pub fn populate(
        graph: &ConstantSetGraph,
        constants: &Constants,
        roots: &[i32],
        flags: SlotFlags,
    ) -> Self {
        debug!(?roots, ?flags, "populate constant set");

        let mut set = Self::default();

        if flags.is_singleton() {
            set.add_constants(constants, roots.iter().copied());
            return set;
        }

        let mut visited: HashSet<i32> = roots.iter().copied().collect();
        let mut frontier = set.expand(
            graph,
            constants,
            &visited,
            flags.one_level && flags.leaf,
            flags.one_level && flags.interior,
            flags.two_plus_levels,
        );
        frontier.retain(|id| !visited.contains(id));
        visited.extend(frontier.iter().copied());

        while !frontier.is_empty() {
            let mut next = set.expand(graph, constants, &frontier, flags.leaf, flags.interior, true);
            next.retain(|id| !visited.contains(id));
            visited.extend(next.iter().copied());
            frontier = next;
        }

        set
    }

    /// Adds one level below `parents` and returns the member ids that are
    /// themselves sets when `need_children` is set.
    fn expand(
        &mut self,
        graph: &ConstantSetGraph,
        constants: &Constants,
        parents: &HashSet<i32>,
        add_leaf: bool,
        add_interior: bool,
        need_children: bool,
    ) -> HashSet<i32> {
        let mut child_ids = graph.children_of(parents);
        let self_contained: HashSet<i32> = parents.intersection(&child_ids).copied().collect();
        child_ids.retain(|id| !self_contained.contains(id));

        let mut to_add: Vec<i32> = Vec::new();
        if add_leaf {
            to_add.extend(child_ids.iter().copied().filter(|id| !graph.is_set(*id)));
            to_add.extend(self_contained.iter().copied());
        }

        let mut interior = HashSet::new();
        if add_interior || need_children {
            interior = child_ids.iter().copied().filter(|id| graph.is_set(*id)).collect();
            if add_interior {
                to_add.extend(interior.iter().copied());
            }
        }

        to_add.sort_unstable();
        self.add_constants(constants, to_add);

        if need_children { interior } else { HashSet::new() }
    }

    fn add_constants(&mut self, constants: &Constants, ids: impl IntoIterator<Item = i32>) {
        for id in ids {
            match constants.get(id) {
                Some(constant) => {
                    if self.const_ids.insert(id) && self.seen_values.insert(constant.display().to_string()) {
                        self.values.push(constant.display().to_string());
                    }
                }
                None => warn!(const_id = id, "constant set member has no constant row"),
            }
        }
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        let folded = value.to_lowercase();
        self.values.iter().any(|v| v.to_lowercase() == folded)
    }

    #[must_use]
    pub fn contains_const_id(&self, id: i32) -> bool {
        self.const_ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}
