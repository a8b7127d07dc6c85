//! The area and iteration tree.
//!
//! Every project is a root node of type `PROJECT`. Its area and iteration
//! nodes hang below it, distinguished by node type. Paths are
//! backslash-separated and start with the project name, e.g.
//! `ProjectX\TeamA`.

use std::collections::HashMap;

use tracing::warn;

use super::NodeRecord;
use crate::core_fields::{self, node_types};

/// Path separator in area and iteration paths.
pub const PATH_SEPARATOR: char = '\\';

/// Which tree a path field addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeType {
    Area,
    Iteration,
}

impl TreeType {
    /// The integer id field that stores the node for this tree.
    #[must_use]
    pub const fn id_field(self) -> i32 {
        match self {
            Self::Area => core_fields::AREA_ID,
            Self::Iteration => core_fields::ITERATION_ID,
        }
    }

    /// Node type id of this tree's nodes.
    #[must_use]
    pub const fn node_type(self) -> i32 {
        match self {
            Self::Area => node_types::AREA,
            Self::Iteration => node_types::ITERATION,
        }
    }
}

/// Indexed hierarchy nodes.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: HashMap<i32, NodeRecord>,
    children: HashMap<i32, Vec<i32>>,
}

impl Hierarchy {
    /// Indexes the nodes. Duplicate ids keep the first row; nodes whose
    /// parent is unknown are kept but unreachable by path.
    #[must_use]
    pub fn new(records: Vec<NodeRecord>) -> Self {
        let mut nodes: HashMap<i32, NodeRecord> = HashMap::with_capacity(records.len());
        for record in records {
            if nodes.contains_key(&record.id) {
                warn!(node_id = record.id, "duplicate hierarchy node ignored");
                continue;
            }
            nodes.insert(record.id, record);
        }

        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        for node in nodes.values() {
            if let Some(parent) = node.parent {
                if nodes.contains_key(&parent) {
                    children.entry(parent).or_default().push(node.id);
                } else {
                    warn!(node_id = node.id, parent, "hierarchy node has unknown parent");
                }
            }
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }

        Self { nodes, children }
    }

    #[must_use]
    pub fn find(&self, id: i32) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn name(&self, id: i32) -> Option<&str> {
        self.find(id).map(|n| n.name.as_str())
    }

    /// The project node owning `id` (itself when `id` is a project).
    #[must_use]
    pub fn project_of(&self, id: i32) -> Option<&NodeRecord> {
        let mut current = self.find(id)?;
        for _ in 0..=self.nodes.len() {
            if current.type_id == node_types::PROJECT {
                return Some(current);
            }
            current = self.find(current.parent?)?;
        }
        warn!(node_id = id, "cycle in hierarchy parents");
        None
    }

    /// Full path of a node from its project, e.g. `ProjectX\TeamA`.
    #[must_use]
    pub fn path(&self, id: i32) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.find(id)?;
        loop {
            segments.push(current.name.as_str());
            if current.type_id == node_types::PROJECT {
                break;
            }
            current = self.find(current.parent?)?;
            if segments.len() > self.nodes.len() {
                warn!(node_id = id, "cycle in hierarchy parents");
                return None;
            }
        }
        segments.reverse();
        Some(segments.join(&PATH_SEPARATOR.to_string()))
    }

    /// Resolves a path within `project_id` in the given tree.
    ///
    /// Matching is case-insensitive. The project name alone resolves to the
    /// project node itself.
    #[must_use]
    pub fn resolve_path(&self, project_id: i32, path: &str, tree: TreeType) -> Option<i32> {
        let project = self.find(project_id)?;
        let mut segments = path
            .trim()
            .trim_matches(PATH_SEPARATOR)
            .split(PATH_SEPARATOR)
            .map(str::trim);

        let first = segments.next()?;
        if first.to_lowercase() != project.name.to_lowercase() {
            return None;
        }

        let mut current = project.id;
        for segment in segments {
            if segment.is_empty() {
                return None;
            }
            current = self.child_named(current, segment, tree)?;
        }
        Some(current)
    }

    fn child_named(&self, parent: i32, name: &str, tree: TreeType) -> Option<i32> {
        let folded = name.to_lowercase();
        self.children
            .get(&parent)?
            .iter()
            .filter_map(|id| self.find(*id))
            .find(|n| n.type_id == tree.node_type() && n.name.to_lowercase() == folded)
            .map(|n| n.id)
    }

    /// Every node name, in id order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut nodes: Vec<&NodeRecord> = self.nodes.values().collect();
        nodes.sort_unstable_by_key(|n| n.id);
        nodes.into_iter().map(|n| n.name.clone()).collect()
    }

    /// Names of nodes with the given type id, in id order.
    #[must_use]
    pub fn nodes_of_type(&self, type_id: i32) -> Vec<String> {
        let mut nodes: Vec<&NodeRecord> =
            self.nodes.values().filter(|n| n.type_id == type_id).collect();
        nodes.sort_unstable_by_key(|n| n.id);
        nodes.into_iter().map(|n| n.name.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i32, name: &str, parent: Option<i32>, type_id: i32) -> NodeRecord {
        NodeRecord {
            id,
            name: name.into(),
            parent,
            type_id,
        }
    }

    fn sample() -> Hierarchy {
        Hierarchy::new(vec![
            node(1, "ProjectX", None, node_types::PROJECT),
            node(2, "TeamA", Some(1), node_types::AREA),
            node(3, "Sub", Some(2), node_types::AREA),
            node(4, "Sprint 1", Some(1), node_types::ITERATION),
            node(5, "TeamA", Some(1), node_types::ITERATION),
        ])
    }

    #[test]
    fn resolves_paths_case_insensitively() {
        let h = sample();
        assert_eq!(h.resolve_path(1, "ProjectX\\TeamA", TreeType::Area), Some(2));
        assert_eq!(h.resolve_path(1, "projectx\\teama\\SUB", TreeType::Area), Some(3));
        assert_eq!(h.resolve_path(1, "ProjectX", TreeType::Area), Some(1));
    }

    #[test]
    fn tree_type_filters_children() {
        let h = sample();
        assert_eq!(h.resolve_path(1, "ProjectX\\TeamA", TreeType::Iteration), Some(5));
        assert_eq!(h.resolve_path(1, "ProjectX\\Sprint 1", TreeType::Area), None);
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let h = sample();
        assert_eq!(h.resolve_path(1, "Bogus\\Path", TreeType::Area), None);
        assert_eq!(h.resolve_path(1, "ProjectX\\\\TeamA", TreeType::Area), None);
        assert_eq!(h.resolve_path(99, "ProjectX", TreeType::Area), None);
    }

    #[test]
    fn path_and_project_walk_parents() {
        let h = sample();
        assert_eq!(h.path(3).as_deref(), Some("ProjectX\\TeamA\\Sub"));
        assert_eq!(h.project_of(3).map(|n| n.id), Some(1));
        assert_eq!(h.nodes_of_type(node_types::ITERATION), vec!["Sprint 1", "TeamA"]);
    }
}
