//! Per-field behavior records for the fields whose values are not stored.
//!
//! Most fields just hold an original and a pending value. A handful are
//! calculated from a sibling "backing" field (paths, node names, the team
//! project, authorized-as) or from the work item's link and attachment
//! collections. [`FieldKind`] names that behavior once so the value engine
//! can match on it instead of comparing field ids.

use crate::core_fields;
use crate::links::LinkKind;
use crate::metadata::hierarchy::TreeType;

/// How a field's value is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain stored value.
    Stored,
    /// `System.History`: a pending comment that is dirty iff non-null.
    History,
    /// Area or iteration path, backed by the matching node id field.
    NodePath(TreeType),
    /// Name of the area node, backed by `System.AreaId`.
    NodeName,
    /// Name of the project owning the area node, backed by `System.AreaId`.
    TeamProject,
    /// Person name, backed by `System.PersonId`.
    AuthorizedAs,
    /// Always recomputed from the link collection.
    LinkCount(LinkKind),
    /// Always recomputed from the attachment collection.
    AttachedFileCount,
}

impl FieldKind {
    #[must_use]
    pub const fn for_field(id: i32) -> Self {
        match id {
            core_fields::HISTORY => Self::History,
            core_fields::AREA_PATH => Self::NodePath(TreeType::Area),
            core_fields::ITERATION_PATH => Self::NodePath(TreeType::Iteration),
            core_fields::NODE_NAME => Self::NodeName,
            core_fields::TEAM_PROJECT => Self::TeamProject,
            core_fields::AUTHORIZED_AS => Self::AuthorizedAs,
            core_fields::HYPERLINK_COUNT => Self::LinkCount(LinkKind::Hyperlink),
            core_fields::EXTERNAL_LINK_COUNT => Self::LinkCount(LinkKind::External),
            core_fields::RELATED_LINK_COUNT => Self::LinkCount(LinkKind::Related),
            core_fields::ATTACHED_FILE_COUNT => Self::AttachedFileCount,
            _ => Self::Stored,
        }
    }

    /// The sibling field this kind delegates dirtiness and values to.
    #[must_use]
    pub const fn backing_field(self) -> Option<i32> {
        match self {
            Self::NodePath(tree) => Some(tree.id_field()),
            Self::NodeName | Self::TeamProject => Some(core_fields::AREA_ID),
            Self::AuthorizedAs => Some(core_fields::PERSON_ID),
            Self::Stored | Self::History | Self::LinkCount(_) | Self::AttachedFileCount => None,
        }
    }

    /// Calculated from a backing field; can be synthesized on demand when
    /// the backing field is present.
    #[must_use]
    pub const fn is_calculated(self) -> bool {
        self.backing_field().is_some()
    }

    /// Recomputed from the link or attachment collections on every read.
    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(self, Self::LinkCount(_) | Self::AttachedFileCount)
    }
}
