use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::allowed_values::AllowedValuesCollection;
use super::kind::FieldKind;
use super::storage::{BaseType, FieldType, StorageType};
use crate::convert::TypeConverter;
use crate::core_fields;
use crate::metadata::{FieldRecord, FieldUsageRecord};
use crate::value::{FieldValue, ValueType};

/// Which kind of data-store item a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUsage {
    None,
    WorkItem,
    WorkItemLink,
    WorkItemTypeExtension,
}

/// Fields that never carry over when copying a work item.
const NON_COPYABLE: &[i32] = &[
    core_fields::HISTORY,
    core_fields::CHANGED_DATE,
    core_fields::CHANGED_BY,
    core_fields::CREATED_DATE,
    core_fields::CREATED_BY,
    core_fields::STATE,
    core_fields::REASON,
    core_fields::WORK_ITEM_TYPE,
    core_fields::AUTHORIZED_DATE,
    core_fields::WATERMARK,
];

/// Immutable metadata of one field, shared by every work item.
#[derive(Debug)]
pub struct FieldDefinition {
    id: i32,
    name: String,
    reference_name: String,
    storage_type: StorageType,
    usage: FieldUsage,
    often_queried: bool,
    supports_text_query: bool,
    converter: TypeConverter,
    kind: FieldKind,
    allowed_values: OnceLock<Option<Arc<AllowedValuesCollection>>>,
}

impl FieldDefinition {
    #[must_use]
    pub fn new(record: &FieldRecord, usage_record: Option<&FieldUsageRecord>) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            reference_name: record.reference_name.clone(),
            storage_type: record.storage_type,
            usage: record.usage,
            often_queried: usage_record.is_some_and(|u| u.often_queried),
            supports_text_query: record.supports_text_query
                || usage_record.is_some_and(|u| u.supports_text_query),
            converter: TypeConverter::for_field_type(record.storage_type.field_type()),
            kind: FieldKind::for_field(record.id),
            allowed_values: OnceLock::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    #[must_use]
    pub const fn usage(&self) -> FieldUsage {
        self.usage
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub const fn converter(&self) -> TypeConverter {
        self.converter
    }

    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.storage_type.field_type()
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.field_type().value_type()
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.storage_type.is_ignored()
    }

    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.storage_type.is_readonly()
    }

    /// Readonly or tree-node typed.
    #[must_use]
    pub const fn is_computed(&self) -> bool {
        self.storage_type.is_readonly() || self.storage_type.is_base(BaseType::TreeNode)
    }

    /// Backed by a physical column: any known storage base type.
    #[must_use]
    pub const fn is_used_in_physical_type(&self) -> bool {
        self.storage_type.base_type().is_some()
    }

    #[must_use]
    pub const fn is_queryable(&self) -> bool {
        !self.is_ignored() && self.is_used_in_physical_type()
    }

    #[must_use]
    pub const fn is_sortable(&self) -> bool {
        self.is_queryable() && !self.is_large_text()
    }

    #[must_use]
    pub const fn is_large_text(&self) -> bool {
        self.storage_type.is_base(BaseType::LongText)
    }

    #[must_use]
    pub const fn is_long_text(&self) -> bool {
        matches!(
            self.field_type(),
            FieldType::PlainText | FieldType::Html | FieldType::History
        )
    }

    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.often_queried
    }

    #[must_use]
    pub const fn supports_text_query(&self) -> bool {
        self.supports_text_query
    }

    /// Whether values of this field carry over to a copied work item.
    #[must_use]
    pub fn can_copy(&self) -> bool {
        if NON_COPYABLE.contains(&self.id) || self.is_ignored() || self.is_readonly() {
            return false;
        }
        matches!(
            self.storage_type.base_type(),
            Some(
                BaseType::String
                    | BaseType::Integer
                    | BaseType::DateTime
                    | BaseType::LongText
                    | BaseType::Bit
                    | BaseType::Double
                    | BaseType::Guid
            )
        )
    }

    #[must_use]
    pub fn is_valid_type(&self, value: &FieldValue) -> bool {
        value.value_type() == self.value_type()
    }

    /// Display-name order, ignoring case.
    #[must_use]
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
    }

    /// Cached allowed values; `init` runs at most once per definition.
    pub(crate) fn allowed_values_or_init(
        &self,
        init: impl FnOnce() -> Option<AllowedValuesCollection>,
    ) -> Option<Arc<AllowedValuesCollection>> {
        self.allowed_values
            .get_or_init(|| init().map(Arc::new))
            .clone()
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.reference_name, self.id)
    }
}
