//! The fields of one work item.
//!
//! Fields are created lazily from definitions and never removed. Each field
//! lives in a `Vec` slot; the reference cache maps every key of its
//! definition to that slot.

use std::sync::Arc;

use tracing::{trace, warn};

use super::definition::FieldDefinition;
use super::kind::FieldKind;
use super::reference_cache::{FieldKey, FieldReferenceCache};
use super::state::Field;
use super::status::FieldModificationType;
use crate::context::WitContext;
use crate::core_fields;
use crate::error::FieldError;
use crate::value::FieldValue;

#[derive(Debug)]
pub struct FieldCollection {
    ctx: Arc<WitContext>,
    fields: Vec<Field>,
    index: FieldReferenceCache<usize>,
}

impl FieldCollection {
    #[must_use]
    pub fn new(ctx: Arc<WitContext>) -> Self {
        let case_sensitive = ctx.config().names.case_sensitive;
        Self {
            ctx,
            fields: Vec::new(),
            index: FieldReferenceCache::new(case_sensitive),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    #[must_use]
    pub fn has_field(&self, id: i32) -> bool {
        self.index.contains(id)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Slot of an existing field. Never creates.
    #[must_use]
    pub fn index_of<'k>(&self, key: impl Into<FieldKey<'k>>) -> Option<usize> {
        self.index.get(key)
    }

    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub(crate) fn slot(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Field {
        &mut self.fields[index]
    }

    fn unknown(&self, key: FieldKey<'_>) -> FieldError {
        FieldError::UnknownField {
            key: key.to_string(),
            size: self.fields.len(),
        }
    }

    /// Adds a field for `definition`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DuplicateField`] if the field already exists.
    pub fn add_field(&mut self, definition: Arc<FieldDefinition>) -> Result<usize, FieldError> {
        let id = definition.id();
        if self.has_field(id) {
            return Err(FieldError::DuplicateField { id });
        }
        let slot = self.fields.len();
        self.index
            .put(slot, definition.name(), definition.reference_name(), id)?;
        self.fields.push(Field::new(definition));
        Ok(slot)
    }

    /// Creates fields for the definitions that do not have one yet.
    ///
    /// # Errors
    ///
    /// Returns the cache error when a definition's names are malformed.
    pub fn ensure_fields_exist(&mut self, definitions: &[Arc<FieldDefinition>]) -> Result<(), FieldError> {
        for definition in definitions {
            if !self.has_field(definition.id()) {
                self.add_field(Arc::clone(definition))?;
            }
        }
        Ok(())
    }

    /// Ensures a field for every work-item definition with a physical column.
    ///
    /// # Errors
    ///
    /// Returns the cache error when a definition's names are malformed.
    pub fn ensure_all_fields_in_physical_type(&mut self) -> Result<(), FieldError> {
        let definitions = self.ctx.registry().physical_type_definitions();
        self.ensure_fields_exist(&definitions)
    }

    /// Looks up a field, optionally creating it from its definition.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when the field is missing and
    /// `create` is false, or when no physical-type definition matches.
    pub fn find_field_internal<'k>(
        &mut self,
        key: impl Into<FieldKey<'k>>,
        create: bool,
    ) -> Result<usize, FieldError> {
        let key = key.into();
        if let Some(slot) = self.index_of(key) {
            return Ok(slot);
        }
        if !create {
            return Err(self.unknown(key));
        }
        match self.ctx.registry().get(key) {
            Some(def) if def.is_used_in_physical_type() => self.add_field(def),
            _ => Err(self.unknown(key)),
        }
    }

    /// Looks up a field, synthesizing calculated fields whose backing field
    /// is present.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when the field is neither
    /// present nor synthesizable.
    pub fn get_field_internal<'k>(&mut self, key: impl Into<FieldKey<'k>>) -> Result<usize, FieldError> {
        let key = key.into();
        if let Some(slot) = self.index_of(key) {
            return Ok(slot);
        }
        match self.add_calculated_field_if_possible(key)? {
            Some(slot) => Ok(slot),
            None => Err(self.unknown(key)),
        }
    }

    fn add_calculated_field_if_possible(&mut self, key: FieldKey<'_>) -> Result<Option<usize>, FieldError> {
        let Some(def) = self.ctx.registry().get(key) else {
            return Ok(None);
        };
        if !def.is_used_in_physical_type() {
            return Ok(None);
        }
        match def.kind().backing_field() {
            Some(backing) if self.has_field(backing) => {
                trace!(field_id = def.id(), backing, "adding calculated field");
                self.add_field(def).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Sets an original value from a server string.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] as [`Self::find_field_internal`]
    /// does.
    pub fn add_original_value_from_server<'k>(
        &mut self,
        key: impl Into<FieldKey<'k>>,
        data: &str,
        create: bool,
    ) -> Result<(), FieldError> {
        let slot = self.find_field_internal(key, create)?;
        self.fields[slot].set_original_from_server(data);
        Ok(())
    }

    /// Sets an already-typed original value.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] for a missing field and
    /// [`FieldError::InvalidValueType`] when `value` has the wrong type.
    pub fn add_original_value_local(
        &mut self,
        id: i32,
        value: Option<FieldValue>,
        create: bool,
    ) -> Result<(), FieldError> {
        let slot = self.find_field_internal(id, create)?;
        self.fields[slot].set_original_local(value)
    }

    /// Dirtiness of one field, delegating calculated fields to their
    /// backing field while no original was set on them directly.
    #[must_use]
    pub fn is_field_dirty(&self, index: usize) -> bool {
        let field = self.slot(index);
        if field.kind() == FieldKind::History {
            return field.stored_new_value().is_some();
        }
        match field.kind().backing_field() {
            Some(backing) if !field.is_original_set() => {
                if let Some(slot) = self.index_of(backing) {
                    self.is_field_dirty(slot)
                } else {
                    warn!(field_id = field.id(), backing, "backing field missing");
                    false
                }
            }
            _ => field.is_new_value_set(),
        }
    }

    /// Editability of one field.
    #[must_use]
    pub fn is_field_editable(&self, index: usize) -> bool {
        let field = self.slot(index);
        let def = field.definition();

        if let FieldKind::NodePath(tree) = field.kind() {
            return self
                .index_of(tree.id_field())
                .is_some_and(|slot| self.is_field_editable(slot));
        }
        if matches!(def.id(), core_fields::WORK_ITEM_TYPE | core_fields::CREATED_BY) {
            return false;
        }
        if def.is_ignored() || def.is_readonly() {
            return false;
        }
        !field.is_rule_read_only() && field.server_computed_type().is_none()
    }

    /// Whether any field was dirtied by a user edit.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        (0..self.fields.len()).any(|i| {
            self.is_field_dirty(i)
                && self.slot(i).modification_type() == Some(FieldModificationType::User)
        })
    }

    /// Whether every field is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.status().is_valid())
    }

    /// Ids of the invalid fields.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<i32> {
        self.fields
            .iter()
            .filter(|f| !f.status().is_valid())
            .map(Field::id)
            .collect()
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }

    pub fn reset_after_update(&mut self) {
        for field in &mut self.fields {
            field.reset_after_update();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::field::FieldUsage;
    use crate::field::storage::{BaseType, StorageType, SUBTYPE_TREE_ID, SUBTYPE_TREE_PATH};
    use crate::metadata::{FieldRecord, MetadataSnapshot};

    fn record(id: i32, name: &str, reference_name: &str, st: StorageType) -> FieldRecord {
        FieldRecord {
            id,
            name: name.into(),
            reference_name: reference_name.into(),
            storage_type: st,
            usage: FieldUsage::WorkItem,
            supports_text_query: false,
        }
    }

    fn ctx() -> Arc<WitContext> {
        let snapshot = MetadataSnapshot {
            fields: vec![
                record(1, "Title", "System.Title", StorageType::new(BaseType::String, 0)),
                record(
                    core_fields::AREA_ID,
                    "Area ID",
                    "System.AreaId",
                    StorageType::new(BaseType::Integer, SUBTYPE_TREE_ID),
                ),
                record(
                    core_fields::AREA_PATH,
                    "Area Path",
                    "System.AreaPath",
                    StorageType::new(BaseType::String, SUBTYPE_TREE_PATH),
                ),
                record(
                    core_fields::WORK_ITEM_TYPE,
                    "Work Item Type",
                    "System.WorkItemType",
                    StorageType::new(BaseType::String, 0),
                ),
                record(77, "Virtual", "Custom.Virtual", StorageType(0)),
            ],
            ..MetadataSnapshot::default()
        };
        Arc::new(WitContext::new(snapshot, EngineConfig::default()).expect("context"))
    }

    #[test]
    fn ensure_fields_exist_is_idempotent() {
        let ctx = ctx();
        let mut fields = FieldCollection::new(Arc::clone(&ctx));
        let defs = ctx.registry().physical_type_definitions();
        fields.ensure_fields_exist(&defs).expect("first");
        let n = fields.len();
        fields.ensure_fields_exist(&defs).expect("second");
        fields.ensure_all_fields_in_physical_type().expect("third");
        assert_eq!(fields.len(), n);
        assert_eq!(n, 4);
    }

    #[test]
    fn duplicate_add_is_an_error() {
        let ctx = ctx();
        let mut fields = FieldCollection::new(Arc::clone(&ctx));
        let title = ctx.registry().require(1).expect("title");
        fields.add_field(Arc::clone(&title)).expect("first add");
        assert_eq!(fields.add_field(title), Err(FieldError::DuplicateField { id: 1 }));
    }

    #[test]
    fn find_without_create_fails_for_missing_fields() {
        let mut fields = FieldCollection::new(ctx());
        let err = fields.find_field_internal("System.Title", false).expect_err("missing");
        assert!(matches!(err, FieldError::UnknownField { .. }));
        let slot = fields.find_field_internal("System.Title", true).expect("created");
        assert_eq!(fields.find_field_internal("title", false), Ok(slot));
    }

    #[test]
    fn non_physical_definitions_are_never_created() {
        let mut fields = FieldCollection::new(ctx());
        assert!(fields.find_field_internal(77, true).is_err());
        assert!(fields.find_field_internal(12345, true).is_err());
    }

    #[test]
    fn calculated_fields_need_their_backing_field() {
        let mut fields = FieldCollection::new(ctx());
        assert!(fields.get_field_internal(core_fields::AREA_PATH).is_err());

        fields
            .add_original_value_from_server(core_fields::AREA_ID, "5", true)
            .expect("area id");
        let slot = fields
            .get_field_internal("System.AreaPath")
            .expect("synthesized");
        assert_eq!(fields.slot(slot).id(), core_fields::AREA_PATH);
    }

    #[test]
    fn path_dirtiness_follows_area_id() {
        let mut fields = FieldCollection::new(ctx());
        let area = fields.find_field_internal(core_fields::AREA_ID, true).expect("area");
        let path = fields.get_field_internal(core_fields::AREA_PATH).expect("path");
        assert!(!fields.is_field_dirty(path));
        fields.slot_mut(area).apply_candidate(Some(9.into()));
        assert!(fields.is_field_dirty(path));
    }

    #[test]
    fn work_item_type_is_never_editable() {
        let mut fields = FieldCollection::new(ctx());
        let wit = fields
            .find_field_internal(core_fields::WORK_ITEM_TYPE, true)
            .expect("wit");
        let title = fields.find_field_internal(1, true).expect("title");
        assert!(!fields.is_field_editable(wit));
        assert!(fields.is_field_editable(title));
        fields.slot_mut(title).rule_read_only = true;
        assert!(!fields.is_field_editable(title));
    }

    #[test]
    fn local_original_type_mismatch_is_an_error() {
        let mut fields = FieldCollection::new(ctx());
        let err = fields
            .add_original_value_local(core_fields::AREA_ID, Some("x".into()), true)
            .expect_err("type mismatch");
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidValueType);
    }
}
