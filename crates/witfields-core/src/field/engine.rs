//! Field value engine: reading values (with delegation for calculated
//! fields) and the set-value state machine.
//!
//! [`FieldRef`] and [`FieldMut`] are views of one field slot of a
//! [`WorkItem`]. They borrow the whole item because calculated fields read
//! sibling fields, links and attachments, and a user edit runs the rule
//! hook over the whole item.

use std::sync::Arc;

use tracing::{trace, warn};

use super::allowed_values::AllowedValuesCollection;
use super::definition::FieldDefinition;
use super::kind::FieldKind;
use super::state::{Field, PickList};
use super::status::{FieldModificationType, FieldStatus, ServerComputedFieldType};
use crate::error::FieldError;
use crate::value::{FieldValue, ValueSource};
use crate::work_item::WorkItem;

/// One effective change of a field's value or status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field_id: i32,
    /// Caller-supplied tag identifying who made the change.
    pub source: Option<String>,
}

fn count_value(count: usize) -> FieldValue {
    FieldValue::Integer(i32::try_from(count).unwrap_or(i32::MAX))
}

// ---------------------------------------------------------------------------
// Value resolution
// ---------------------------------------------------------------------------

impl WorkItem {
    fn backing_value(&self, field: &Field, original: bool) -> Option<FieldValue> {
        let backing = field.kind().backing_field()?;
        let Some(slot) = self.fields.index_of(backing) else {
            warn!(field_id = field.id(), backing, "backing field missing");
            return None;
        };
        if original {
            self.original_value_at(slot)
        } else {
            self.value_at(slot)
        }
    }

    /// Presents a backing id (node or person) as the calculated field's
    /// value.
    fn describe_backing(&self, kind: FieldKind, backing_id: i32) -> Option<FieldValue> {
        let metadata = self.ctx.metadata();
        let text = match kind {
            FieldKind::NodePath(_) => metadata.hierarchy().path(backing_id),
            FieldKind::NodeName => metadata.hierarchy().name(backing_id).map(str::to_string),
            FieldKind::TeamProject => metadata
                .hierarchy()
                .project_of(backing_id)
                .map(|n| n.name.clone()),
            FieldKind::AuthorizedAs => metadata.constants().display(backing_id).map(str::to_string),
            FieldKind::Stored
            | FieldKind::History
            | FieldKind::LinkCount(_)
            | FieldKind::AttachedFileCount => None,
        };
        if text.is_none() {
            warn!(?kind, backing_id, "backing id does not resolve");
        }
        text.map(FieldValue::String)
    }

    fn calculated_value(&self, field: &Field, original: bool) -> Option<FieldValue> {
        let backing_id = self.backing_value(field, original)?.as_integer()?;
        self.describe_backing(field.kind(), backing_id)
    }

    pub(crate) fn original_value_at(&self, index: usize) -> Option<FieldValue> {
        let field = self.fields.slot(index);
        if field.is_original_set() {
            return field.stored_original().cloned();
        }
        match field.kind() {
            kind if kind.is_calculated() => self.calculated_value(field, true),
            FieldKind::LinkCount(link_kind) => {
                (!self.is_new()).then(|| count_value(self.links.count_of(link_kind, true)))
            }
            FieldKind::AttachedFileCount => {
                (!self.is_new()).then(|| count_value(self.attachments.count(true)))
            }
            _ => field.stored_original().cloned(),
        }
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<FieldValue> {
        let field = self.fields.slot(index);
        match field.kind() {
            FieldKind::LinkCount(link_kind) => {
                return Some(count_value(self.links.count_of(link_kind, false)));
            }
            FieldKind::AttachedFileCount => {
                return Some(count_value(self.attachments.count(false)));
            }
            FieldKind::History if self.open => return field.stored_new_value().cloned(),
            _ => {}
        }

        if self.fields.is_field_dirty(index) {
            if field.kind().is_calculated() {
                return self.calculated_value(field, false);
            }
            return field.stored_new_value().cloned();
        }
        self.original_value_at(index)
    }
}

// ---------------------------------------------------------------------------
// FieldRef
// ---------------------------------------------------------------------------

/// Read view of one field of a work item.
#[derive(Clone, Copy)]
pub struct FieldRef<'a> {
    item: &'a WorkItem,
    index: usize,
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRef")
            .field("id", &self.id())
            .field("index", &self.index)
            .finish()
    }
}

impl<'a> FieldRef<'a> {
    pub(crate) const fn new(item: &'a WorkItem, index: usize) -> Self {
        Self { item, index }
    }

    fn state(&self) -> &'a Field {
        self.item.fields.slot(self.index)
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.state().id()
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        self.state().definition().name()
    }

    #[must_use]
    pub fn reference_name(&self) -> &'a str {
        self.state().definition().reference_name()
    }

    #[must_use]
    pub fn definition(&self) -> &'a Arc<FieldDefinition> {
        self.state().definition()
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.state().kind()
    }

    /// Current value. Null is `None`.
    #[must_use]
    pub fn value(&self) -> Option<FieldValue> {
        self.item.value_at(self.index)
    }

    /// Value as last loaded or saved.
    #[must_use]
    pub fn original_value(&self) -> Option<FieldValue> {
        self.item.original_value_at(self.index)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.item.fields.is_field_dirty(self.index)
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.item.fields.is_field_editable(self.index)
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.definition().is_computed()
    }

    #[must_use]
    pub fn status(&self) -> FieldStatus {
        self.state().status()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status().is_valid()
    }

    #[must_use]
    pub fn modification_type(&self) -> Option<FieldModificationType> {
        self.state().modification_type()
    }

    #[must_use]
    pub fn server_computed_type(&self) -> Option<ServerComputedFieldType> {
        self.state().server_computed_type()
    }

    #[must_use]
    pub fn is_new_value_set(&self) -> bool {
        self.state().is_new_value_set()
    }

    #[must_use]
    pub fn help_text(&self) -> Option<&'a str> {
        self.state().help_text()
    }

    /// Rule-supplied values when a rule set a pick list, otherwise the
    /// definition's global allowed values.
    #[must_use]
    pub fn allowed_values(&self) -> Option<Arc<AllowedValuesCollection>> {
        let def = self.definition();
        match self.state().pick_list().allowed() {
            Some(values) => Some(Arc::new(AllowedValuesCollection::new(
                values.iter().cloned(),
                def.value_type(),
                self.item.ctx.config().allowed_values.sort,
            ))),
            None => self.item.ctx.allowed_values(def),
        }
    }

    #[must_use]
    pub fn prohibited_values(&self) -> &'a [String] {
        self.state().pick_list().prohibited()
    }

    /// Server string form of the pending value.
    #[must_use]
    pub fn new_value_as_string(&self) -> String {
        let field = self.state();
        if field.status() == FieldStatus::InvalidType {
            return format!("field [{}] holds a value of the wrong type", field.id());
        }
        field
            .definition()
            .converter()
            .to_server_string(field.stored_new_value())
    }
}

// ---------------------------------------------------------------------------
// FieldMut
// ---------------------------------------------------------------------------

/// Write view of one field of a work item.
pub struct FieldMut<'a> {
    item: &'a mut WorkItem,
    index: usize,
}

impl std::fmt::Debug for FieldMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMut")
            .field("id", &self.state().id())
            .field("index", &self.index)
            .finish()
    }
}

impl<'a> FieldMut<'a> {
    pub(crate) const fn new(item: &'a mut WorkItem, index: usize) -> Self {
        Self { item, index }
    }

    /// Read view of the same field.
    #[must_use]
    pub fn view(&self) -> FieldRef<'_> {
        FieldRef::new(self.item, self.index)
    }

    fn state(&self) -> &Field {
        self.item.fields.slot(self.index)
    }

    fn state_mut(&mut self) -> &mut Field {
        self.item.fields.slot_mut(self.index)
    }

    fn notify(&mut self, source: Option<&str>) {
        let field_id = self.state().id();
        self.item.changes.push(FieldChange {
            field_id,
            source: source.map(str::to_string),
        });
    }

    /// User edit of the field.
    ///
    /// # Errors
    ///
    /// Fails only when a path field's backing id field is missing.
    pub fn set(&mut self, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        self.set_value_from(None, Some(value.into()))
    }

    /// User edit setting the field to null.
    ///
    /// # Errors
    ///
    /// Fails only when a path field's backing id field is missing.
    pub fn clear(&mut self) -> Result<(), FieldError> {
        self.set_value_from(None, None)
    }

    /// User edit tagged with `source`.
    ///
    /// Area and iteration paths are resolved against the item's project and
    /// forwarded to the matching id field; an unresolvable path marks this
    /// field [`FieldStatus::InvalidPath`] and changes nothing else.
    ///
    /// # Errors
    ///
    /// Fails only when a path field's backing id field is missing.
    pub fn set_value_from(&mut self, source: Option<&str>, data: Option<FieldValue>) -> Result<(), FieldError> {
        let FieldKind::NodePath(tree) = self.state().kind() else {
            self.set_value_with(source, data, FieldModificationType::User);
            return Ok(());
        };

        let path = match self
            .state()
            .definition()
            .converter()
            .translate(data, ValueSource::Local)
        {
            Ok(Some(FieldValue::String(path))) => Some(path),
            _ => None,
        };
        let resolved = match (path, self.item.project.as_ref()) {
            (Some(path), Some(project)) => self
                .item
                .ctx
                .metadata()
                .hierarchy()
                .resolve_path(project.id, &path, tree),
            _ => None,
        };

        if let Some(node_id) = resolved {
            let target = self.item.fields.get_field_internal(tree.id_field())?;
            FieldMut::new(self.item, target).set_value_with(
                source,
                Some(node_id.into()),
                FieldModificationType::User,
            );
            if self.state().status() == FieldStatus::InvalidPath {
                self.state_mut().status = FieldStatus::Valid;
                self.notify(source);
            }
        } else if self.state().status() != FieldStatus::InvalidPath {
            trace!(field_id = self.state().id(), "setting field invalid: invalid path");
            self.state_mut().status = FieldStatus::InvalidPath;
            self.notify(source);
        }
        Ok(())
    }

    /// Core set-value transition with an explicit modification type.
    pub fn set_value_with(
        &mut self,
        source: Option<&str>,
        data: Option<FieldValue>,
        modification: FieldModificationType,
    ) {
        let field = self.state();
        let field_id = field.id();
        let value_source = if modification == FieldModificationType::Server {
            ValueSource::Server
        } else {
            ValueSource::Local
        };

        let (candidate, type_error) = match field.definition().converter().translate(data, value_source) {
            Ok(value) => (value, None),
            Err(err) => (err.invalid_value, Some(err.status)),
        };

        let updated = self.state_mut().apply_candidate(candidate);
        if updated {
            self.state_mut().modification = Some(modification);
            self.notify(source);
        }

        if let Some(status) = type_error {
            if self.state().status() != status {
                trace!(field_id, %status, "setting field invalid because of type conversion");
                self.state_mut().status = status;
                self.notify(source);
            }
        } else if updated && modification == FieldModificationType::User {
            let hook = Arc::clone(&self.item.rules);
            let updated_by_rules = hook.on_user_field_changed(self.item, field_id);
            if !updated_by_rules && self.state().status().is_type_error() {
                trace!(field_id, "setting field valid after earlier type conversion error");
                self.state_mut().status = FieldStatus::Valid;
                self.notify(source);
            }
        }
    }

    /// Sets the status without a change notification.
    pub fn set_status(&mut self, status: FieldStatus) {
        self.state_mut().status = status;
    }

    /// Sets the status and records a change notification.
    pub fn override_status(&mut self, status: FieldStatus) {
        self.set_status(status);
        self.notify(None);
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.state_mut().rule_read_only = read_only;
    }

    /// Marks the field as filled in by the server on save.
    pub fn set_server_computed(&mut self, kind: ServerComputedFieldType) {
        let field = self.state_mut();
        field.server_computed = Some(kind);
        field.new_value_set = true;
    }

    pub fn set_value_from_rule(&mut self, value: Option<FieldValue>) {
        self.set_value_with(None, value, FieldModificationType::Rule);
    }

    pub fn unset_new_value(&mut self) {
        self.state_mut().new_value_set = false;
    }

    pub fn set_help_text(&mut self, help_text: Option<String>) {
        self.state_mut().help_text = help_text;
    }

    pub fn pick_list_mut(&mut self) -> &mut PickList {
        &mut self.state_mut().pick_list
    }

    /// Drops this field's pending edit.
    pub fn reset(&mut self) {
        self.state_mut().reset();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
