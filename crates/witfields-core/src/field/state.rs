//! Per-work-item state of one field.
//!
//! A [`Field`] only knows its own values. Anything that depends on sibling
//! fields, the work item's links or the hierarchy lives in the collection
//! and the value engine.

use std::sync::Arc;

use tracing::warn;

use super::definition::FieldDefinition;
use super::kind::FieldKind;
use super::status::{FieldModificationType, FieldStatus, ServerComputedFieldType};
use crate::error::FieldError;
use crate::value::{FieldValue, ValueSource};

/// Allowed and prohibited values pushed onto a field by rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickList {
    allowed: Option<Vec<String>>,
    prohibited: Vec<String>,
}

impl PickList {
    pub fn set_allowed(&mut self, values: impl IntoIterator<Item = String>) {
        self.allowed = Some(values.into_iter().collect());
    }

    pub fn set_prohibited(&mut self, values: impl IntoIterator<Item = String>) {
        self.prohibited = values.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.allowed = None;
        self.prohibited.clear();
    }

    /// Rule-supplied allowed values, if any rule set them.
    #[must_use]
    pub fn allowed(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    #[must_use]
    pub fn prohibited(&self) -> &[String] {
        &self.prohibited
    }
}

/// Stored state of one field on one work item.
#[derive(Debug, Clone)]
pub struct Field {
    definition: Arc<FieldDefinition>,
    original: Option<FieldValue>,
    original_set: bool,
    pub(crate) new_value: Option<FieldValue>,
    pub(crate) new_value_set: bool,
    pub(crate) modification: Option<FieldModificationType>,
    pub(crate) server_computed: Option<ServerComputedFieldType>,
    pub(crate) status: FieldStatus,
    pub(crate) rule_read_only: bool,
    pub(crate) help_text: Option<String>,
    pub(crate) pick_list: PickList,
}

impl Field {
    #[must_use]
    pub fn new(definition: Arc<FieldDefinition>) -> Self {
        // History always has a pending (possibly empty) comment.
        let history = definition.kind() == FieldKind::History;
        Self {
            definition,
            original: None,
            original_set: false,
            new_value: None,
            new_value_set: history,
            modification: None,
            server_computed: None,
            status: FieldStatus::Valid,
            rule_read_only: false,
            help_text: None,
            pick_list: PickList::default(),
        }
    }

    #[must_use]
    pub const fn definition(&self) -> &Arc<FieldDefinition> {
        &self.definition
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.definition.id()
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.definition.kind()
    }

    #[must_use]
    pub const fn status(&self) -> FieldStatus {
        self.status
    }

    #[must_use]
    pub const fn modification_type(&self) -> Option<FieldModificationType> {
        self.modification
    }

    #[must_use]
    pub const fn server_computed_type(&self) -> Option<ServerComputedFieldType> {
        self.server_computed
    }

    #[must_use]
    pub const fn is_new_value_set(&self) -> bool {
        self.new_value_set
    }

    #[must_use]
    pub const fn is_original_set(&self) -> bool {
        self.original_set
    }

    #[must_use]
    pub const fn is_rule_read_only(&self) -> bool {
        self.rule_read_only
    }

    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    #[must_use]
    pub const fn pick_list(&self) -> &PickList {
        &self.pick_list
    }

    /// The stored original, without any delegation.
    #[must_use]
    pub const fn stored_original(&self) -> Option<&FieldValue> {
        self.original.as_ref()
    }

    /// The pending value, without any delegation.
    #[must_use]
    pub const fn stored_new_value(&self) -> Option<&FieldValue> {
        self.new_value.as_ref()
    }

    /// Sets the original from a server string. A bad value is logged and
    /// leaves the original null; either way the original counts as set.
    pub fn set_original_from_server(&mut self, data: &str) {
        match self
            .definition
            .converter()
            .translate(Some(FieldValue::from(data)), ValueSource::Server)
        {
            Ok(value) => self.original = value,
            Err(err) => warn!(
                field = self.definition.reference_name(),
                value = data,
                error = %err,
                "type conversion error setting original value"
            ),
        }
        self.original_set = true;
    }

    /// Sets an already-typed original.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidValueType`] when the value's type does
    /// not match the field.
    pub fn set_original_local(&mut self, value: Option<FieldValue>) -> Result<(), FieldError> {
        if let Some(v) = value.as_ref().filter(|v| !self.definition.is_valid_type(v)) {
            return Err(FieldError::InvalidValueType {
                id: self.id(),
                actual: v.value_type().as_str(),
                expected: self.definition.value_type().as_str(),
            });
        }
        self.original = value;
        self.original_set = true;
        Ok(())
    }

    /// Applies a converted candidate value. Returns `true` when the field's
    /// state actually changed.
    pub(crate) fn apply_candidate(&mut self, candidate: Option<FieldValue>) -> bool {
        if self.new_value_set {
            if self.kind() != FieldKind::History && self.original == candidate {
                self.new_value_set = false;
                return true;
            }
            if self.new_value != candidate {
                self.new_value = candidate;
                return true;
            }
            false
        } else if self.original != candidate {
            self.new_value_set = true;
            self.new_value = candidate;
            true
        } else {
            false
        }
    }

    /// Drops the pending edit and any status it caused.
    pub fn reset(&mut self) {
        if self.kind() == FieldKind::History {
            self.new_value = None;
        }
        if self.new_value_set {
            self.server_computed = None;
            self.new_value_set = false;
            self.status = FieldStatus::Valid;
        }
    }

    /// Promotes the pending value to the original after a successful save.
    pub fn reset_after_update(&mut self) {
        if self.kind() == FieldKind::History {
            self.new_value = None;
        } else if self.new_value_set {
            self.server_computed = None;
            self.original = self.new_value.take();
            self.new_value_set = false;
        }
    }
}
