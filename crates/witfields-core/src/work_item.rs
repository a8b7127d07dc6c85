//! A work item: one field collection plus the state the calculated fields
//! read from (project, links, attachments, open flag).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::context::WitContext;
use crate::core_fields::{self, node_types};
use crate::error::FieldError;
use crate::field::{
    FieldChange, FieldCollection, FieldKey, FieldModificationType, FieldMut, FieldRef,
};
use crate::links::{Attachment, AttachmentCollection, Link, LinkCollection};
use crate::value::FieldValue;

/// Callback into the rule engine.
///
/// Invoked synchronously after every effective USER edit, with the id of
/// the edited field. The hook may read and modify any field of the item;
/// edits it makes should use RULE modification so they do not re-enter the
/// hook. Returns `true` when the rules updated the edited field's status.
pub trait RuleHook: Send + Sync {
    fn on_user_field_changed(&self, item: &mut WorkItem, field_id: i32) -> bool;
}

/// A rule hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleHook for NoRules {
    fn on_user_field_changed(&self, _item: &mut WorkItem, _field_id: i32) -> bool {
        false
    }
}

/// The project a work item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: i32,
    pub name: String,
}

/// Server rows of one work item, keyed by field name or id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRecord {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

pub struct WorkItem {
    pub(crate) ctx: Arc<WitContext>,
    pub(crate) project: Option<ProjectRef>,
    pub(crate) fields: FieldCollection,
    pub(crate) links: LinkCollection,
    pub(crate) attachments: AttachmentCollection,
    pub(crate) open: bool,
    pub(crate) rules: Arc<dyn RuleHook>,
    pub(crate) changes: Vec<FieldChange>,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("project", &self.project)
            .field("fields", &self.fields.len())
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

fn parse_key(key: &str) -> FieldKey<'_> {
    key.trim()
        .parse::<i32>()
        .map_or(FieldKey::Name(key), FieldKey::Id)
}

impl WorkItem {
    fn empty(ctx: Arc<WitContext>) -> Self {
        Self {
            fields: FieldCollection::new(Arc::clone(&ctx)),
            ctx,
            project: None,
            links: LinkCollection::default(),
            attachments: AttachmentCollection::default(),
            open: false,
            rules: Arc::new(NoRules),
            changes: Vec::new(),
        }
    }

    /// A new, unsaved, open work item in `project_id`.
    ///
    /// Every physical-type field exists. The area and iteration default to
    /// the project node and the id field holds a temporary negative id; all
    /// three are NEW edits, so the item counts as unsaved.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownProject`] when `project_id` is not a
    /// project node.
    pub fn new_unsaved(ctx: Arc<WitContext>, project_id: i32) -> Result<Self, FieldError> {
        let project = ctx
            .metadata()
            .hierarchy()
            .find(project_id)
            .filter(|n| n.type_id == node_types::PROJECT)
            .map(|n| ProjectRef {
                id: n.id,
                name: n.name.clone(),
            })
            .ok_or(FieldError::UnknownProject(project_id))?;

        let temp_id = ctx.next_temporary_id();
        let mut item = Self::empty(ctx);
        item.project = Some(project);
        item.open = true;
        item.fields.ensure_all_fields_in_physical_type()?;

        for (field_id, value) in [
            (core_fields::ID, temp_id),
            (core_fields::AREA_ID, project_id),
            (core_fields::ITERATION_ID, project_id),
        ] {
            match item.fields.index_of(field_id) {
                Some(index) => FieldMut::new(&mut item, index).set_value_with(
                    None,
                    Some(value.into()),
                    FieldModificationType::New,
                ),
                None => debug!(field_id, "no definition; default skipped"),
            }
        }

        item.changes.clear();
        Ok(item)
    }

    /// A saved work item loaded from server rows. The project is derived
    /// from the area id.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] for a row naming no
    /// physical-type field.
    pub fn from_server(ctx: Arc<WitContext>, record: &WorkItemRecord) -> Result<Self, FieldError> {
        let mut item = Self::empty(ctx);
        for (key, data) in &record.fields {
            item.fields
                .add_original_value_from_server(parse_key(key), data, true)?;
        }
        item.fields.ensure_all_fields_in_physical_type()?;
        item.links = LinkCollection::from_saved(record.links.iter().cloned());
        item.attachments = AttachmentCollection::from_saved(record.attachments.iter().cloned());
        item.project = item.derive_project();
        if item.project.is_none() {
            warn!("work item has no resolvable project");
        }
        Ok(item)
    }

    fn derive_project(&self) -> Option<ProjectRef> {
        let area = self.fields.index_of(core_fields::AREA_ID)?;
        let area_id = self.fields.slot(area).stored_original()?.as_integer()?;
        self.ctx
            .metadata()
            .hierarchy()
            .project_of(area_id)
            .map(|n| ProjectRef {
                id: n.id,
                name: n.name.clone(),
            })
    }

    /// Replaces the rule hook.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<dyn RuleHook>) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub const fn context(&self) -> &Arc<WitContext> {
        &self.ctx
    }

    #[must_use]
    pub const fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    /// Field access by id or name, synthesizing calculated fields on demand.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when no such field exists.
    pub fn field<'k>(&mut self, key: impl Into<FieldKey<'k>>) -> Result<FieldRef<'_>, FieldError> {
        let index = self.fields.get_field_internal(key)?;
        Ok(FieldRef::new(self, index))
    }

    /// Read-only field access that never creates fields.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when the field is not present.
    pub fn peek<'k>(&self, key: impl Into<FieldKey<'k>>) -> Result<FieldRef<'_>, FieldError> {
        let key = key.into();
        let index = self.fields.index_of(key).ok_or_else(|| FieldError::UnknownField {
            key: key.to_string(),
            size: self.fields.len(),
        })?;
        Ok(FieldRef::new(self, index))
    }

    /// Mutable field access, synthesizing calculated fields on demand.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when no such field exists.
    pub fn field_mut<'k>(&mut self, key: impl Into<FieldKey<'k>>) -> Result<FieldMut<'_>, FieldError> {
        let index = self.fields.get_field_internal(key)?;
        Ok(FieldMut::new(self, index))
    }

    /// Fields in creation order.
    pub fn iter_fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        (0..self.fields.len()).map(|i| FieldRef::new(self, i))
    }

    #[must_use]
    pub const fn links(&self) -> &LinkCollection {
        &self.links
    }

    pub const fn links_mut(&mut self) -> &mut LinkCollection {
        &mut self.links
    }

    #[must_use]
    pub const fn attachments(&self) -> &AttachmentCollection {
        &self.attachments
    }

    pub const fn attachments_mut(&mut self) -> &mut AttachmentCollection {
        &mut self.attachments
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn open(&mut self) {
        self.open = true;
    }

    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Unsaved items carry a NEW, not-yet-saved id.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.fields
            .index_of(core_fields::ID)
            .is_some_and(|i| self.fields.is_field_dirty(i))
    }

    /// User edits or pending link/attachment changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.fields.is_dirty() || self.links.is_dirty() || self.attachments.is_dirty()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.is_valid()
    }

    /// Promotes pending values to originals after a successful save.
    pub fn save_completed(&mut self) {
        self.fields.reset_after_update();
        self.links.commit();
        self.attachments.commit();
        if let Some(project) = self.derive_project() {
            self.project = Some(project);
        }
    }

    /// Discards all pending edits.
    pub fn revert(&mut self) {
        self.fields.reset();
        self.links.revert();
        self.attachments.revert();
    }

    /// Drains the change notifications recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<FieldChange> {
        std::mem::take(&mut self.changes)
    }

    /// Copies every copyable field value onto `target` as NEW edits.
    ///
    /// Area and iteration ids are skipped when the two items belong to
    /// different projects.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] when `target` cannot hold a
    /// copied field.
    pub fn copy_to(&self, target: &mut Self) -> Result<(), FieldError> {
        let source_project = self.project.as_ref().map(|p| p.id);
        let target_project = target.project.as_ref().map(|p| p.id);
        let new_project = source_project != target_project;
        debug!(?source_project, ?target_project, "copying fields");

        let excluded = &self.ctx.config().copy;
        for field in self.iter_fields() {
            let def = field.definition();
            let id = def.id();
            if !def.can_copy() || excluded.is_excluded(def.reference_name()) {
                trace!(field_id = id, "skipping copy of field");
                continue;
            }
            if new_project && matches!(id, core_fields::AREA_ID | core_fields::ITERATION_ID) {
                trace!(field_id = id, "skipping copy of field across projects");
                continue;
            }

            let value: Option<FieldValue> = field.value();
            debug!(field_id = id, value = %crate::value::display_opt(value.as_ref()), "copied field");
            target
                .field_mut(id)?
                .set_value_with(None, value, FieldModificationType::New);
        }
        Ok(())
    }
}
