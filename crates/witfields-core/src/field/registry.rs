use std::sync::Arc;

use tracing::debug;

use super::definition::{FieldDefinition, FieldUsage};
use super::reference_cache::{FieldKey, FieldReferenceCache};
use crate::error::FieldError;
use crate::metadata::Metadata;

/// All field definitions of one metadata snapshot.
#[derive(Debug)]
pub struct FieldDefinitionRegistry {
    cache: FieldReferenceCache<Arc<FieldDefinition>>,
}

impl FieldDefinitionRegistry {
    /// Builds definitions for every field record.
    ///
    /// # Errors
    ///
    /// Returns the first naming or duplicate-id error from the records.
    pub fn new(metadata: &Metadata, case_sensitive: bool) -> Result<Self, FieldError> {
        let cache = FieldReferenceCache::new(case_sensitive);
        for record in metadata.fields() {
            let def = FieldDefinition::new(record, metadata.usage(record.id));
            cache.put(Arc::new(def), &record.name, &record.reference_name, record.id)?;
        }
        debug!(count = cache.len(), "field definitions registered");
        Ok(Self { cache })
    }

    #[must_use]
    pub fn get<'k>(&self, key: impl Into<FieldKey<'k>>) -> Option<Arc<FieldDefinition>> {
        self.cache.get(key)
    }

    /// Like [`Self::get`] but unknown keys are an error.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownDefinition`] when no definition matches.
    pub fn require<'k>(&self, key: impl Into<FieldKey<'k>>) -> Result<Arc<FieldDefinition>, FieldError> {
        let key = key.into();
        self.cache.get(key).ok_or_else(|| FieldError::UnknownDefinition {
            key: key.to_string(),
        })
    }

    #[must_use]
    pub fn contains<'k>(&self, key: impl Into<FieldKey<'k>>) -> bool {
        self.cache.contains(key)
    }

    /// All definitions in snapshot order.
    #[must_use]
    pub fn definitions(&self) -> Vec<Arc<FieldDefinition>> {
        self.cache.values()
    }

    /// Definitions with work-item usage.
    #[must_use]
    pub fn work_item_definitions(&self) -> Vec<Arc<FieldDefinition>> {
        self.cache
            .values()
            .into_iter()
            .filter(|d| d.usage() == FieldUsage::WorkItem)
            .collect()
    }

    /// Work-item definitions that have a physical column.
    #[must_use]
    pub fn physical_type_definitions(&self) -> Vec<Arc<FieldDefinition>> {
        self.work_item_definitions()
            .into_iter()
            .filter(|d| d.is_used_in_physical_type())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
