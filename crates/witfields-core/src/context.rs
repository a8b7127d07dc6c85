use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use anyhow::Context as _;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::FieldError;
use crate::field::allowed_values::{self, AllowedValuesCollection};
use crate::field::{FieldDefinition, FieldDefinitionRegistry};
use crate::metadata::{Metadata, MetadataSnapshot};

/// Shared, read-only state for every work item of one metadata snapshot:
/// configuration, indexed metadata and the field definitions.
#[derive(Debug)]
pub struct WitContext {
    config: EngineConfig,
    metadata: Metadata,
    registry: FieldDefinitionRegistry,
    next_temp_id: AtomicI32,
}

impl WitContext {
    /// Indexes `snapshot` and registers its field definitions.
    ///
    /// # Errors
    ///
    /// Returns the registry's error when a field record has a malformed name
    /// or a duplicate id.
    pub fn new(snapshot: MetadataSnapshot, config: EngineConfig) -> Result<Self, FieldError> {
        let metadata = Metadata::new(snapshot);
        let registry = FieldDefinitionRegistry::new(&metadata, config.names.case_sensitive)?;
        info!(
            fields = registry.len(),
            nodes = metadata.hierarchy().len(),
            constants = metadata.constants().len(),
            rules = metadata.rules().len(),
            "metadata loaded"
        );
        Ok(Self {
            config,
            metadata,
            registry,
            next_temp_id: AtomicI32::new(-1),
        })
    }

    /// Loads a JSON snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// field records are invalid.
    pub fn from_json_file(path: &Path, config: EngineConfig) -> anyhow::Result<Arc<Self>> {
        let snapshot = MetadataSnapshot::load(path)?;
        let ctx = Self::new(snapshot, config)
            .with_context(|| format!("Invalid field definitions in {}", path.display()))?;
        Ok(Arc::new(ctx))
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub const fn registry(&self) -> &FieldDefinitionRegistry {
        &self.registry
    }

    /// Allowed values of a definition, computed on first use and cached on
    /// the definition.
    #[must_use]
    pub fn allowed_values(&self, definition: &FieldDefinition) -> Option<Arc<AllowedValuesCollection>> {
        definition.allowed_values_or_init(|| {
            allowed_values::compute(&self.metadata, definition).map(|values| {
                AllowedValuesCollection::new(
                    values,
                    definition.value_type(),
                    self.config.allowed_values.sort,
                )
            })
        })
    }

    /// Next temporary id for an unsaved work item: -1, -2, ...
    pub fn next_temporary_id(&self) -> i32 {
        self.next_temp_id.fetch_sub(1, Ordering::Relaxed)
    }
}
