//! Field definitions and per-work-item field state.

pub mod allowed_values;
pub mod collection;
pub mod definition;
pub mod engine;
pub mod kind;
pub mod reference_cache;
pub mod registry;
pub mod state;
pub mod status;
pub mod storage;

pub use allowed_values::{AllowedValuesCollection, SlotFlags};
pub use collection::FieldCollection;
pub use definition::{FieldDefinition, FieldUsage};
pub use engine::{FieldChange, FieldMut, FieldRef};
pub use kind::FieldKind;
pub use reference_cache::{FieldKey, FieldReferenceCache};
pub use registry::FieldDefinitionRegistry;
pub use state::{Field, PickList};
pub use status::{FieldModificationType, FieldStatus, ServerComputedFieldType};
pub use storage::{FieldType, StorageType};
