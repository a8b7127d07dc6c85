//! witfields-core library.
//!
//! The work-item field engine: field definitions indexed by id and name,
//! per-work-item field value state with dirty and validity tracking,
//! delegated computed fields, and rule-table driven allowed values.
//!
//! # Conventions
//!
//! - **Errors**: structural misuse returns [`error::FieldError`]; data
//!   validity problems are recorded as [`field::FieldStatus`] on the field.
//! - **Logging**: Use `tracing` macros (`warn!`, `debug!`, `trace!`).

pub mod config;
pub mod context;
pub mod convert;
pub mod core_fields;
pub mod error;
pub mod field;
pub mod links;
pub mod metadata;
pub mod value;
pub mod work_item;

pub use context::WitContext;
pub use error::{ErrorCode, FieldError};
pub use field::{FieldKey, FieldModificationType, FieldStatus};
pub use value::FieldValue;
pub use work_item::{NoRules, RuleHook, WorkItem};
