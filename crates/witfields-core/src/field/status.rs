use serde::{Deserialize, Serialize};
use std::fmt;

/// Validity of a field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    Valid,
    InvalidEmpty,
    InvalidNotEmpty,
    InvalidFormat,
    InvalidListValue,
    InvalidOldValue,
    InvalidNotOldValue,
    InvalidEmptyOrOldValue,
    InvalidNotEmptyOrOldValue,
    InvalidValueInOtherField,
    InvalidValueNotInOtherField,
    InvalidDate,
    InvalidTooLong,
    InvalidType,
    InvalidComputedField,
    InvalidPath,
    InvalidCharacters,
    InvalidUnknown,
}

impl FieldStatus {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Statuses produced by the type converter rather than by rules.
    #[must_use]
    pub const fn is_type_error(self) -> bool {
        matches!(
            self,
            Self::InvalidType | Self::InvalidDate | Self::InvalidCharacters
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::InvalidEmpty => "invalid_empty",
            Self::InvalidNotEmpty => "invalid_not_empty",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidListValue => "invalid_list_value",
            Self::InvalidOldValue => "invalid_old_value",
            Self::InvalidNotOldValue => "invalid_not_old_value",
            Self::InvalidEmptyOrOldValue => "invalid_empty_or_old_value",
            Self::InvalidNotEmptyOrOldValue => "invalid_not_empty_or_old_value",
            Self::InvalidValueInOtherField => "invalid_value_in_other_field",
            Self::InvalidValueNotInOtherField => "invalid_value_not_in_other_field",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTooLong => "invalid_too_long",
            Self::InvalidType => "invalid_type",
            Self::InvalidComputedField => "invalid_computed_field",
            Self::InvalidPath => "invalid_path",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidUnknown => "invalid_unknown",
        }
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who made the most recent change to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldModificationType {
    User,
    Rule,
    Server,
    New,
    InternalModel,
}

/// Values a rule can ask the server to fill in on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerComputedFieldType {
    DateTime,
    CurrentUser,
    RandomGuid,
}

#[cfg(test)]
mod tests {
    use super::FieldStatus;

    #[test]
    fn type_error_family() {
        assert!(FieldStatus::InvalidType.is_type_error());
        assert!(FieldStatus::InvalidDate.is_type_error());
        assert!(FieldStatus::InvalidCharacters.is_type_error());
        assert!(!FieldStatus::InvalidPath.is_type_error());
        assert!(!FieldStatus::Valid.is_type_error());
    }

    #[test]
    fn default_is_valid() {
        assert!(FieldStatus::default().is_valid());
    }
}
