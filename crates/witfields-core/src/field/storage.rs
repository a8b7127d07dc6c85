//! The packed storage-type bitfield sent with every field definition.
//!
//! ```text
//!  bits 15..14 | 13      | 12       | 11..8    | 7..4      | 3..0
//!  unused      | ignore  | readonly | subtype  | base type | unused
//! ```
//!
//! The "PS type" is base type plus subtype; it selects the public
//! [`FieldType`] and the type converter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::ValueType;

pub const MASK_BASE_TYPE: u32 = 0x00F0;
pub const MASK_SUBTYPE: u32 = 0x0F00;
pub const MASK_BASE_AND_SUBTYPE: u32 = MASK_BASE_TYPE | MASK_SUBTYPE;
pub const FLAG_READONLY: u32 = 0x1000;
pub const FLAG_IGNORE: u32 = 0x2000;

pub const SUBTYPE_TREE_NODE_NAME: u32 = 0x0100;
pub const SUBTYPE_TREE_NODE_TYPE: u32 = 0x0200;
pub const SUBTYPE_TREE_PATH: u32 = 0x0300;
pub const SUBTYPE_PERSON: u32 = 0x0400;
pub const SUBTYPE_TREE_ID: u32 = 0x0100;
pub const SUBTYPE_HISTORY: u32 = 0x0100;
pub const SUBTYPE_HTML: u32 = 0x0200;

/// Storage base type (bits 7..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Integer,
    DateTime,
    LongText,
    TreeNode,
    Bit,
    Double,
    Guid,
}

impl BaseType {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::String => 0x10,
            Self::Integer => 0x20,
            Self::DateTime => 0x30,
            Self::LongText => 0x40,
            Self::TreeNode => 0x50,
            Self::Bit => 0x60,
            Self::Double => 0x70,
            Self::Guid => 0x80,
        }
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits & MASK_BASE_TYPE {
            0x10 => Some(Self::String),
            0x20 => Some(Self::Integer),
            0x30 => Some(Self::DateTime),
            0x40 => Some(Self::LongText),
            0x50 => Some(Self::TreeNode),
            0x60 => Some(Self::Bit),
            0x70 => Some(Self::Double),
            0x80 => Some(Self::Guid),
            _ => None,
        }
    }
}

/// Public field type, derived from the PS type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    DateTime,
    PlainText,
    Html,
    History,
    TreePath,
    Double,
    Guid,
    Boolean,
}

impl FieldType {
    /// The runtime type values of this field type are stored as.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::String | Self::PlainText | Self::Html | Self::History | Self::TreePath => {
                ValueType::String
            }
            Self::Integer => ValueType::Integer,
            Self::DateTime => ValueType::DateTime,
            Self::Double => ValueType::Double,
            Self::Guid => ValueType::Guid,
            Self::Boolean => ValueType::Boolean,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::DateTime => "datetime",
            Self::PlainText => "plaintext",
            Self::Html => "html",
            Self::History => "history",
            Self::TreePath => "treepath",
            Self::Double => "double",
            Self::Guid => "guid",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field definition's raw storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageType(pub u32);

impl StorageType {
    #[must_use]
    pub const fn new(base: BaseType, subtype: u32) -> Self {
        Self(base.bits() | (subtype & MASK_SUBTYPE))
    }

    #[must_use]
    pub const fn readonly(self) -> Self {
        Self(self.0 | FLAG_READONLY)
    }

    #[must_use]
    pub const fn ignored(self) -> Self {
        Self(self.0 | FLAG_IGNORE)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn base_type(self) -> Option<BaseType> {
        BaseType::from_bits(self.0)
    }

    #[must_use]
    pub const fn subtype(self) -> u32 {
        self.0 & MASK_SUBTYPE
    }

    #[must_use]
    pub const fn ps_type(self) -> u32 {
        self.0 & MASK_BASE_AND_SUBTYPE
    }

    #[must_use]
    pub const fn is_readonly(self) -> bool {
        self.0 & FLAG_READONLY != 0
    }

    #[must_use]
    pub const fn is_ignored(self) -> bool {
        self.0 & FLAG_IGNORE != 0
    }

    #[must_use]
    pub const fn is_base(self, base: BaseType) -> bool {
        self.0 & MASK_BASE_TYPE == base.bits()
    }

    /// Maps the PS type to the public field type. Unrecognized PS types are
    /// treated as strings.
    #[must_use]
    pub const fn field_type(self) -> FieldType {
        let subtype = self.subtype();
        match self.base_type() {
            Some(BaseType::String) => {
                if subtype == SUBTYPE_TREE_PATH {
                    FieldType::TreePath
                } else {
                    FieldType::String
                }
            }
            Some(BaseType::Integer) => FieldType::Integer,
            Some(BaseType::Double) => FieldType::Double,
            Some(BaseType::DateTime) => FieldType::DateTime,
            Some(BaseType::LongText) => match subtype {
                SUBTYPE_HISTORY => FieldType::History,
                SUBTYPE_HTML => FieldType::Html,
                _ => FieldType::PlainText,
            },
            Some(BaseType::Guid) => FieldType::Guid,
            Some(BaseType::Bit) => FieldType::Boolean,
            Some(BaseType::TreeNode) | None => FieldType::String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_do_not_leak_into_ps_type() {
        let st = StorageType::new(BaseType::String, SUBTYPE_PERSON)
            .readonly()
            .ignored();
        assert!(st.is_readonly());
        assert!(st.is_ignored());
        assert_eq!(st.ps_type(), 0x10 | SUBTYPE_PERSON);
        assert_eq!(st.base_type(), Some(BaseType::String));
    }

    #[test]
    fn field_type_mapping() {
        assert_eq!(
            StorageType::new(BaseType::String, SUBTYPE_TREE_PATH).field_type(),
            FieldType::TreePath
        );
        assert_eq!(
            StorageType::new(BaseType::Integer, SUBTYPE_TREE_ID).field_type(),
            FieldType::Integer
        );
        assert_eq!(
            StorageType::new(BaseType::LongText, SUBTYPE_HISTORY).field_type(),
            FieldType::History
        );
        assert_eq!(
            StorageType::new(BaseType::LongText, SUBTYPE_HTML).field_type(),
            FieldType::Html
        );
        assert_eq!(
            StorageType::new(BaseType::LongText, 0).field_type(),
            FieldType::PlainText
        );
        assert_eq!(StorageType::new(BaseType::Bit, 0).field_type(), FieldType::Boolean);
        assert_eq!(StorageType::new(BaseType::TreeNode, 0).field_type(), FieldType::String);
        assert_eq!(StorageType(0x0F).field_type(), FieldType::String);
    }

    #[test]
    fn value_types_follow_field_types() {
        assert_eq!(FieldType::History.value_type(), ValueType::String);
        assert_eq!(FieldType::TreePath.value_type(), ValueType::String);
        assert_eq!(FieldType::Boolean.value_type(), ValueType::Boolean);
    }
}
