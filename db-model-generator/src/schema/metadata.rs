//! Column metadata read from a live database

use serde::{Deserialize, Serialize};

use crate::codegen::TypeFamily;

/// Metadata for a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Lowercase native type without its length suffix (e.g., "varchar", "timestamp")
    pub type_keyword: String,

    /// Whether the column is nullable
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Whether this column belongs to the primary key
    pub primary_key: bool,

    /// Declared length, only for string and text types
    pub length: Option<u32>,
}

/// A column as the backend reports it, before normalization
#[derive(Debug, Clone)]
pub(crate) struct NativeColumn {
    pub name: String,
    pub data_type: String,
    pub length: Option<i64>,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

impl ColumnDescriptor {
    pub(crate) fn from_native(native: NativeColumn) -> Self {
        let (keyword, parsed_length) = split_native_type(&native.data_type);
        let length = if TypeFamily::from_keyword(&keyword).is_textual() {
            native
                .length
                .and_then(|len| u32::try_from(len).ok())
                .or(parsed_length)
        } else {
            None
        };

        Self {
            name: native.name,
            type_keyword: keyword,
            nullable: native.nullable,
            default_value: native.default_value,
            primary_key: native.primary_key,
            length,
        }
    }

    pub fn family(&self) -> TypeFamily {
        TypeFamily::from_keyword(&self.type_keyword)
    }
}

/// Split a native type like `VARCHAR(255)` into `("varchar", Some(255))`.
///
/// `TINYINT(1)` and `BIT(1)` are the usual boolean spellings and collapse to `"boolean"`.
pub fn split_native_type(data_type: &str) -> (String, Option<u32>) {
    let lower = data_type.trim().to_lowercase();
    let Some(open) = lower.find('(') else {
        return (lower, None);
    };

    let base = lower[..open].trim().to_string();
    let params = lower[open + 1..].split(')').next().unwrap_or_default();
    let length = params
        .split(',')
        .next()
        .and_then(|first| first.trim().parse::<u32>().ok());

    if (base == "tinyint" || base == "bit") && length == Some(1) {
        return ("boolean".to_string(), None);
    }
    (base, length)
}
