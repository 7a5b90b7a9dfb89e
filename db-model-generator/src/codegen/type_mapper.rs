//! Database type to SQLAlchemy / WTForms token mapping

use std::collections::BTreeMap;

use crate::config::defaults::{self, ModelFlavor};
use crate::config::EffectiveConfig;

/// Coarse type family a native column type falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
}

impl TypeFamily {
    /// Classify a lowercase type keyword. Unknown keywords are strings.
    pub fn from_keyword(keyword: &str) -> Self {
        let keyword = keyword.trim().to_lowercase();
        let first_word = keyword.split_whitespace().next().unwrap_or_default();

        if matches!(first_word, "bool" | "boolean") {
            return TypeFamily::Boolean;
        }

        // Text types (TEXT, MEDIUMTEXT, CLOB, CITEXT)
        if keyword.contains("text") || keyword.contains("clob") {
            return TypeFamily::Text;
        }

        // String types
        if keyword.starts_with("varchar")
            || keyword.starts_with("nvarchar")
            || keyword.starts_with("char")
            || keyword.starts_with("nchar")
            || keyword.starts_with("character")
            || keyword.starts_with("string")
        {
            return TypeFamily::String;
        }

        if matches!(
            first_word,
            "int"
                | "integer"
                | "int2"
                | "int4"
                | "int8"
                | "tinyint"
                | "smallint"
                | "mediumint"
                | "bigint"
                | "serial"
                | "smallserial"
                | "bigserial"
        ) {
            return TypeFamily::Integer;
        }

        if matches!(
            first_word,
            "float" | "float4" | "float8" | "double" | "real" | "numeric" | "decimal" | "money"
        ) {
            return TypeFamily::Float;
        }

        // Date/time types; "datetime" must be tested before "date"
        if keyword.starts_with("datetime") || keyword.starts_with("timestamp") {
            return TypeFamily::DateTime;
        }
        if keyword == "date" {
            return TypeFamily::Date;
        }

        TypeFamily::String
    }

    /// Key of this family in the `type_mapping` / `field_mapping` tables
    pub fn key(&self) -> &'static str {
        match self {
            TypeFamily::String => "string",
            TypeFamily::Text => "text",
            TypeFamily::Integer => "integer",
            TypeFamily::Float => "float",
            TypeFamily::Boolean => "boolean",
            TypeFamily::DateTime => "datetime",
            TypeFamily::Date => "date",
        }
    }

    /// String and text families carry a declared length
    pub fn is_textual(&self) -> bool {
        matches!(self, TypeFamily::String | TypeFamily::Text)
    }
}

/// Resolves type keywords to tokens using the effective mapping tables
pub struct TypeMapper<'a> {
    storage: &'a BTreeMap<String, String>,
    fields: &'a BTreeMap<String, String>,
    flavor: ModelFlavor,
}

impl<'a> TypeMapper<'a> {
    pub fn new(config: &'a EffectiveConfig) -> Self {
        Self {
            storage: &config.model.type_mapping,
            fields: &config.form.field_mapping,
            flavor: config.flavor,
        }
    }

    /// Storage type token, e.g. `db.String(100)`
    pub fn storage_type(&self, keyword: &str, length: Option<u32>) -> String {
        let family = TypeFamily::from_keyword(keyword);
        let token = self
            .storage
            .get(family.key())
            .or_else(|| self.storage.get("string"))
            .map(String::as_str)
            .unwrap_or_else(|| self.flavor.default_storage_token(family.key()));

        match length {
            Some(len) if family.is_textual() => format!("{}({})", token, len),
            _ => token.to_string(),
        }
    }

    /// Form field class, e.g. `StringField`
    pub fn field_type(&self, keyword: &str) -> String {
        let family = TypeFamily::from_keyword(keyword);
        self.fields
            .get(family.key())
            .or_else(|| self.fields.get("string"))
            .map(String::as_str)
            .unwrap_or_else(|| defaults::default_field_token(family.key()))
            .to_string()
    }
}
