//! Default configuration values - single source of truth

use std::collections::BTreeMap;

use super::environment::EnvironmentDefaults;
use super::settings::{FormSettings, ModelSettings, SettingsRecord};

/// Default source language of generated labels
pub const LABEL_ORIGINAL_LANGUAGE: &str = "en";

/// Label used for the submit button when `--submit` is given without a value
pub const SUBMIT_LABEL: &str = "Submit";

/// Form base class
pub const FORM_BASE_CLASS: &str = "FlaskForm";

/// Validator rendered for non-nullable columns
pub const REQUIRED_VALIDATOR: &str = "DataRequired()";

/// Validator rendered for columns whose name mentions "email"
pub const EMAIL_VALIDATOR: &str = "Email()";

const FAMILY_KEYS: [&str; 7] = [
    "string", "text", "integer", "float", "boolean", "datetime", "date",
];

/// Which SQLAlchemy dialect the model targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFlavor {
    /// Flask-SQLAlchemy: `db.Model`, `db.Column(db.String)`
    FlaskSqlalchemy,
    /// Plain SQLAlchemy declarative base: `Base`, `Column(String)`
    Classic,
}

impl ModelFlavor {
    pub fn from_classic_flag(classic: bool) -> Self {
        if classic {
            ModelFlavor::Classic
        } else {
            ModelFlavor::FlaskSqlalchemy
        }
    }

    /// Column constructor used in field lines
    pub fn column_constructor(&self) -> &'static str {
        match self {
            ModelFlavor::FlaskSqlalchemy => "db.Column",
            ModelFlavor::Classic => "Column",
        }
    }

    /// Flask-SQLAlchemy models need a module-level `db = SQLAlchemy()` handle
    pub fn declares_db_handle(&self) -> bool {
        matches!(self, ModelFlavor::FlaskSqlalchemy)
    }

    /// Built-in storage tokens, indexed like [`FAMILY_KEYS`]
    fn storage_tokens(&self) -> [&'static str; 7] {
        match self {
            ModelFlavor::FlaskSqlalchemy => [
                "db.String",
                "db.Text",
                "db.Integer",
                "db.Float",
                "db.Boolean",
                "db.DateTime",
                "db.Date",
            ],
            ModelFlavor::Classic => [
                "String", "Text", "Integer", "Float", "Boolean", "DateTime", "Date",
            ],
        }
    }

    /// Built-in storage token for a family key (`"string"`, `"integer"`, ...)
    pub fn default_storage_token(&self, family_key: &str) -> &'static str {
        let tokens = self.storage_tokens();
        FAMILY_KEYS
            .iter()
            .position(|key| *key == family_key)
            .map(|idx| tokens[idx])
            .unwrap_or(tokens[0])
    }

    /// Default `model` section for this flavor
    pub fn model_settings(&self) -> ModelSettings {
        let type_mapping = FAMILY_KEYS
            .iter()
            .zip(self.storage_tokens())
            .map(|(key, token)| (key.to_string(), token.to_string()))
            .collect();

        match self {
            ModelFlavor::FlaskSqlalchemy => ModelSettings {
                base_class: "db.Model".to_string(),
                imports: to_strings(&[
                    "from flask_sqlalchemy import SQLAlchemy",
                    "from datetime import datetime",
                ]),
                exclude_columns: to_strings(&["created_at", "updated_at"]),
                type_mapping,
            },
            ModelFlavor::Classic => ModelSettings {
                base_class: "Base".to_string(),
                imports: to_strings(&[
                    "from sqlalchemy import Column, Integer, String, Text, Boolean, DateTime, Date, Float",
                    "from sqlalchemy.ext.declarative import declarative_base",
                    "",
                    "Base = declarative_base()",
                ]),
                exclude_columns: to_strings(&["id", "created_at", "updated_at"]),
                type_mapping,
            },
        }
    }
}

/// Built-in form field token for a family key
pub fn default_field_token(family_key: &str) -> &'static str {
    match family_key {
        "text" => "TextAreaField",
        "integer" => "IntegerField",
        "float" => "FloatField",
        "boolean" => "BooleanField",
        "datetime" => "DateTimeField",
        "date" => "DateField",
        _ => "StringField",
    }
}

/// Default `form` section
pub fn form_settings() -> FormSettings {
    let field_mapping = FAMILY_KEYS
        .iter()
        .map(|key| (key.to_string(), default_field_token(key).to_string()))
        .collect();

    let mut default_validators = BTreeMap::new();
    default_validators.insert("required".to_string(), REQUIRED_VALIDATOR.to_string());
    default_validators.insert("email".to_string(), EMAIL_VALIDATOR.to_string());

    FormSettings {
        base_class: FORM_BASE_CLASS.to_string(),
        imports: to_strings(&[
            "from flask_wtf import FlaskForm",
            "from wtforms import StringField, TextAreaField, IntegerField, FloatField, BooleanField, DateField, DateTimeField, SelectField, SubmitField",
            "from wtforms.validators import DataRequired, Email, Length, NumberRange",
        ]),
        field_mapping,
        default_validators,
        meta: serde_json::Map::new(),
    }
}

/// Factory for the lowest-precedence settings layer.
///
/// The `arguments` section is seeded from the environment file so that the
/// environment sits between the built-in values and the config file.
pub struct DefaultSettings;

impl DefaultSettings {
    pub fn new(flavor: ModelFlavor, environment: &EnvironmentDefaults) -> SettingsRecord {
        SettingsRecord {
            model: flavor.model_settings(),
            form: form_settings(),
            arguments: environment.arguments.clone(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
