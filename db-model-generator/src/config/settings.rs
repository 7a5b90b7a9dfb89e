//! Configuration settings for db-model-generator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::defaults::{self, ModelFlavor};
use crate::error::{GeneratorError, Result};

/// `model` section: how the SQLAlchemy class is rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Base class of the generated model (e.g., `db.Model`)
    pub base_class: String,

    /// Import lines emitted above the class, one per entry
    pub imports: Vec<String>,

    /// Columns left out of both the model and the form
    pub exclude_columns: Vec<String>,

    /// Type family (`string`, `integer`, ...) to storage type token
    pub type_mapping: BTreeMap<String, String>,
}

/// `form` section: how the WTForms class is rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    /// Base class of the generated form (e.g., `FlaskForm`)
    pub base_class: String,

    /// Import lines emitted above the class, one per entry
    pub imports: Vec<String>,

    /// Type family to form field class
    pub field_mapping: BTreeMap<String, String>,

    /// Validator expressions keyed by purpose (`required`, `email`)
    pub default_validators: BTreeMap<String, String>,

    /// Options rendered into a nested `class Meta:` block, in file order
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

impl FormSettings {
    pub fn validator(&self, purpose: &str) -> &str {
        match self.default_validators.get(purpose) {
            Some(expr) => expr,
            None if purpose == "email" => defaults::EMAIL_VALIDATOR,
            None => defaults::REQUIRED_VALIDATOR,
        }
    }
}

/// `arguments` section as it appears in config and environment files
///
/// Everything is optional here; [`Arguments`] is the validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentsRecord {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Name the classes `Model` and `Form`
    #[serde(default)]
    pub default_rename: bool,

    #[serde(default)]
    pub only_model: bool,

    #[serde(default)]
    pub only_form: bool,

    #[serde(default)]
    pub classic_sqlalchemy: bool,

    /// Indent with tabs instead of four spaces
    #[serde(default)]
    pub tab: bool,

    /// Target language code for form labels
    #[serde(default)]
    pub translate_labels: Option<String>,

    #[serde(default = "default_label_original_language")]
    pub label_original_language: String,

    /// Verbose logging
    #[serde(default)]
    pub log_mode: bool,

    /// Submit button label; no button when absent
    #[serde(default)]
    pub submit: Option<String>,
}

fn default_label_original_language() -> String {
    defaults::LABEL_ORIGINAL_LANGUAGE.to_string()
}

impl Default for ArgumentsRecord {
    fn default() -> Self {
        Self {
            database_url: None,
            table_name: None,
            output_path: None,
            default_rename: false,
            only_model: false,
            only_form: false,
            classic_sqlalchemy: false,
            tab: false,
            translate_labels: None,
            label_original_language: default_label_original_language(),
            log_mode: false,
            submit: None,
        }
    }
}

/// The full nested record the resolver merges layers into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub model: ModelSettings,
    pub form: FormSettings,
    pub arguments: ArgumentsRecord,
}

/// Which class blocks a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Both,
    ModelOnly,
    FormOnly,
}

impl GenerationMode {
    pub fn from_flags(only_model: bool, only_form: bool) -> Result<Self> {
        match (only_model, only_form) {
            (true, true) => Err(GeneratorError::ValidationError(
                "only_model and only_form are mutually exclusive".into(),
            )),
            (true, false) => Ok(GenerationMode::ModelOnly),
            (false, true) => Ok(GenerationMode::FormOnly),
            (false, false) => Ok(GenerationMode::Both),
        }
    }

    pub fn includes_model(&self) -> bool {
        !matches!(self, GenerationMode::FormOnly)
    }

    pub fn includes_form(&self) -> bool {
        !matches!(self, GenerationMode::ModelOnly)
    }
}

/// Validated run arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    /// Normalized connection URL
    pub database_url: String,
    pub table_name: String,
    /// Output file; generated code goes to stdout when absent
    pub output_path: Option<PathBuf>,
    pub default_rename: bool,
    pub tab: bool,
    pub translate_labels: Option<String>,
    pub label_original_language: String,
    pub log_mode: bool,
    pub submit: Option<String>,
}

/// Fully merged settings consumed by the emitter and the driver
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub model: ModelSettings,
    pub form: FormSettings,
    pub arguments: Arguments,
    pub flavor: ModelFlavor,
    pub mode: GenerationMode,
}

impl EffectiveConfig {
    /// Class names for the model and the form
    pub fn class_names(&self) -> (String, String) {
        if self.arguments.default_rename {
            ("Model".to_string(), "Form".to_string())
        } else {
            let table = &self.arguments.table_name;
            (
                crate::codegen::to_class_name(table),
                crate::codegen::to_form_class_name(table),
            )
        }
    }
}
