//! Main code generator orchestrator

use crate::config::EffectiveConfig;
use crate::schema::ColumnDescriptor;
use crate::translate::LabelTranslator;

pub use super::form_generator::generate_form;
pub use super::model_generator::generate_model;
use super::INDENT;

/// Class blocks produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub model: Option<String>,
    pub form: Option<String>,
}

impl GeneratedArtifact {
    /// Assemble the output document.
    ///
    /// With `tab` set, leading groups of four spaces become tab characters.
    pub fn render(&self, tab: bool) -> String {
        let mut document = String::from("__all__ = []\n\n");

        if let Some(model) = &self.model {
            document.push_str("# SQLAlchemy model\n");
            document.push_str(model);
            if self.form.is_some() {
                document.push_str("\n\n");
            }
        }

        if let Some(form) = &self.form {
            document.push_str("# WTForms form\n");
            document.push_str(form);
        }

        if tab {
            indent_with_tabs(&document)
        } else {
            document
        }
    }

    /// Names of the generated blocks, for the run summary
    pub fn parts(&self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        if self.model.is_some() {
            parts.push("model");
        }
        if self.form.is_some() {
            parts.push("form");
        }
        parts
    }
}

/// Main code generator that orchestrates model and form generation
pub struct CodeGenerator<'a> {
    config: &'a EffectiveConfig,
    translator: &'a LabelTranslator,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a EffectiveConfig, translator: &'a LabelTranslator) -> Self {
        Self { config, translator }
    }

    /// Generate the blocks the configured mode asks for
    pub fn generate(&self, columns: &[ColumnDescriptor]) -> GeneratedArtifact {
        GeneratedArtifact {
            model: self
                .config
                .mode
                .includes_model()
                .then(|| self.emit_model(columns)),
            form: self
                .config
                .mode
                .includes_form()
                .then(|| self.emit_form(columns)),
        }
    }

    /// Generate the SQLAlchemy model block
    pub fn emit_model(&self, columns: &[ColumnDescriptor]) -> String {
        let (model_class, _) = self.config.class_names();
        generate_model(columns, self.config, &model_class)
    }

    /// Generate the WTForms form block
    pub fn emit_form(&self, columns: &[ColumnDescriptor]) -> String {
        let (_, form_class) = self.config.class_names();
        generate_form(columns, self.config, &form_class, self.translator)
    }
}

/// Replace each leading group of four spaces with a tab, line by line
pub fn indent_with_tabs(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            let mut rest = line;
            let mut tabs = 0;
            while let Some(stripped) = rest.strip_prefix(INDENT) {
                rest = stripped;
                tabs += 1;
            }
            format!("{}{}", "\t".repeat(tabs), rest)
        })
        .collect()
}
