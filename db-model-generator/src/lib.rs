//! db-model-generator: Generate SQLAlchemy models and WTForms forms from live database tables
//!
//! This crate provides both a CLI tool and a library. It reads the column
//! metadata of one table from SQLite, PostgreSQL or MySQL and writes a Python
//! module containing:
//!
//! - A Flask-SQLAlchemy model (or a classic declarative SQLAlchemy model)
//! - A WTForms form with validators derived from the column constraints
//!
//! Settings are merged from built-in defaults, a dotenv file, a JSON or TOML
//! config file and call-time arguments, in that order of precedence.
//!
//! # Programmatic Usage
//!
//! ```rust,ignore
//! fn main() {
//!     db_model_generator::GeneratorBuilder::new("sqlite:///app.db", "users")
//!         .output_path("models.py")
//!         .submit("Save")
//!         .generate()
//!         .expect("Failed to generate models");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! db-model-generator app.db users models.py --submit
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;
pub mod translate;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use codegen::CodeGenerator;
use config::{ArgumentOverrides, ConfigResolver, EnvironmentDefaults};
use schema::{ColumnSource, SchemaReader};
use translate::LabelTranslator;

pub use config::EffectiveConfig;
pub use error::{GeneratorError, Result};

/// Outcome of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// File written, or `None` when the document went to stdout
    pub output_path: Option<PathBuf>,
    /// Generated blocks (`model`, `form`)
    pub parts: Vec<&'static str>,
    /// Columns read from the table
    pub column_count: usize,
    /// The full generated document
    pub document: String,
}

/// Main entry point for code generation
pub fn generate(config: &EffectiveConfig) -> Result<GenerationReport> {
    info!(
        "Reading table {} from {}",
        config.arguments.table_name,
        redact_url(&config.arguments.database_url)
    );
    let reader = SchemaReader::connect(&config.arguments.database_url)?;
    let translator = LabelTranslator::for_arguments(&config.arguments);
    generate_from_source(config, &reader, &translator)
}

/// Generate from any column source with an injected label translator
pub fn generate_from_source(
    config: &EffectiveConfig,
    source: &impl ColumnSource,
    translator: &LabelTranslator,
) -> Result<GenerationReport> {
    let columns = source.read_columns(&config.arguments.table_name)?;

    let artifact = CodeGenerator::new(config, translator).generate(&columns);
    let document = artifact.render(config.arguments.tab);
    let parts = artifact.parts();

    match &config.arguments.output_path {
        Some(path) => {
            debug!("Writing {} bytes to {}", document.len(), path.display());
            fs::write(path, &document)?;
            info!("Generated {} into {}", parts.join(", "), path.display());
        }
        None => {
            print!("{}", document);
            info!("Generated {}", parts.join(", "));
        }
    }

    Ok(GenerationReport {
        output_path: config.arguments.output_path.clone(),
        parts,
        column_count: columns.len(),
        document,
    })
}

/// Hide the password part of a connection URL for logging
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => match credentials.split_once(':') {
            Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}

/// Builder pattern for one-call programmatic generation
pub struct GeneratorBuilder {
    overrides: ArgumentOverrides,
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl GeneratorBuilder {
    /// Create a new builder for one table of the given database
    pub fn new(database_url: &str, table_name: &str) -> Self {
        Self {
            overrides: ArgumentOverrides {
                database_url: Some(database_url.to_string()),
                table_name: Some(table_name.to_string()),
                ..Default::default()
            },
            config_path: None,
            env_file: None,
        }
    }

    /// Merge a JSON or TOML config file
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read defaults from this dotenv file instead of a discovered `.env`
    pub fn env_file(mut self, path: impl AsRef<Path>) -> Self {
        self.env_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Write the document to a file instead of stdout
    pub fn output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.overrides.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Name the classes `Model` and `Form`
    pub fn default_rename(mut self) -> Self {
        self.overrides.default_rename = Some(true);
        self
    }

    /// Generate only the model
    pub fn only_model(mut self) -> Self {
        self.overrides.only_model = Some(true);
        self
    }

    /// Generate only the form
    pub fn only_form(mut self) -> Self {
        self.overrides.only_form = Some(true);
        self
    }

    /// Target plain SQLAlchemy instead of Flask-SQLAlchemy
    pub fn classic_sqlalchemy(mut self) -> Self {
        self.overrides.classic_sqlalchemy = Some(true);
        self
    }

    /// Indent with tabs
    pub fn tab(mut self) -> Self {
        self.overrides.tab = Some(true);
        self
    }

    /// Translate form labels into `language`
    pub fn translate_labels(mut self, language: &str) -> Self {
        self.overrides.translate_labels = Some(language.to_string());
        self
    }

    /// Source language of the labels
    pub fn label_original_language(mut self, language: &str) -> Self {
        self.overrides.label_original_language = Some(language.to_string());
        self
    }

    /// Add a submit button with this label
    pub fn submit(mut self, label: &str) -> Self {
        self.overrides.submit = Some(label.to_string());
        self
    }

    /// Resolve all settings layers without touching the database
    pub fn resolve(&self) -> Result<EffectiveConfig> {
        let environment = EnvironmentDefaults::load(self.env_file.as_deref())?;
        ConfigResolver::new(environment)
            .config_path(self.config_path.clone())
            .resolve(&self.overrides)
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        let config = self.resolve()?;
        generate(&config)
    }
}
