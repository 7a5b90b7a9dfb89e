//! Layered settings resolution
//!
//! Precedence, lowest to highest: built-in defaults, environment file,
//! config file, call-time arguments.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::defaults::{DefaultSettings, ModelFlavor};
use super::environment::EnvironmentDefaults;
use super::languages;
use super::settings::{Arguments, ArgumentsRecord, EffectiveConfig, GenerationMode, SettingsRecord};
use crate::error::{GeneratorError, Result};
use crate::schema::normalize_database_url;

/// Call-time arguments. `None` leaves lower layers untouched; `Some(false)` overrides them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArgumentOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rename: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_form: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classic_sqlalchemy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_original_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,
}

/// Merges all settings layers into an [`EffectiveConfig`]
pub struct ConfigResolver {
    environment: EnvironmentDefaults,
    config_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(environment: EnvironmentDefaults) -> Self {
        Self {
            environment,
            config_path: None,
        }
    }

    /// Config file to merge; falls back to the environment's `config_path`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn resolve(&self, overrides: &ArgumentOverrides) -> Result<EffectiveConfig> {
        let config_path = self
            .config_path
            .as_ref()
            .or(self.environment.config_path.as_ref());
        let file_layer = match config_path {
            Some(path) => load_config_file(path)?,
            None => None,
        };

        // The flavor picks the model defaults, so it is decided before any merge
        let classic = overrides
            .classic_sqlalchemy
            .or_else(|| file_layer.as_ref().and_then(file_classic_flag))
            .unwrap_or(self.environment.arguments.classic_sqlalchemy);
        let flavor = ModelFlavor::from_classic_flag(classic);
        debug!("Model flavor: {:?}", flavor);

        let mut merged = serde_json::to_value(DefaultSettings::new(flavor, &self.environment))?;
        if let Some(file) = file_layer {
            merge_values(&mut merged, file);
        }
        apply_overrides(&mut merged, overrides)?;

        let record: SettingsRecord = serde_json::from_value(merged)
            .map_err(|e| GeneratorError::ConfigError(format!("Invalid configuration: {}", e)))?;
        validate(record)
    }
}

/// Rename historical argument keys to their canonical names
pub(crate) fn normalize_argument_keys(arguments: &mut Map<String, Value>) {
    for (alias, canonical) in [("database", "database_url"), ("output", "output_path")] {
        if let Some(value) = arguments.remove(alias) {
            arguments.insert(canonical.to_string(), value);
        }
    }
}

/// Blank strings mean "unset", as in `.env` templates with empty values
pub(crate) fn drop_blank_values(arguments: &mut Map<String, Value>) {
    arguments.retain(|_, value| !matches!(value, Value::String(s) if s.trim().is_empty()));
}

/// Recursively merge `overlay` into `base`. Nested mappings merge key by key;
/// any other value (lists included) replaces the base value wholesale.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let both_objects =
                    value.is_object() && base_map.get(&key).is_some_and(Value::is_object);
                if both_objects {
                    if let Some(existing) = base_map.get_mut(&key) {
                        merge_values(existing, value);
                    }
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Parse a JSON (default) or TOML config file; a missing file only warns
fn load_config_file(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        warn!("Config file does not exist: {}", path.display());
        return Ok(None);
    }
    debug!("Loading config file {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let mut root: Value = if is_toml {
        let parsed: toml::Value = toml::from_str(&content).map_err(|e| {
            GeneratorError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::to_value(parsed)?
    } else {
        serde_json::from_str(&content).map_err(|e| {
            GeneratorError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?
    };

    if !root.is_object() {
        return Err(GeneratorError::ConfigError(format!(
            "Config file {} must contain a table of sections",
            path.display()
        )));
    }
    if let Some(Value::Object(arguments)) = root.get_mut("arguments") {
        normalize_argument_keys(arguments);
        drop_blank_values(arguments);
    }
    Ok(Some(root))
}

fn file_classic_flag(file: &Value) -> Option<bool> {
    file.get("arguments")?.get("classic_sqlalchemy")?.as_bool()
}

fn apply_overrides(merged: &mut Value, overrides: &ArgumentOverrides) -> Result<()> {
    let Value::Object(present) = serde_json::to_value(overrides)? else {
        return Ok(());
    };
    if let Some(Value::Object(arguments)) = merged.get_mut("arguments") {
        for (key, value) in present {
            arguments.insert(key, value);
        }
    }
    Ok(())
}

fn validate(record: SettingsRecord) -> Result<EffectiveConfig> {
    let SettingsRecord {
        model,
        form,
        arguments,
    } = record;

    let mode = GenerationMode::from_flags(arguments.only_model, arguments.only_form)?;

    let database_url = required(arguments.database_url.as_deref(), "database_url")?;
    let table_name = required(arguments.table_name.as_deref(), "table_name")?;

    if let Some(code) = &arguments.translate_labels {
        check_language(code, "translate_labels")?;
    }
    check_language(&arguments.label_original_language, "label_original_language")?;

    warn_meaningless_arguments(&arguments, mode);

    Ok(EffectiveConfig {
        model,
        form,
        flavor: ModelFlavor::from_classic_flag(arguments.classic_sqlalchemy),
        mode,
        arguments: Arguments {
            database_url: normalize_database_url(database_url),
            table_name: table_name.to_string(),
            output_path: arguments.output_path,
            default_rename: arguments.default_rename,
            tab: arguments.tab,
            translate_labels: arguments.translate_labels,
            label_original_language: arguments.label_original_language,
            log_mode: arguments.log_mode,
            submit: arguments.submit,
        },
    })
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GeneratorError::ValidationError(format!("{} is required", name))),
    }
}

fn check_language(code: &str, name: &str) -> Result<()> {
    if languages::is_supported(code) {
        Ok(())
    } else {
        Err(GeneratorError::ValidationError(format!(
            "Language code {} is not supported ({})",
            code, name
        )))
    }
}

fn warn_meaningless_arguments(arguments: &ArgumentsRecord, mode: GenerationMode) {
    let model_only = mode == GenerationMode::ModelOnly;
    let custom_source = arguments.label_original_language != super::defaults::LABEL_ORIGINAL_LANGUAGE;

    if (custom_source && arguments.translate_labels.is_none()) || (model_only && custom_source) {
        warn!("label_original_language is meaningless here");
    }
    if model_only && arguments.translate_labels.is_some() {
        warn!("translate_labels is meaningless with only_model");
    }
    if model_only && arguments.submit.is_some() {
        warn!("submit is meaningless with only_model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn overrides(table: &str) -> ArgumentOverrides {
        ArgumentOverrides {
            database_url: Some("sqlite:///app.db".into()),
            table_name: Some(table.into()),
            ..Default::default()
        }
    }

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_merge_values_recursive() {
        let mut base = json!({
            "model": {"base_class": "db.Model", "imports": ["a", "b"], "type_mapping": {"string": "db.String", "text": "db.Text"}},
            "arguments": {"tab": false}
        });
        merge_values(
            &mut base,
            json!({
                "model": {"imports": ["c"], "type_mapping": {"string": "db.Unicode"}},
                "arguments": {"tab": true}
            }),
        );
        assert_eq!(base["model"]["base_class"], "db.Model");
        assert_eq!(base["model"]["imports"], json!(["c"]));
        assert_eq!(base["model"]["type_mapping"]["string"], "db.Unicode");
        assert_eq!(base["model"]["type_mapping"]["text"], "db.Text");
        assert_eq!(base["arguments"]["tab"], true);
    }

    #[test]
    fn test_merge_replaces_mapping_with_scalar() {
        let mut base = json!({"form": {"meta": {"csrf": false}}});
        merge_values(&mut base, json!({"form": {"meta": "none"}}));
        assert_eq!(base["form"]["meta"], "none");
    }

    #[test]
    fn test_normalize_argument_keys() {
        let mut args = Map::new();
        args.insert("database".into(), json!("sqlite:///x.db"));
        args.insert("output".into(), json!("out.py"));
        normalize_argument_keys(&mut args);
        assert_eq!(args["database_url"], "sqlite:///x.db");
        assert_eq!(args["output_path"], "out.py");
        assert!(!args.contains_key("database"));
    }

    #[test]
    fn test_blank_file_arguments_are_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "generator.json",
            r#"{"arguments": {"translate_labels": "", "output": " ", "tab": true}}"#,
        );
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .config_path(Some(path))
            .resolve(&overrides("users"))
            .unwrap();
        assert!(config.arguments.translate_labels.is_none());
        assert!(config.arguments.output_path.is_none());
        assert!(config.arguments.tab);
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&overrides("users"))
            .unwrap();
        assert_eq!(config.flavor, ModelFlavor::FlaskSqlalchemy);
        assert_eq!(config.mode, GenerationMode::Both);
        assert_eq!(config.model.base_class, "db.Model");
        assert_eq!(config.arguments.table_name, "users");
        assert!(config.arguments.output_path.is_none());
    }

    #[test]
    fn test_both_modes_is_validation_error() {
        let mut args = overrides("users");
        args.only_model = Some(true);
        args.only_form = Some(true);
        let err = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&args)
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_missing_required_arguments() {
        let err = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&ArgumentOverrides::default())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ValidationError(ref m) if m.contains("database_url")));

        let args = ArgumentOverrides {
            database_url: Some("app.db".into()),
            ..Default::default()
        };
        let err = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&args)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ValidationError(ref m) if m.contains("table_name")));
    }

    #[test]
    fn test_precedence_env_file_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "generator.json",
            r#"{"arguments": {"table_name": "from_file", "output": "file.py", "tab": true}}"#,
        );
        let env = EnvironmentDefaults::from_pairs([
            ("DATABASE_URL", "sqlite:///env.db"),
            ("TABLE_NAME", "from_env"),
            ("DEFAULT_RENAME", "true"),
        ])
        .unwrap();

        let resolver = ConfigResolver::new(env).config_path(Some(path));

        let config = resolver.resolve(&ArgumentOverrides::default()).unwrap();
        assert_eq!(config.arguments.database_url, "sqlite:///env.db");
        assert_eq!(config.arguments.table_name, "from_file");
        assert_eq!(config.arguments.output_path, Some(PathBuf::from("file.py")));
        assert!(config.arguments.default_rename);
        assert!(config.arguments.tab);

        let call = ArgumentOverrides {
            table_name: Some("from_call".into()),
            tab: Some(false),
            ..Default::default()
        };
        let config = resolver.resolve(&call).unwrap();
        assert_eq!(config.arguments.table_name, "from_call");
        assert!(!config.arguments.tab);
    }

    #[test]
    fn test_classic_swaps_model_defaults_before_file_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "generator.json",
            r#"{"arguments": {"classic_sqlalchemy": true}, "model": {"exclude_columns": ["created_at"]}}"#,
        );
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .config_path(Some(path))
            .resolve(&overrides("users"))
            .unwrap();
        assert_eq!(config.flavor, ModelFlavor::Classic);
        assert_eq!(config.model.base_class, "Base");
        assert_eq!(config.model.type_mapping["string"], "String");
        assert_eq!(config.model.exclude_columns, vec!["created_at".to_string()]);
    }

    #[test]
    fn test_call_time_classic_flag_wins() {
        let mut args = overrides("users");
        args.classic_sqlalchemy = Some(true);
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&args)
            .unwrap();
        assert_eq!(config.flavor, ModelFlavor::Classic);
        assert!(config.model.exclude_columns.contains(&"id".to_string()));
    }

    #[test]
    fn test_toml_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "generator.toml",
            r#"
                [form]
                base_class = "Form"

                [form.meta]
                csrf = false
                locales = "ru"
            "#,
        );
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .config_path(Some(path))
            .resolve(&overrides("users"))
            .unwrap();
        assert_eq!(config.form.base_class, "Form");
        let keys: Vec<&String> = config.form.meta.keys().collect();
        assert_eq!(keys, ["csrf", "locales"]);
    }

    #[test]
    fn test_missing_config_file_keeps_defaults() {
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .config_path(Some(PathBuf::from("/nonexistent/generator.json")))
            .resolve(&overrides("users"))
            .unwrap();
        assert_eq!(config.model.base_class, "db.Model");
    }

    #[test]
    fn test_unsupported_language() {
        let mut args = overrides("users");
        args.translate_labels = Some("klingon".into());
        let err = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&args)
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_bare_path_becomes_sqlite_url() {
        let args = ArgumentOverrides {
            database_url: Some("data/app.db".into()),
            table_name: Some("users".into()),
            ..Default::default()
        };
        let config = ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&args)
            .unwrap();
        assert_eq!(config.arguments.database_url, "sqlite:///data/app.db");
    }
}
