//! Environment-file defaults (`.env`)

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::resolver::{drop_blank_values, normalize_argument_keys};
use super::settings::ArgumentsRecord;
use crate::error::{GeneratorError, Result};

/// Keys of the `arguments` section an environment file may set
const ARGUMENT_KEYS: [&str; 12] = [
    "database_url",
    "table_name",
    "output_path",
    "default_rename",
    "only_model",
    "only_form",
    "classic_sqlalchemy",
    "tab",
    "translate_labels",
    "label_original_language",
    "log_mode",
    "submit",
];

const CONFIG_PATH_KEY: &str = "config_path";

/// Defaults read from an environment file, sitting just above the built-in values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentDefaults {
    /// Config file to use when none is given explicitly
    pub config_path: Option<PathBuf>,
    pub arguments: ArgumentsRecord,
}

impl EnvironmentDefaults {
    /// Load from `env_file`, or from a `.env` found in the working directory
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let pairs = match env_file {
            Some(path) if path.exists() => {
                debug!("Loading environment from {}", path.display());
                dotenvy::from_path_iter(path)?.collect::<std::result::Result<Vec<_>, _>>()?
            }
            Some(path) => {
                warn!("Environment file does not exist: {}", path.display());
                Vec::new()
            }
            None => match dotenvy::dotenv_iter() {
                Ok(iter) => {
                    debug!("Loading environment from .env");
                    iter.collect::<std::result::Result<Vec<_>, _>>()?
                }
                Err(_) => Vec::new(),
            },
        };
        Self::from_pairs(pairs)
    }

    /// Build from raw key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.as_ref().to_lowercase(), coerce_value(value.as_ref()));
        }
        normalize_argument_keys(&mut map);
        drop_blank_values(&mut map);

        let config_path = match map.remove(CONFIG_PATH_KEY) {
            Some(Value::String(path)) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => None,
        };

        map.retain(|key, _| {
            let known = ARGUMENT_KEYS.contains(&key.as_str());
            if !known {
                debug!("Ignoring unknown environment key: {}", key);
            }
            known
        });

        let arguments: ArgumentsRecord = serde_json::from_value(Value::Object(map))
            .map_err(|e| GeneratorError::ConfigError(format!("Invalid environment value: {}", e)))?;

        Ok(Self {
            config_path,
            arguments,
        })
    }
}

/// `true`/`1` and `false`/`0` (any case) become booleans; everything else stays text
fn coerce_value(raw: &str) -> Value {
    match raw.to_lowercase().as_str() {
        "true" | "1" => Value::Bool(true),
        "false" | "0" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}
