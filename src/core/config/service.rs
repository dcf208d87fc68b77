use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::defaults::default_config;
use super::paths::AppPaths;
use super::types::AppConfig;
use super::validation::validate_config;
use crate::core::errors::ApiError;

/// Environment variables that override a single config value.
const ENV_OVERRIDES: [(&str, &[&str]); 4] = [
    ("PORT", &["server", "port"]),
    ("OLLAMA_BASE_URL", &["models", "ollama_base_url"]),
    ("LLM_MODEL", &["models", "llm_model"]),
    ("EMBEDDING_MODEL", &["models", "embedding_model"]),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("CLINIC_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        self.paths.project_root.join("config.yml")
    }

    /// Loads `config.yml` (if any), applies process environment overrides and
    /// returns the validated configuration.
    pub fn load_config(&self) -> Result<AppConfig, ApiError> {
        let file_config = load_yaml_file(&self.config_path())?;
        resolve_config(&file_config, |key| env::var(key).ok(), &self.paths)
    }
}

/// Merges `file_config` over the defaults, applies overrides from `lookup`,
/// validates the result and anchors relative storage paths at the project root.
pub fn resolve_config<F>(
    file_config: &Value,
    lookup: F,
    paths: &AppPaths,
) -> Result<AppConfig, ApiError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = deep_merge(&default_config(), file_config);
    apply_env_overrides(&mut merged, lookup);
    validate_config(&merged)?;

    let mut config: AppConfig =
        serde_json::from_value(merged).map_err(|e| ApiError::Config(e.to_string()))?;
    config.storage.vector_db_path = paths.resolve(&config.storage.vector_db_path);
    config.storage.documents_path = paths.resolve(&config.storage.documents_path);
    config.models.ollama_base_url = config
        .models
        .ollama_base_url
        .trim_end_matches('/')
        .to_string();
    Ok(config)
}

fn load_yaml_file(path: &Path) -> Result<Value, ApiError> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| ApiError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let value = serde_yaml::from_str::<Value>(&contents)
        .map_err(|e| ApiError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ApiError::Config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

fn apply_env_overrides<F>(config: &mut Value, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, path) in ENV_OVERRIDES {
        let Some(raw) = lookup(var) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        // Numeric targets keep the raw string on parse failure so validation reports it.
        let value = match raw.parse::<u64>() {
            Ok(number) if var == "PORT" => Value::from(number),
            _ => Value::String(raw.to_string()),
        };
        ensure_object_path(config, path, value);
    }
}

fn ensure_object_path(config: &mut Value, path: &[&str], value: Value) {
    if path.is_empty() {
        return;
    }

    let mut current = config;
    for (index, key) in path.iter().enumerate() {
        if index == path.len() - 1 {
            if let Some(map) = current.as_object_mut() {
                map.insert(key.to_string(), value);
            }
            return;
        }

        if !current.get(*key).map(|v| v.is_object()).unwrap_or(false) {
            let Some(map) = current.as_object_mut() else {
                return;
            };
            map.insert((*key).to_string(), Value::Object(Map::new()));
        }

        let Some(next) = current.get_mut(*key) else {
            return;
        };
        current = next;
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}
