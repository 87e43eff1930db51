#![deny(missing_docs)]
//! Configuration loading and schema validation.
//!
//! Accepts YAML, JSON, or an in-memory [`serde_json::Value`] and produces
//! the validated [`RootConfig`] record the rest of the workspace consumes.
//! Unknown keys anywhere in the schema are a fatal [`ConfigError`]; operator
//! ids are assigned if absent and checked for duplicates.

use maestro_core::config::RootConfig;
use maestro_core::error::ConfigError;
use serde_json::Value;
use std::collections::HashSet;

const KNOWN_ROOT_KEYS: &[&str] = &["header", "payload"];
const KNOWN_HEADER_KEYS: &[&str] = &["name", "description", "enable_multiprocessing", "shared_data"];
const KNOWN_PAYLOAD_KEYS: &[&str] = &["operators", "variations"];
const KNOWN_OPERATOR_KEYS: &[&str] = &[
    "id",
    "name",
    "module_path",
    "class_name",
    "class_params",
    "dedicated_input_params",
    "shared_input_params",
    "shared_input_init_only",
    "save_output",
    "shared_output_name",
    "run_after",
    "repeat",
    "reinitialize_in_repeats",
    "label",
    "group",
    "dedicated_input_variations",
];

/// Load and validate a configuration from a source string.
///
/// A string ending in `.yaml`/`.yml` or `.json` is read from disk and
/// parsed as YAML or JSON respectively; anything else is parsed directly
/// as a JSON string.
pub fn load(source: &str) -> Result<RootConfig, ConfigError> {
    let value = read_source(source)?;
    load_value(value)
}

/// Validate and convert an in-memory [`serde_json::Value`] directly,
/// without touching the filesystem.
pub fn load_value(mut value: Value) -> Result<RootConfig, ConfigError> {
    validate_and_normalize(&mut value)?;
    serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
}

fn read_source(source: &str) -> Result<Value, ConfigError> {
    if source.ends_with(".yaml") || source.ends_with(".yml") {
        let text = std::fs::read_to_string(source).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        serde_yaml::from_str(&text).map_err(|e| ConfigError::Invalid(e.to_string()))
    } else if source.ends_with(".json") {
        let text = std::fs::read_to_string(source).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Invalid(e.to_string()))
    } else {
        serde_json::from_str(source).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn validate_and_normalize(value: &mut Value) -> Result<(), ConfigError> {
    let root = value
        .as_object_mut()
        .ok_or_else(|| ConfigError::Invalid("root config must be an object".to_string()))?;
    reject_unknown_keys(root, KNOWN_ROOT_KEYS, "root")?;

    if let Some(header) = root.get_mut("header") {
        let header = header
            .as_object_mut()
            .ok_or_else(|| ConfigError::Invalid("header must be an object".to_string()))?;
        reject_unknown_keys(header, KNOWN_HEADER_KEYS, "header")?;
    }

    let payload = root
        .get_mut("payload")
        .ok_or_else(|| ConfigError::Invalid("missing payload".to_string()))?
        .as_object_mut()
        .ok_or_else(|| ConfigError::Invalid("payload must be an object".to_string()))?;
    reject_unknown_keys(payload, KNOWN_PAYLOAD_KEYS, "payload")?;

    let operators = payload
        .get_mut("operators")
        .ok_or_else(|| ConfigError::Invalid("missing payload.operators".to_string()))?
        .as_array_mut()
        .ok_or_else(|| ConfigError::Invalid("payload.operators must be an array".to_string()))?;

    if operators.is_empty() {
        return Err(ConfigError::EmptyOperatorList);
    }

    let mut seen_ids = HashSet::with_capacity(operators.len());
    for op in operators.iter_mut() {
        let obj = op
            .as_object_mut()
            .ok_or_else(|| ConfigError::Invalid("operator config must be an object".to_string()))?;

        let id = match obj.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ConfigError::Invalid("operator id must be a string".to_string())),
            None => {
                let generated = uuid::Uuid::new_v4().to_string();
                obj.insert("id".to_string(), Value::String(generated.clone()));
                generated
            }
        };

        reject_unknown_keys(obj, KNOWN_OPERATOR_KEYS, &id)?;

        if !seen_ids.insert(id.clone()) {
            return Err(ConfigError::DuplicateOperatorId(id));
        }
        if id == maestro_core::id::ROOT {
            return Err(ConfigError::Invalid(format!(
                "operator id \"{}\" is reserved",
                maestro_core::id::ROOT
            )));
        }
    }

    Ok(())
}

fn reject_unknown_keys(
    obj: &serde_json::Map<String, Value>,
    known: &[&str],
    context: &str,
) -> Result<(), ConfigError> {
    for key in obj.keys() {
        if !known.contains(&key.as_str()) {
            return Err(ConfigError::UnknownKey {
                operator_id: context.to_string(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}
