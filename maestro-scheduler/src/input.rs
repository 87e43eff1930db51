//! Input compilation: builds a job's input mapping from
//! `dedicated_input_params` and `shared_input_params` against the shared
//! store, immediately before dispatch (4.G).

use maestro_core::config::{OperatorConfig, SharedInputParams};
use maestro_core::error::OperatorError;
use maestro_core::state::SharedStore;
use maestro_core::value::{type_name, Value};
use std::collections::BTreeMap;

/// Build the input mapping a worker will run its operator against.
///
/// 1. Start from `dedicated_input_params`, copied verbatim.
/// 2. Layer in `shared_input_params`: bare names and `"name AS alias"`
///    strings read an existing shared value (`MissingSharedInput` if
///    absent); a mapping form binds the current value if the key exists
///    (subject to `shared_input_init_only` and a type check against the
///    initializer) or initializes it if not.
/// 3. Return the merged mapping.
pub async fn compile_inputs(
    config: &OperatorConfig,
    store: &dyn SharedStore,
) -> Result<BTreeMap<String, Value>, OperatorError> {
    let mut inputs: BTreeMap<String, Value> = config
        .dedicated_input_params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    match &config.shared_input_params {
        None => {}
        Some(SharedInputParams::One(spec)) => bind_named(&mut inputs, spec, store).await?,
        Some(SharedInputParams::Many(specs)) => {
            for spec in specs {
                bind_named(&mut inputs, spec, store).await?;
            }
        }
        Some(SharedInputParams::Init(map)) => {
            for (name, initial) in map {
                if store.exists(name).await {
                    if config.shared_input_init_only {
                        return Err(OperatorError::AlreadyInitialized(name.clone()));
                    }
                    let current = store.get(name).await.expect("existence just checked");
                    let (expected, found) = (type_name(&current), type_name(initial));
                    if expected != found {
                        return Err(OperatorError::TypeMismatch {
                            key: name.clone(),
                            expected: expected.to_string(),
                            found: found.to_string(),
                        });
                    }
                    inputs.insert(name.clone(), current);
                } else {
                    store.add(name, initial.clone()).await;
                    inputs.insert(name.clone(), initial.clone());
                }
            }
        }
    }

    Ok(inputs)
}

async fn bind_named(
    inputs: &mut BTreeMap<String, Value>,
    spec: &str,
    store: &dyn SharedStore,
) -> Result<(), OperatorError> {
    let (src, alias) = parse_as(spec)?;
    if !store.exists(&src).await {
        return Err(OperatorError::MissingSharedInput(src));
    }
    let value = store.get(&src).await.expect("existence just checked");
    inputs.insert(alias, value);
    Ok(())
}

/// Parse a `shared_input_params` string into `(source, alias)`.
///
/// `"name"` binds to itself. `"name AS alias"` — the delimiter `" as "` is
/// matched case-insensitively, surrounding spaces mandatory — binds under
/// `alias`. Anything else (no tokens, whitespace inside a token, an
/// unparseable shape) is `InvalidInputSpec`.
pub fn parse_as(spec: &str) -> Result<(String, String), OperatorError> {
    let lower = spec.to_lowercase();
    if let Some(idx) = lower.find(" as ") {
        let src = spec[..idx].trim();
        let alias = spec[idx + 4..].trim();
        if src.is_empty()
            || alias.is_empty()
            || src.contains(char::is_whitespace)
            || alias.contains(char::is_whitespace)
        {
            return Err(OperatorError::InvalidInputSpec(spec.to_string()));
        }
        Ok((src.to_string(), alias.to_string()))
    } else {
        let bare = spec.trim();
        if bare.is_empty() || bare.contains(char::is_whitespace) {
            return Err(OperatorError::InvalidInputSpec(spec.to_string()));
        }
        Ok((bare.to_string(), bare.to_string()))
    }
}
