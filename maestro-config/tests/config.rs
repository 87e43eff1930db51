use maestro_core::error::ConfigError;

fn base_payload() -> serde_json::Value {
    serde_json::json!({
        "payload": {
            "operators": [
                {"module_path": "demo::a", "class_name": "A"}
            ]
        }
    })
}

#[test]
fn loads_minimal_value() {
    let config = maestro_config::load_value(base_payload()).unwrap();
    assert_eq!(config.payload.operators.len(), 1);
    assert!(!config.payload.operators[0].id.is_empty());
    assert!(config.header.enable_multiprocessing);
}

#[test]
fn assigns_id_when_absent() {
    let config = maestro_config::load_value(base_payload()).unwrap();
    assert!(!config.payload.operators[0].id.is_empty());
}

#[test]
fn preserves_explicit_id() {
    let mut value = base_payload();
    value["payload"]["operators"][0]["id"] = serde_json::json!("my-op");
    let config = maestro_config::load_value(value).unwrap();
    assert_eq!(config.payload.operators[0].id, "my-op");
}

#[test]
fn rejects_duplicate_ids() {
    let mut value = base_payload();
    value["payload"]["operators"] = serde_json::json!([
        {"id": "dup", "module_path": "demo::a", "class_name": "A"},
        {"id": "dup", "module_path": "demo::b", "class_name": "B"},
    ]);
    let err = maestro_config::load_value(value).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateOperatorId(id) if id == "dup"));
}

#[test]
fn rejects_empty_operator_list() {
    let value = serde_json::json!({"payload": {"operators": []}});
    let err = maestro_config::load_value(value).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyOperatorList));
}

#[test]
fn rejects_unknown_operator_key() {
    let mut value = base_payload();
    value["payload"]["operators"][0]["totally_made_up"] = serde_json::json!(true);
    let err = maestro_config::load_value(value).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey { key, .. } if key == "totally_made_up"));
}

#[test]
fn rejects_unknown_header_key() {
    let mut value = base_payload();
    value["header"] = serde_json::json!({"bogus": 1});
    let err = maestro_config::load_value(value).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey { .. }));
}

#[test]
fn rejects_root_operator_id() {
    let mut value = base_payload();
    value["payload"]["operators"][0]["id"] = serde_json::json!("ROOT");
    let err = maestro_config::load_value(value).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn preserves_label_and_group_unused() {
    let mut value = base_payload();
    value["payload"]["operators"][0]["label"] = serde_json::json!("My Op");
    value["payload"]["operators"][0]["group"] = serde_json::json!("g1");
    let config = maestro_config::load_value(value).unwrap();
    assert_eq!(config.payload.operators[0].label.as_deref(), Some("My Op"));
    assert_eq!(config.payload.operators[0].group.as_deref(), Some("g1"));
}

#[test]
fn loads_json_string_source() {
    let json = base_payload().to_string();
    let config = maestro_config::load(&json).unwrap();
    assert_eq!(config.payload.operators.len(), 1);
}

#[test]
fn loads_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(
        &path,
        "payload:\n  operators:\n    - module_path: demo::a\n      class_name: A\n",
    )
    .unwrap();

    let config = maestro_config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.payload.operators.len(), 1);
}

#[test]
fn loads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    std::fs::write(&path, base_payload().to_string()).unwrap();

    let config = maestro_config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.payload.operators.len(), 1);
}
