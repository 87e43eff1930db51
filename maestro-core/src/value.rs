//! The opaque payload type threaded through [`crate::SharedStore`] and
//! [`crate::OperatorHandle`].

/// An opaque value. The core never interprets this beyond equality,
/// deep-copy (via `Clone`), and the JSON-type comparison `shared_input_params`
/// mapping form needs for its type-check (`TypeMismatch`).
///
/// `serde_json::Value` is the natural choice here: it is both the schema's
/// wire format (`dedicated_input_params`, `shared_data`, and friends are
/// all JSON in the configuration record) and the de facto interchange type
/// for opaque payloads in the ecosystem.
pub type Value = serde_json::Value;

/// The JSON type name of a value, used for the `shared_input_params`
/// mapping form's type-check against an existing shared value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
