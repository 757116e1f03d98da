//! JSON projection of a decoded [`Value`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number};

use crate::error::JsonError;
use crate::value::Value;

impl Value {
    /// Converts the value to JSON.
    ///
    /// Byte strings that are valid UTF-8 become strings; others become
    /// `data:application/octet-stream;base64,` URIs. The same rule applies to
    /// hash keys, so distinct keys stay distinct. Objects keep wire order.
    /// Shared containers are written out at each place they occur.
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> Result<serde_json::Value, JsonError> {
        let mut stack = Vec::new();
        to_json(self, &mut stack)
    }
}

fn bytes_to_string(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(bytes)
        ),
    }
}

fn to_json(value: &Value, stack: &mut Vec<*const ()>) -> Result<serde_json::Value, JsonError> {
    if let Some(ptr) = value.container_ptr() {
        if stack.contains(&ptr) {
            return Err(JsonError::Cycle);
        }
        stack.push(ptr);
    }
    let json = match value {
        Value::Null => serde_json::Value::Null,
        Value::Bytes(bytes) => serde_json::Value::String(bytes_to_string(bytes)),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Float(n) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Array(array) => serde_json::Value::Array(
            array
                .borrow()
                .iter()
                .map(|item| to_json(item, stack))
                .collect::<Result<_, _>>()?,
        ),
        Value::Hash(hash) => {
            let mut map = Map::new();
            for (key, item) in hash.borrow().iter() {
                map.insert(bytes_to_string(key), to_json(item, stack)?);
            }
            serde_json::Value::Object(map)
        }
    };
    if value.container_ptr().is_some() {
        stack.pop();
    }
    Ok(json)
}
