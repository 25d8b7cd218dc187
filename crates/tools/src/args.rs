//! Argument extraction shared by the Canvas tools.

use serde_json::{Map, Value};
use studyguide_core::ToolError;
use studyguide_core::run::id_string;

/// An identifier argument; JSON strings and numbers are both accepted.
pub fn id_arg(arguments: &Value, key: &str) -> Result<String, ToolError> {
    match arguments.get(key) {
        Some(value @ (Value::String(_) | Value::Number(_))) => {
            let id = id_string(value);
            if id.trim().is_empty() {
                Err(ToolError::InvalidArguments(format!("'{key}' must not be empty")))
            } else {
                Ok(id)
            }
        }
        _ => Err(ToolError::InvalidArguments(format!("Missing '{key}' argument"))),
    }
}

pub fn string_arg<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

pub fn string_list_arg(arguments: &Value, key: &str) -> Result<Vec<String>, ToolError> {
    let items = arguments[key]
        .as_array()
        .ok_or_else(|| ToolError::InvalidArguments(format!("'{key}' must be an array")))?;
    items
        .iter()
        .map(|item| match item {
            Value::String(_) | Value::Number(_) => Ok(id_string(item)),
            _ => Err(ToolError::InvalidArguments(format!(
                "'{key}' must contain only strings"
            ))),
        })
        .collect()
}

pub fn optional_string(arguments: &Value, key: &str) -> Result<String, ToolError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ToolError::InvalidArguments(format!("'{key}' must be a string"))),
    }
}

pub fn optional_object(arguments: &Value, key: &str) -> Result<Map<String, Value>, ToolError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ToolError::InvalidArguments(format!("'{key}' must be an object"))),
    }
}
