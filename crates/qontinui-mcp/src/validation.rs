//! Argument validation against a tool's parameter table
//!
//! Runs entirely locally: a rejected call never reaches the backend.

use serde_json::{Map, Value};

use crate::registry::{Constraint, Param, ParamKind, ToolDescriptor};
use crate::{Error, Result};

/// Validated arguments: declared params only, defaults filled in.
pub type Arguments = Map<String, Value>;

/// Check `arguments` against `tool` and return the normalized argument map.
///
/// `null` counts as an empty object. Undeclared arguments are dropped.
pub fn validate(tool: &ToolDescriptor, arguments: Value) -> Result<Arguments> {
    let mut supplied = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(Error::validation(
                tool.name,
                format!("arguments must be an object, got {}", json_type(&other)),
            ));
        }
    };

    let mut validated = Map::new();
    for param in &tool.params {
        match supplied.remove(param.name) {
            Some(value) if !value.is_null() => {
                check_value(tool, param, &value)?;
                validated.insert(param.name.to_string(), value);
            }
            _ if param.required => {
                return Err(Error::validation(
                    tool.name,
                    format!("missing required parameter '{}'", param.name),
                ));
            }
            _ => {
                if let Some(default) = &param.default {
                    validated.insert(param.name.to_string(), default.clone());
                }
            }
        }
    }

    if !supplied.is_empty() {
        let ignored: Vec<&String> = supplied.keys().collect();
        tracing::debug!(tool = tool.name, ?ignored, "Dropping undeclared arguments");
    }

    for constraint in &tool.constraints {
        check_constraint(tool, constraint, &validated)?;
    }

    Ok(validated)
}

fn check_value(tool: &ToolDescriptor, param: &Param, value: &Value) -> Result<()> {
    if !kind_matches(param.kind, value) {
        return Err(Error::validation(
            tool.name,
            format!(
                "parameter '{}' must be {}, got {}",
                param.name,
                param.kind.label(),
                json_type(value)
            ),
        ));
    }

    if param.required && value.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Err(Error::validation(
            tool.name,
            format!("parameter '{}' must not be empty", param.name),
        ));
    }

    let allowed = param.allowed.unwrap_or_default();
    let disallowed = value.as_str().is_some_and(|s| !allowed.contains(&s));
    if param.allowed.is_some() && disallowed {
        return Err(Error::validation(
            tool.name,
            format!(
                "parameter '{}' must be one of: {}",
                param.name,
                allowed.join(", ")
            ),
        ));
    }

    Ok(())
}

fn kind_matches(kind: ParamKind, value: &Value) -> bool {
    match kind {
        ParamKind::String => value.is_string(),
        ParamKind::Uuid => value
            .as_str()
            .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        ParamKind::Integer => value.is_i64() || value.is_u64(),
        ParamKind::Number => value.is_number(),
        ParamKind::Boolean => value.is_boolean(),
        ParamKind::Object => value.is_object(),
        ParamKind::Array => value.is_array(),
        ParamKind::Any => true,
    }
}

fn check_constraint(tool: &ToolDescriptor, constraint: &Constraint, args: &Arguments) -> Result<()> {
    match constraint {
        Constraint::RequiredWhen {
            param,
            value,
            requires,
        } => {
            let triggered = args.get(*param).and_then(Value::as_str) == Some(*value);
            let present = args
                .get(*requires)
                .is_some_and(|v| v.as_str().is_none_or(|s| !s.trim().is_empty()));
            if triggered && !present {
                return Err(Error::validation(
                    tool.name,
                    format!("'{}' is required when {} is '{}'", requires, param, value),
                ));
            }
            Ok(())
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
