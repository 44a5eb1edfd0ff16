//! Turning validated arguments into backend requests for HTTP-routed tools

use std::sync::LazyLock;

use qontinui_client::{ApiRequest, Method};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::registry::{BodyStyle, ToolDescriptor};
use crate::validation::Arguments;
use crate::{Error, Result};

/// `{name}` placeholder in a path template
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Names of the placeholders in `template`, in order.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Fill the placeholders of `template` with percent-encoded argument values.
///
/// Returns the name of the first placeholder with no argument on failure.
pub fn render_path(template: &str, args: &Arguments) -> std::result::Result<String, String> {
    let mut missing: Option<String> = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| match args.get(&caps[1]) {
        Some(value) if !value.is_null() => urlencoding::encode(&scalar(value)).into_owned(),
        _ => {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        }
    });

    match missing {
        Some(name) => Err(name),
        None => Ok(rendered.into_owned()),
    }
}

/// Build the request for an HTTP route.
///
/// Arguments consumed by the path are not repeated; the rest go to the query
/// string for GET/DELETE and to the body otherwise, under their wire names.
pub fn build_request(
    tool: &ToolDescriptor,
    method: &Method,
    template: &str,
    body: BodyStyle,
    args: &Arguments,
) -> Result<ApiRequest> {
    let path = render_path(template, args).map_err(|name| {
        Error::validation(tool.name, format!("missing path parameter '{}'", name))
    })?;
    let in_path = placeholders(template);

    let rest: Vec<(&'static str, &Value)> = tool
        .params
        .iter()
        .filter(|p| !in_path.contains(&p.name))
        .filter_map(|p| args.get(p.name).map(|v| (p.wire(), v)))
        .collect();

    let mut request = ApiRequest::new(method.clone(), path);

    if *method == Method::GET || *method == Method::DELETE {
        for (key, value) in rest {
            request = request.with_query(key, scalar(value));
        }
        return Ok(request);
    }

    request = match body {
        BodyStyle::Fields => {
            let fields: Map<String, Value> = rest
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            request.with_json(Value::Object(fields))
        }
        BodyStyle::Arg(name) => {
            let value = args.get(name).cloned().unwrap_or_else(|| Value::Object(Map::new()));
            request.with_json(value)
        }
        BodyStyle::Empty => request,
    };
    Ok(request)
}

/// Plain rendering for paths and query strings: strings unquoted, everything else as JSON.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
