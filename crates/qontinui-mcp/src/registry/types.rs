//! Core types for the tool registry

use qontinui_client::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Tool category for filtering and organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Auth,
    Projects,
    Configuration,
    Workflows,
    States,
    Images,
    Transitions,
    Execution,
    Variables,
    Capture,
}

/// JSON shape a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// String holding a UUID
    Uuid,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamKind {
    /// JSON Schema fragment for this kind.
    fn schema(self) -> Value {
        match self {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Uuid => json!({ "type": "string", "format": "uuid" }),
            ParamKind::Integer => json!({ "type": "integer" }),
            ParamKind::Number => json!({ "type": "number" }),
            ParamKind::Boolean => json!({ "type": "boolean" }),
            ParamKind::Object => json!({ "type": "object" }),
            ParamKind::Array => json!({ "type": "array" }),
            ParamKind::Any => json!({}),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Uuid => "a UUID string",
            ParamKind::Integer => "an integer",
            ParamKind::Number => "a number",
            ParamKind::Boolean => "a boolean",
            ParamKind::Object => "an object",
            ParamKind::Array => "an array",
            ParamKind::Any => "any value",
        }
    }
}

/// One declared tool parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    /// Field name on the wire when it differs from `name`
    pub wire_name: Option<&'static str>,
    pub allowed: Option<&'static [&'static str]>,
}

impl Param {
    pub fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            wire_name: None,
            allowed: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn uuid(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Uuid, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn object(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Object, description)
    }

    pub fn array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Array, description)
    }

    pub fn any(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Any, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn wire_name(mut self, name: &'static str) -> Self {
        self.wire_name = Some(name);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Name used in query strings and bodies.
    pub fn wire(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }

    fn schema(&self) -> Value {
        let mut schema = self.kind.schema();
        schema["description"] = json!(self.description);
        if let Some(allowed) = self.allowed {
            schema["enum"] = json!(allowed);
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// How an HTTP route builds its request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// Object of the arguments not consumed by the path
    Fields,
    /// The named argument is the whole body
    Arg(&'static str),
    /// No body
    Empty,
}

/// Configuration arrays editable in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Workflows,
    States,
    Images,
    Transitions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    Login,
    Logout,
    Status,
}

/// Where a tool's work happens.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// One backend call; `{param}` placeholders in `path` are filled from arguments
    Http {
        method: Method,
        path: &'static str,
        body: BodyStyle,
    },
    /// Read-modify-write of one configuration array
    Collection { collection: Collection, op: CollectionOp },
    /// Local session state
    Auth(AuthOp),
}

/// Extra argument rule checked after per-parameter validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `requires` must be present when `param` equals `value`
    RequiredWhen {
        param: &'static str,
        value: &'static str,
        requires: &'static str,
    },
}

/// A registered tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
    pub route: Route,
    pub params: Vec<Param>,
    pub constraints: Vec<Constraint>,
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        category: ToolCategory,
        description: &'static str,
        route: Route,
    ) -> Self {
        Self {
            name,
            description,
            category,
            route,
            params: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Tool backed by a single HTTP call.
    pub fn http(
        name: &'static str,
        category: ToolCategory,
        description: &'static str,
        method: Method,
        path: &'static str,
    ) -> Self {
        let body = if method == Method::POST || method == Method::PUT {
            BodyStyle::Fields
        } else {
            BodyStyle::Empty
        };
        Self::new(name, category, description, Route::Http { method, path, body })
    }

    /// Tool editing a configuration collection.
    pub fn collection(
        name: &'static str,
        category: ToolCategory,
        description: &'static str,
        collection: Collection,
        op: CollectionOp,
    ) -> Self {
        Self::new(name, category, description, Route::Collection { collection, op })
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Override the body style of an HTTP route.
    pub fn body(mut self, style: BodyStyle) -> Self {
        if let Route::Http { body, .. } = &mut self.route {
            *body = style;
        }
        self
    }

    pub fn require_when(
        mut self,
        param: &'static str,
        value: &'static str,
        requires: &'static str,
    ) -> Self {
        self.constraints.push(Constraint::RequiredWhen {
            param,
            value,
            requires,
        });
        self
    }

    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.required)
    }

    pub fn optional_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.required)
    }

    /// Every tool except the session tools needs a token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self.route, Route::Auth(_))
    }

    /// JSON Schema advertised in `tools/list`.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ToolDescriptor {
        ToolDescriptor::http(
            "list_projects",
            ToolCategory::Projects,
            "List projects",
            Method::GET,
            "/api/v1/projects",
        )
        .param(Param::uuid("organization_id", "Filter by organization"))
        .param(Param::integer("limit", "Page size").default(json!(100)))
        .param(Param::string("sort", "Sort order").one_of(&["asc", "desc"]).required())
    }

    #[test]
    fn http_body_style_follows_method() {
        let get = sample();
        assert!(matches!(
            get.route,
            Route::Http {
                body: BodyStyle::Empty,
                ..
            }
        ));

        let post = ToolDescriptor::http(
            "create_project",
            ToolCategory::Projects,
            "Create",
            Method::POST,
            "/api/v1/projects",
        );
        assert!(matches!(
            post.route,
            Route::Http {
                body: BodyStyle::Fields,
                ..
            }
        ));
    }

    #[test]
    fn input_schema_lists_properties_and_required() {
        let schema = sample().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["organization_id"]["format"], "uuid");
        assert_eq!(schema["properties"]["limit"]["default"], 100);
        assert_eq!(schema["properties"]["sort"]["enum"], json!(["asc", "desc"]));
        assert_eq!(schema["required"], json!(["sort"]));
    }

    #[test]
    fn required_and_optional_partition_params() {
        let tool = sample();
        assert_eq!(tool.required_params().count(), 1);
        assert_eq!(tool.optional_params().count(), 2);
        assert!(tool.requires_auth());
    }

    #[test]
    fn wire_name_defaults_to_name() {
        assert_eq!(Param::string("name", "").wire(), "name");
        assert_eq!(
            Param::string("workflow_name", "").wire_name("name").wire(),
            "name"
        );
    }
}
