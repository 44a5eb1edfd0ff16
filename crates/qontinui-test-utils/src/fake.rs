//! [`FakeQontinui`]: an in-memory stand-in for the Qontinui API.
//!
//! Covers the routes the adapter's project and configuration tools touch:
//! JWT login, `users/me`, project CRUD, export/import and validate. Every
//! route except login demands a token the fake issued. Unknown routes and
//! missing projects answer 404 with a FastAPI-style `detail`.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use qontinui_client::{ApiRequest, Backend, Error, RequestBody, Result};
use serde_json::{Map, Value, json};
use uuid::Uuid;

pub const FAKE_EMAIL: &str = "test@example.com";
pub const FAKE_PASSWORD: &str = "secret";
pub const FAKE_USER_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

#[derive(Default)]
struct FakeState {
    projects: BTreeMap<String, Value>,
    tokens: HashSet<String>,
    requests: usize,
}

/// In-memory backend with the project and auth routes.
#[derive(Default)]
pub struct FakeQontinui {
    state: Mutex<FakeState>,
}

impl FakeQontinui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as if the fake had issued it.
    pub fn with_token(self, token: &str) -> Self {
        self.state.lock().unwrap().tokens.insert(token.to_string());
        self
    }

    /// Seed a project and return its id.
    pub fn insert_project(&self, name: &str, configuration: Value) -> String {
        let id = Uuid::new_v4().to_string();
        let project = json!({
            "id": id,
            "name": name,
            "description": null,
            "configuration": configuration,
        });
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(id.clone(), project);
        id
    }

    /// Stored project document, if any.
    pub fn project(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().projects.get(id).cloned()
    }

    /// Number of requests served, including rejected ones.
    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    fn route(&self, request: &ApiRequest, token: Option<&str>) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        let path = request.path.trim_start_matches("/api/v1/");
        let segments: Vec<String> = path
            .split('/')
            .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_default())
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let method = request.method.as_str();

        if let ("POST", ["auth", "jwt", "login"]) = (method, segments.as_slice()) {
            return login(&mut state, &request.body);
        }

        let authorized = token.is_some_and(|t| state.tokens.contains(t));
        if !authorized {
            return Err(remote(401, "Unauthorized"));
        }

        match (method, segments.as_slice()) {
            ("GET", ["auth", "users", "me"]) => Ok(json!({
                "id": FAKE_USER_ID,
                "email": FAKE_EMAIL,
                "is_active": true,
                "is_superuser": false,
                "is_verified": true,
            })),
            ("GET", ["projects"]) => Ok(Value::Array(state.projects.values().cloned().collect())),
            ("POST", ["projects", "validate"]) => Ok(validate(request.json_body())),
            ("POST", ["projects"]) => create_project(&mut state, request.json_body()),
            ("GET", ["projects", id]) => project_ref(&state, id).cloned(),
            ("PUT", ["projects", id]) => update_project(&mut state, id, request.json_body()),
            ("DELETE", ["projects", id]) => match state.projects.remove(*id) {
                Some(_) => Ok(json!({})),
                None => Err(remote(404, "Project not found")),
            },
            ("GET", ["projects", id, "export"]) => {
                let project = project_ref(&state, id)?;
                Ok(project["configuration"].clone())
            }
            ("POST", ["projects", id, "import"]) => {
                import_configuration(&mut state, id, request.json_body())
            }
            _ => Err(remote(404, "Not Found")),
        }
    }
}

#[async_trait]
impl Backend for FakeQontinui {
    async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value> {
        self.route(&request, token)
    }
}

fn remote(status: u16, message: &str) -> Error {
    Error::Remote {
        status,
        message: message.to_string(),
    }
}

fn login(state: &mut FakeState, body: &RequestBody) -> Result<Value> {
    let RequestBody::Form(pairs) = body else {
        return Err(remote(422, "login expects a form body"));
    };
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };

    if field("username") != Some(FAKE_EMAIL) || field("password") != Some(FAKE_PASSWORD) {
        return Err(remote(400, "LOGIN_BAD_CREDENTIALS"));
    }

    let token = format!("fake-jwt-{}", Uuid::new_v4().simple());
    state.tokens.insert(token.clone());
    Ok(json!({ "access_token": token, "token_type": "bearer" }))
}

fn project_ref<'a>(state: &'a FakeState, id: &str) -> Result<&'a Value> {
    state
        .projects
        .get(id)
        .ok_or_else(|| remote(404, "Project not found"))
}

fn create_project(state: &mut FakeState, body: Option<&Value>) -> Result<Value> {
    let body = body.ok_or_else(|| remote(422, "body required"))?;
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return Err(remote(422, "name is required"));
    };

    let id = Uuid::new_v4().to_string();
    let project = json!({
        "id": id,
        "name": name,
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "organization_id": body.get("organization_id").cloned().unwrap_or(Value::Null),
        "configuration": {},
    });
    state.projects.insert(id, project.clone());
    Ok(project)
}

fn update_project(state: &mut FakeState, id: &str, body: Option<&Value>) -> Result<Value> {
    let update = body
        .and_then(Value::as_object)
        .ok_or_else(|| remote(422, "body required"))?;
    let project = state
        .projects
        .get_mut(id)
        .ok_or_else(|| remote(404, "Project not found"))?;

    for key in ["name", "description", "configuration"] {
        if let Some(value) = update.get(key) {
            project[key] = value.clone();
        }
    }
    Ok(project.clone())
}

fn import_configuration(state: &mut FakeState, id: &str, body: Option<&Value>) -> Result<Value> {
    let body = body.ok_or_else(|| remote(422, "body required"))?;
    let Some(incoming) = body.get("configuration").and_then(Value::as_object) else {
        return Err(remote(422, "configuration must be an object"));
    };
    let merge = body.get("merge").and_then(Value::as_bool).unwrap_or(false);

    let project = state
        .projects
        .get_mut(id)
        .ok_or_else(|| remote(404, "Project not found"))?;

    let configuration = if merge {
        let mut merged = project["configuration"]
            .as_object()
            .cloned()
            .unwrap_or_default();
        merge_into(&mut merged, incoming);
        merged
    } else {
        incoming.clone()
    };

    let counts: Map<String, Value> = configuration
        .iter()
        .filter_map(|(k, v)| v.as_array().map(|a| (k.clone(), json!(a.len()))))
        .collect();
    project["configuration"] = Value::Object(configuration);

    Ok(json!({ "success": true, "merged": merge, "imported": counts }))
}

/// Arrays append, everything else overwrites.
fn merge_into(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Array(existing)), Value::Array(extra)) => {
                existing.extend(extra.iter().cloned())
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn validate(body: Option<&Value>) -> Value {
    let mut errors = Vec::new();
    match body.and_then(Value::as_object) {
        None => errors.push("configuration must be an object".to_string()),
        Some(config) => {
            for key in ["workflows", "states", "images", "transitions"] {
                if config.get(key).is_some_and(|v| !v.is_array()) {
                    errors.push(format!("{} must be a list", key));
                }
            }
        }
    }
    json!({ "valid": errors.is_empty(), "errors": errors, "warnings": [] })
}
