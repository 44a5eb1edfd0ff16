//! Editing the arrays inside a project's configuration document
//!
//! Workflows, states, images and transitions have no endpoints of their own.
//! Each edit fetches the project, changes one array of `configuration` and
//! writes the whole configuration back.

use qontinui_client::QontinuiClient;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::registry::{Collection, CollectionOp};
use crate::validation::Arguments;
use crate::{Error, Result};

/// Argument name to document field, per collection.
type FieldMap = &'static [(&'static str, &'static str)];

impl Collection {
    /// Key of the array inside `configuration`.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Workflows => "workflows",
            Collection::States => "states",
            Collection::Images => "images",
            Collection::Transitions => "transitions",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Collection::Workflows => "workflow",
            Collection::States => "state",
            Collection::Images => "image",
            Collection::Transitions => "transition",
        }
    }

    /// Argument naming the element for update and delete.
    pub fn id_param(self) -> &'static str {
        match self {
            Collection::Workflows => "workflow_id",
            Collection::States => "state_id",
            Collection::Images => "image_id",
            Collection::Transitions => "transition_id",
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Collection::Images => "img",
            other => other.singular(),
        }
    }

    fn fields(self) -> FieldMap {
        match self {
            Collection::Workflows => &[
                ("name", "name"),
                ("actions", "actions"),
                ("connections", "connections"),
            ],
            Collection::States => &[
                ("name", "name"),
                ("description", "description"),
                ("identifying_images", "identifyingImages"),
                ("is_initial", "isInitial"),
                ("is_final", "isFinal"),
            ],
            Collection::Images => &[("name", "name"), ("data", "data"), ("format", "format")],
            Collection::Transitions => &[
                ("name", "name"),
                ("type", "type"),
                ("from_state", "fromState"),
                ("to_state", "toState"),
                ("workflows", "processes"),
                ("timeout", "timeout"),
                ("retry_count", "retryCount"),
            ],
        }
    }

    /// Fresh `<prefix>-xxxxxxxx` element id.
    pub fn new_id(self) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.id_prefix(), &hex[..8])
    }

    /// Document skeleton for a new element, before arguments are applied.
    fn template(self, id: String) -> Value {
        match self {
            Collection::Workflows => json!({
                "id": id,
                "version": "1.0.0",
                "format": "graph",
                "actions": [],
                "connections": {},
                "visibility": "public",
                "variables": {},
                "settings": {},
                "metadata": {},
            }),
            Collection::States => json!({
                "id": id,
                "description": null,
                "identifyingImages": [],
                "position": { "x": 0.0, "y": 0.0 },
                "isInitial": false,
                "isFinal": false,
            }),
            Collection::Images => json!({
                "id": id,
                "format": "png",
            }),
            Collection::Transitions => json!({
                "id": id,
                "type": "action",
                "processes": [],
                "staysVisible": false,
                "activateStates": [],
                "deactivateStates": [],
                "timeout": 10000,
                "retryCount": 3,
            }),
        }
    }

    /// Copy supplied arguments onto `element` under their document names.
    fn apply_fields(self, element: &mut Value, args: &Arguments) {
        for (arg, field) in self.fields() {
            if let Some(value) = args.get(*arg) {
                element[*field] = value.clone();
            }
        }
    }

    /// Build a new element from create arguments.
    pub fn create_element(self, args: &Arguments) -> Value {
        let mut element = self.template(self.new_id());
        self.apply_fields(&mut element, args);
        element
    }

    /// Short listing entry for an element.
    pub fn summary(self, element: &Value) -> Value {
        let len = |field: &str| element.get(field).and_then(Value::as_array).map_or(0, Vec::len);
        let field = |name: &str| element.get(name).cloned().unwrap_or(Value::Null);

        match self {
            Collection::Workflows => json!({
                "id": field("id"),
                "name": field("name"),
                "action_count": len("actions"),
            }),
            Collection::States => json!({
                "id": field("id"),
                "name": field("name"),
                "description": field("description"),
                "is_initial": element.get("isInitial").and_then(Value::as_bool).unwrap_or(false),
                "is_final": element.get("isFinal").and_then(Value::as_bool).unwrap_or(false),
                "image_count": len("identifyingImages"),
            }),
            Collection::Images => json!({
                "id": field("id"),
                "name": field("name"),
                "format": field("format"),
                "width": field("width"),
                "height": field("height"),
            }),
            Collection::Transitions => json!({
                "id": field("id"),
                "name": field("name"),
                "type": element.get("type").cloned().unwrap_or_else(|| json!("action")),
                "from_state": field("fromState"),
                "to_state": field("toState"),
                "workflows": element.get("processes").cloned().unwrap_or_else(|| json!([])),
                "timeout": field("timeout"),
                "retry_count": field("retryCount"),
            }),
        }
    }
}

fn element_id(element: &Value) -> Option<&str> {
    element.get("id").and_then(Value::as_str)
}

fn string_arg<'a>(args: &'a Arguments, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Run one collection operation against the project named by `project_id`.
pub async fn apply(
    client: &QontinuiClient,
    collection: Collection,
    op: CollectionOp,
    args: &Arguments,
) -> Result<Value> {
    let project_id = string_arg(args, "project_id");
    let key = collection.key();

    let project = client.get_project(project_id).await?;
    let mut configuration = match project.get("configuration") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let mut items = match configuration.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let result = match op {
        CollectionOp::List => {
            let summaries: Vec<Value> = items.iter().map(|e| collection.summary(e)).collect();
            return Ok(json!({ "count": summaries.len(), key: summaries }));
        }
        CollectionOp::Create => {
            let element = collection.create_element(args);
            let id = element_id(&element).unwrap_or_default().to_string();
            let name = element.get("name").cloned().unwrap_or(Value::Null);
            items.push(element);

            tracing::info!(project_id, collection = key, id = %id, "Creating element");
            json!({
                "id": id,
                "name": name,
                "message": format!("Created {} '{}'", collection.singular(), string_arg(args, "name")),
            })
        }
        CollectionOp::Update => {
            let id = string_arg(args, collection.id_param());
            let element = items
                .iter_mut()
                .find(|e| element_id(e) == Some(id))
                .ok_or_else(|| not_found(collection, id))?;
            collection.apply_fields(element, args);

            tracing::info!(project_id, collection = key, id, "Updating element");
            element.clone()
        }
        CollectionOp::Delete => {
            let id = string_arg(args, collection.id_param());
            let before = items.len();
            items.retain(|e| element_id(e) != Some(id));
            if items.len() == before {
                return Err(not_found(collection, id));
            }

            tracing::info!(project_id, collection = key, id, "Deleting element");
            json!({ "deleted": id })
        }
    };

    configuration.insert(key.to_string(), Value::Array(items));
    client
        .update_project_configuration(project_id, Value::Object(configuration))
        .await?;
    Ok(result)
}

fn not_found(collection: Collection, id: &str) -> Error {
    Error::ElementNotFound {
        collection: collection.key().to_string(),
        id: id.to_string(),
    }
}
