//! End-to-end dispatcher behavior against the in-memory backend
//!
//! Covers authentication gating, project lifecycle, configuration export/import
//! and the configuration collection tools.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use qontinui_client::Error as ClientError;
use qontinui_mcp::registry::{Param, ParamKind, ToolDescriptor, ToolRegistry};
use qontinui_mcp::{Dispatcher, Error};
use qontinui_test_utils::fake::{FAKE_EMAIL, FAKE_PASSWORD};
use qontinui_test_utils::{
    FakeQontinui, MockBackend, client_with_credentials, client_with_token, unauthenticated_client,
};
use serde_json::{Map, Value, json};

const TOKEN: &str = "fake-jwt-preissued";
const SOME_UUID: &str = "12345678-1234-1234-1234-123456789012";

fn fake() -> Arc<FakeQontinui> {
    Arc::new(FakeQontinui::new().with_token(TOKEN))
}

fn dispatcher(backend: &Arc<FakeQontinui>) -> Dispatcher {
    Dispatcher::new(client_with_token(backend.clone(), TOKEN))
}

/// A value that passes validation for `param`.
fn sample_value(param: &Param) -> Value {
    if let Some(allowed) = param.allowed {
        return json!(allowed[0]);
    }
    match param.kind {
        ParamKind::Uuid => json!(SOME_UUID),
        ParamKind::String | ParamKind::Any => json!("sample"),
        ParamKind::Integer => json!(1),
        ParamKind::Number => json!(1.5),
        ParamKind::Boolean => json!(true),
        ParamKind::Object => json!({}),
        ParamKind::Array => json!([]),
    }
}

/// Minimal arguments satisfying every required parameter of `tool`.
fn minimal_arguments(tool: &ToolDescriptor) -> Value {
    let args: Map<String, Value> = tool
        .required_params()
        .map(|p| (p.name.to_string(), sample_value(p)))
        .collect();
    Value::Object(args)
}

fn remote_status(err: &Error) -> Option<u16> {
    match err {
        Error::Client(ClientError::Remote { status, .. }) => Some(*status),
        _ => None,
    }
}

// ==========================================================================
// Authentication gating
// ==========================================================================

#[tokio::test]
async fn every_protected_tool_fails_offline_without_network() {
    let registry = ToolRegistry::with_catalog();

    for tool in registry.iter().filter(|t| t.requires_auth()) {
        let backend = Arc::new(MockBackend::new());
        let dispatcher = Dispatcher::new(unauthenticated_client(backend.clone()));

        let err = dispatcher
            .invoke(tool.name, minimal_arguments(tool))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Client(ClientError::Auth(_))),
            "{} returned {:?}",
            tool.name,
            err
        );
        assert_eq!(backend.request_count(), 0, "{} touched the network", tool.name);
    }
}

#[tokio::test]
async fn login_status_logout_cycle() {
    let backend = Arc::new(FakeQontinui::new());
    let dispatcher = Dispatcher::new(unauthenticated_client(backend.clone()));

    let status = dispatcher.invoke("auth_status", json!({})).await.unwrap();
    assert_eq!(status["authenticated"], false);

    let login = dispatcher
        .invoke(
            "auth_login",
            json!({"email": FAKE_EMAIL, "password": FAKE_PASSWORD}),
        )
        .await
        .unwrap();
    assert_eq!(login["authenticated"], true);
    assert_eq!(login["user"]["email"], FAKE_EMAIL);

    let status = dispatcher.invoke("auth_status", json!({})).await.unwrap();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["user"]["email"], FAKE_EMAIL);

    let logout = dispatcher.invoke("auth_logout", json!({})).await.unwrap();
    assert_eq!(logout["was_authenticated"], true);

    let status = dispatcher.invoke("auth_status", json!({})).await.unwrap();
    assert_eq!(status["authenticated"], false);
}

#[tokio::test]
async fn rejected_login_is_remote_error_and_stays_logged_out() {
    let backend = Arc::new(FakeQontinui::new());
    let dispatcher = Dispatcher::new(unauthenticated_client(backend));

    let err = dispatcher
        .invoke(
            "auth_login",
            json!({"email": FAKE_EMAIL, "password": "wrong"}),
        )
        .await
        .unwrap_err();
    assert_eq!(remote_status(&err), Some(400));

    let status = dispatcher.invoke("auth_status", json!({})).await.unwrap();
    assert_eq!(status["authenticated"], false);
}

#[tokio::test]
async fn configured_credentials_log_in_on_demand() {
    let backend = Arc::new(FakeQontinui::new());
    let dispatcher = Dispatcher::new(client_with_credentials(
        backend.clone(),
        FAKE_EMAIL,
        FAKE_PASSWORD,
    ));

    let projects = dispatcher.invoke("list_projects", json!({})).await.unwrap();
    assert_eq!(projects, json!([]));
    // login + list
    assert_eq!(backend.request_count(), 2);

    dispatcher.invoke("list_projects", json!({})).await.unwrap();
    assert_eq!(backend.request_count(), 3);
}

// ==========================================================================
// Projects and configuration
// ==========================================================================

#[tokio::test]
async fn created_project_can_be_fetched() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let created = dispatcher
        .invoke("create_project", json!({"name": "Demo"}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let fetched = dispatcher
        .invoke("get_project", json!({"project_id": id}))
        .await
        .unwrap();
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["name"], "Demo");
}

#[tokio::test]
async fn missing_project_surfaces_remote_404() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let err = dispatcher
        .invoke("get_project", json!({"project_id": SOME_UUID}))
        .await
        .unwrap_err();
    assert_eq!(remote_status(&err), Some(404));
    assert_eq!(err.kind(), "remote_error");
}

#[tokio::test]
async fn export_then_import_reproduces_configuration() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let configuration = json!({
        "version": "1.0.0",
        "workflows": [{"id": "workflow-1", "name": "Login", "actions": []}],
        "states": [{"id": "state-1", "name": "Home"}],
        "images": [],
        "transitions": [],
    });
    let source = backend.insert_project("Source", configuration.clone());
    let target = backend.insert_project("Target", json!({}));

    let exported = dispatcher
        .invoke("export_configuration", json!({"project_id": source}))
        .await
        .unwrap();
    assert_eq!(exported, configuration);

    let imported = dispatcher
        .invoke(
            "import_configuration",
            json!({"project_id": target, "configuration": exported}),
        )
        .await
        .unwrap();
    assert_eq!(imported["success"], true);
    assert_eq!(imported["merged"], false);

    let round_trip = dispatcher
        .invoke("export_configuration", json!({"project_id": target}))
        .await
        .unwrap();
    assert_eq!(round_trip, configuration);
}

#[tokio::test]
async fn merge_import_appends_collections() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);
    let id = backend.insert_project("Demo", json!({"states": [{"id": "state-1"}]}));

    dispatcher
        .invoke(
            "import_configuration",
            json!({
                "project_id": id,
                "configuration": {"states": [{"id": "state-2"}]},
                "merge": true,
            }),
        )
        .await
        .unwrap();

    let states = &backend.project(&id).unwrap()["configuration"]["states"];
    assert_eq!(states, &json!([{"id": "state-1"}, {"id": "state-2"}]));
}

#[tokio::test]
async fn validate_configuration_sends_document_as_body() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let report = dispatcher
        .invoke(
            "validate_configuration",
            json!({"configuration": {"workflows": "nope"}}),
        )
        .await
        .unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"], json!(["workflows must be a list"]));
}

// ==========================================================================
// Configuration collections
// ==========================================================================

#[tokio::test]
async fn create_workflow_without_name_never_reaches_backend() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let err = dispatcher
        .invoke("create_workflow", json!({"project_id": SOME_UUID}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { ref tool, .. } if tool == "create_workflow"));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn workflow_lifecycle() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);
    let project = backend.insert_project("Demo", json!({"version": "1.0.0"}));

    let created = dispatcher
        .invoke(
            "create_workflow",
            json!({
                "project_id": project,
                "name": "Login",
                "actions": [{"id": "a1", "type": "CLICK"}],
            }),
        )
        .await
        .unwrap();
    let workflow_id = created["id"].as_str().unwrap().to_string();
    assert!(workflow_id.starts_with("workflow-"));
    assert_eq!(created["name"], "Login");
    assert_eq!(created["message"], "Created workflow 'Login'");

    let stored = backend.project(&project).unwrap();
    assert_eq!(stored["configuration"]["version"], "1.0.0");
    assert_eq!(stored["configuration"]["workflows"][0]["format"], "graph");

    let listed = dispatcher
        .invoke("list_workflows", json!({"project_id": project}))
        .await
        .unwrap();
    assert_eq!(
        listed,
        json!({
            "count": 1,
            "workflows": [{"id": workflow_id, "name": "Login", "action_count": 1}],
        })
    );

    let updated = dispatcher
        .invoke(
            "update_workflow",
            json!({"project_id": project, "workflow_id": workflow_id, "name": "Sign in"}),
        )
        .await
        .unwrap();
    assert_eq!(updated["name"], "Sign in");
    assert_eq!(updated["actions"], json!([{"id": "a1", "type": "CLICK"}]));

    let deleted = dispatcher
        .invoke(
            "delete_workflow",
            json!({"project_id": project, "workflow_id": workflow_id}),
        )
        .await
        .unwrap();
    assert_eq!(deleted, json!({"deleted": workflow_id}));

    let stored = backend.project(&project).unwrap();
    assert_eq!(stored["configuration"]["workflows"], json!([]));
}

#[tokio::test]
async fn listing_does_not_write_back() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);
    let project = backend.insert_project("Demo", json!({}));

    let listed = dispatcher
        .invoke("list_states", json!({"project_id": project}))
        .await
        .unwrap();
    assert_eq!(listed, json!({"count": 0, "states": []}));
    assert_eq!(backend.request_count(), 1);
    assert_eq!(backend.project(&project).unwrap()["configuration"], json!({}));
}

#[tokio::test]
async fn transition_and_image_use_document_field_names() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);
    let project = backend.insert_project("Demo", json!({}));

    let image = dispatcher
        .invoke(
            "add_image",
            json!({"project_id": project, "name": "button", "data": "aGVsbG8="}),
        )
        .await
        .unwrap();
    assert!(image["id"].as_str().unwrap().starts_with("img-"));

    dispatcher
        .invoke(
            "create_transition",
            json!({
                "project_id": project,
                "name": "open",
                "from_state": "state-a",
                "to_state": "state-b",
                "workflows": ["workflow-1"],
            }),
        )
        .await
        .unwrap();

    let configuration = backend.project(&project).unwrap()["configuration"].clone();
    assert_eq!(configuration["images"][0]["format"], "png");
    let transition = &configuration["transitions"][0];
    assert_eq!(transition["fromState"], "state-a");
    assert_eq!(transition["toState"], "state-b");
    assert_eq!(transition["processes"], json!(["workflow-1"]));
    assert_eq!(transition["type"], "action");
}

#[tokio::test]
async fn absent_element_is_not_found_and_nothing_is_written() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);
    let project = backend.insert_project("Demo", json!({"states": [{"id": "state-1"}]}));

    for (tool, id_param) in [
        ("update_state", "state_id"),
        ("delete_state", "state_id"),
        ("delete_image", "image_id"),
        ("update_transition", "transition_id"),
    ] {
        let err = dispatcher
            .invoke(tool, json!({"project_id": project, id_param: "missing-1"}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::ElementNotFound { ref id, .. } if id == "missing-1"),
            "{} returned {:?}",
            tool,
            err
        );
        assert_eq!(err.kind(), "not_found");
    }

    assert_eq!(
        backend.project(&project).unwrap()["configuration"],
        json!({"states": [{"id": "state-1"}]})
    );
}

#[tokio::test]
async fn collection_tool_on_missing_project_is_remote_404() {
    let backend = fake();
    let dispatcher = dispatcher(&backend);

    let err = dispatcher
        .invoke("list_images", json!({"project_id": SOME_UUID}))
        .await
        .unwrap_err();
    assert_eq!(remote_status(&err), Some(404));
}
