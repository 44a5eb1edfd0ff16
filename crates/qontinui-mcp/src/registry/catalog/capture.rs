use qontinui_client::Method;
use serde_json::json;

use crate::registry::{BodyStyle, Param, ToolCategory, ToolDescriptor};

const CATEGORY: ToolCategory = ToolCategory::Capture;

const SESSION_STATUSES: &[&str] = &["capturing", "uploading", "analyzing", "completed", "failed"];
const LEARNED_STATUSES: &[&str] = &["draft", "reviewing", "approved", "rejected", "published"];
const ACTION_TYPES: &[&str] = &[
    "click",
    "double_click",
    "right_click",
    "type",
    "key_press",
    "scroll",
];

fn session_id() -> Param {
    Param::uuid("session_id", "Capture session UUID").required()
}

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::http(
            "create_capture_session",
            CATEGORY,
            "Start recording a capture session: screenshots plus the user actions \
             performed on them.",
            Method::POST,
            "/api/v1/capture/projects/{project_id}/capture-sessions",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("name", "Session name").required())
        .param(Param::string("description", "What is being recorded")),
        ToolDescriptor::http(
            "list_capture_sessions",
            CATEGORY,
            "List a project's capture sessions.",
            Method::GET,
            "/api/v1/capture/capture-sessions",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("status", "Only sessions in this status").one_of(SESSION_STATUSES))
        .param(Param::integer("limit", "Maximum number of sessions").default(json!(50))),
        ToolDescriptor::http(
            "get_capture_session",
            CATEGORY,
            "Get a capture session with its screenshots and actions.",
            Method::GET,
            "/api/v1/capture/capture-sessions/{session_id}",
        )
        .param(session_id()),
        ToolDescriptor::http(
            "upload_capture_screenshot",
            CATEGORY,
            "Upload a base64-encoded screenshot to a capture session.",
            Method::POST,
            "/api/v1/capture/capture-sessions/{session_id}/screenshots",
        )
        .param(session_id())
        .param(Param::string("image_data", "Base64-encoded screenshot image").required())
        .param(Param::integer("width", "Image width in pixels").required())
        .param(Param::integer("height", "Image height in pixels").required())
        .param(Param::string("timestamp", "ISO timestamp when the screenshot was taken")),
        ToolDescriptor::http(
            "add_capture_action",
            CATEGORY,
            "Record a user action performed on a captured screenshot.",
            Method::POST,
            "/api/v1/capture/capture-sessions/{session_id}/actions",
        )
        .param(session_id())
        .param(Param::string("screenshot_id", "Screenshot the action was performed on").required())
        .param(
            Param::string("action_type", "Type of action")
                .one_of(ACTION_TYPES)
                .required(),
        )
        .param(Param::integer("x", "X coordinate, for click actions"))
        .param(Param::integer("y", "Y coordinate, for click actions"))
        .param(Param::string("text", "Text typed, for type actions"))
        .param(Param::string("key", "Key pressed, for key_press actions"))
        .param(Param::integer("scroll_delta", "Scroll amount, for scroll actions")),
        ToolDescriptor::http(
            "complete_capture_session",
            CATEGORY,
            "Mark a capture session as complete so it can be analyzed.",
            Method::POST,
            "/api/v1/capture/capture-sessions/{session_id}/complete",
        )
        .param(session_id())
        .body(BodyStyle::Empty),
        ToolDescriptor::http(
            "generate_workflow_from_capture",
            CATEGORY,
            "Generate a learned workflow from a completed capture session.",
            Method::POST,
            "/api/v1/capture/capture-sessions/{session_id}/learned-workflows",
        )
        .param(session_id())
        .param(Param::string("workflow_name", "Name for the generated workflow").wire_name("name")),
        ToolDescriptor::http(
            "list_learned_workflows",
            CATEGORY,
            "List workflows learned from capture sessions.",
            Method::GET,
            "/api/v1/capture/projects/{project_id}/learned-workflows",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("status", "Only workflows in this status").one_of(LEARNED_STATUSES)),
        ToolDescriptor::http(
            "approve_learned_workflow",
            CATEGORY,
            "Approve a learned workflow, optionally publishing it to the project.",
            Method::POST,
            "/api/v1/capture/learned-workflows/{workflow_id}/approve",
        )
        .param(Param::string("workflow_id", "Learned workflow id").required())
        .param(Param::boolean("publish", "Publish after approval").default(json!(false))),
    ]
}
