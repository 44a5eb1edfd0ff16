use qontinui_client::Method;
use serde_json::json;

use crate::registry::{BodyStyle, Param, ToolCategory, ToolDescriptor};

const CATEGORY: ToolCategory = ToolCategory::Execution;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::http(
            "execute_workflow",
            CATEGORY,
            "Start a workflow on a runner. Returns the automation session to poll.",
            Method::POST,
            "/api/v1/automation/projects/{project_id}/execute",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("workflow_id", "Workflow to run").required())
        .param(Param::string("runner_id", "Runner device; any available runner if omitted"))
        .param(Param::object("variables", "Runtime variables").default(json!({}))),
        ToolDescriptor::http(
            "get_execution_status",
            CATEGORY,
            "Get the status, logs and screenshots of an automation session.",
            Method::GET,
            "/api/v1/automation/sessions/{session_id}",
        )
        .param(Param::uuid("session_id", "Automation session UUID").required()),
        ToolDescriptor::http(
            "cancel_execution",
            CATEGORY,
            "Cancel a running automation session.",
            Method::POST,
            "/api/v1/automation/sessions/{session_id}/cancel",
        )
        .param(Param::uuid("session_id", "Automation session UUID").required())
        .body(BodyStyle::Empty),
    ]
}
