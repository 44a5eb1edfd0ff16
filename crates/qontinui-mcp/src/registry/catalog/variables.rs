use qontinui_client::Method;
use serde_json::json;

use crate::registry::{Param, ToolCategory, ToolDescriptor};

const CATEGORY: ToolCategory = ToolCategory::Variables;
const SCOPES: &[&str] = &["global", "workflow"];

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::http(
            "list_variables",
            CATEGORY,
            "List a project's variables, optionally filtered by scope or workflow.",
            Method::GET,
            "/api/v1/variables/projects/{project_id}/variables",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("scope", "Only variables in this scope").one_of(SCOPES))
        .param(Param::string("workflow_id", "Only variables of this workflow")),
        ToolDescriptor::http(
            "create_variable",
            CATEGORY,
            "Create a variable. Workflow-scoped variables need a workflow_id.",
            Method::POST,
            "/api/v1/variables/projects/{project_id}/variables",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("name", "Variable name").required())
        .param(Param::any("value", "Variable value").required())
        .param(
            Param::string("scope", "Variable scope")
                .one_of(SCOPES)
                .default(json!("global")),
        )
        .param(Param::string("workflow_id", "Owning workflow for workflow scope"))
        .param(Param::string("description", "What the variable is for"))
        .require_when("scope", "workflow", "workflow_id"),
        ToolDescriptor::http(
            "get_variable",
            CATEGORY,
            "Get one variable.",
            Method::GET,
            "/api/v1/variables/projects/{project_id}/variables/{variable_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("variable_id", "Variable id").required()),
        ToolDescriptor::http(
            "update_variable",
            CATEGORY,
            "Change a variable's value or description.",
            Method::PUT,
            "/api/v1/variables/projects/{project_id}/variables/{variable_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("variable_id", "Variable id").required())
        .param(Param::any("value", "New value").required())
        .param(Param::string("description", "New description")),
        ToolDescriptor::http(
            "delete_variable",
            CATEGORY,
            "Delete a variable.",
            Method::DELETE,
            "/api/v1/variables/projects/{project_id}/variables/{variable_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("variable_id", "Variable id").required()),
        ToolDescriptor::http(
            "get_variable_history",
            CATEGORY,
            "Get the change history of a variable.",
            Method::GET,
            "/api/v1/variables/projects/{project_id}/variables/{variable_id}/history",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("variable_id", "Variable id").required())
        .param(Param::integer("limit", "Maximum number of entries").default(json!(20))),
    ]
}
