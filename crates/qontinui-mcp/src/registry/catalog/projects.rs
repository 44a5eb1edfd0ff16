use qontinui_client::Method;
use serde_json::json;

use crate::registry::{Param, ToolCategory, ToolDescriptor};

const CATEGORY: ToolCategory = ToolCategory::Projects;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::http(
            "list_projects",
            CATEGORY,
            "List the projects visible to the authenticated user.",
            Method::GET,
            "/api/v1/projects",
        )
        .param(Param::uuid("organization_id", "Only projects of this organization"))
        .param(Param::integer("skip", "Number of projects to skip").default(json!(0)))
        .param(Param::integer("limit", "Maximum number of projects").default(json!(100))),
        ToolDescriptor::http(
            "create_project",
            CATEGORY,
            "Create a new project with an empty configuration.",
            Method::POST,
            "/api/v1/projects",
        )
        .param(Param::string("name", "Project name").required())
        .param(Param::string("description", "Project description"))
        .param(Param::uuid("organization_id", "Owning organization")),
        ToolDescriptor::http(
            "get_project",
            CATEGORY,
            "Get a project, including its full configuration.",
            Method::GET,
            "/api/v1/projects/{project_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required()),
        ToolDescriptor::http(
            "update_project",
            CATEGORY,
            "Update a project's name, description or whole configuration.",
            Method::PUT,
            "/api/v1/projects/{project_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required())
        .param(Param::string("name", "New name"))
        .param(Param::string("description", "New description"))
        .param(Param::object("configuration", "Replacement configuration document")),
        ToolDescriptor::http(
            "delete_project",
            CATEGORY,
            "Delete a project and its configuration.",
            Method::DELETE,
            "/api/v1/projects/{project_id}",
        )
        .param(Param::uuid("project_id", "Project UUID").required()),
    ]
}
