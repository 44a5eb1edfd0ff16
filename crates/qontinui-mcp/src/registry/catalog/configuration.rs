use qontinui_client::Method;
use serde_json::json;

use crate::registry::{BodyStyle, Param, ToolCategory, ToolDescriptor};

const CATEGORY: ToolCategory = ToolCategory::Configuration;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::http(
            "export_configuration",
            CATEGORY,
            "Export a project's complete configuration (workflows, states, transitions, \
             images and settings) as JSON.",
            Method::GET,
            "/api/v1/projects/{project_id}/export",
        )
        .param(Param::uuid("project_id", "Project UUID to export").required()),
        ToolDescriptor::http(
            "import_configuration",
            CATEGORY,
            "Import a configuration into a project, replacing or merging with the \
             existing one.",
            Method::POST,
            "/api/v1/projects/{project_id}/import",
        )
        .param(Param::uuid("project_id", "Project UUID to import into").required())
        .param(Param::object("configuration", "Configuration to import").required())
        .param(
            Param::boolean("merge", "Merge with the existing configuration instead of replacing it")
                .default(json!(false)),
        ),
        ToolDescriptor::http(
            "validate_configuration",
            CATEGORY,
            "Check a configuration document without importing it.",
            Method::POST,
            "/api/v1/projects/validate",
        )
        .param(Param::object("configuration", "Configuration to validate").required())
        .body(BodyStyle::Arg("configuration")),
    ]
}
