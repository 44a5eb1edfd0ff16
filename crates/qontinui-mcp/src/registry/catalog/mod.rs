//! The tool catalog

mod auth;
mod capture;
mod collections;
mod configuration;
mod execution;
mod projects;
mod variables;

use super::ToolDescriptor;

/// Number of tools in the catalog.
pub const TOOL_COUNT: usize = 44;

/// Every tool, in the order `tools/list` reports them.
pub fn all_tools() -> Vec<ToolDescriptor> {
    let mut tools = Vec::with_capacity(TOOL_COUNT);
    tools.extend(auth::tools());
    tools.extend(projects::tools());
    tools.extend(configuration::tools());
    tools.extend(collections::tools());
    tools.extend(execution::tools());
    tools.extend(variables::tools());
    tools.extend(capture::tools());
    tools
}
