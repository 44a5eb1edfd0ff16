use serde_json::json;

use crate::registry::{Collection, CollectionOp, Param, ToolCategory, ToolDescriptor};

const TRANSITION_TYPES: &[&str] = &["action", "automatic", "conditional"];

fn project_id() -> Param {
    Param::uuid("project_id", "Project UUID").required()
}

fn tool(
    name: &'static str,
    category: ToolCategory,
    description: &'static str,
    collection: Collection,
    op: CollectionOp,
) -> ToolDescriptor {
    ToolDescriptor::collection(name, category, description, collection, op).param(project_id())
}

pub(super) fn tools() -> Vec<ToolDescriptor> {
    let mut tools = workflows();
    tools.extend(states());
    tools.extend(images());
    tools.extend(transitions());
    tools
}

fn workflows() -> Vec<ToolDescriptor> {
    use CollectionOp::*;
    let (c, w) = (ToolCategory::Workflows, Collection::Workflows);

    vec![
        tool("list_workflows", c, "List the workflows in a project.", w, List),
        tool(
            "create_workflow",
            c,
            "Create a graph-format workflow in a project's configuration.",
            w,
            Create,
        )
        .param(Param::string("name", "Workflow name").required())
        .param(Param::array("actions", "Workflow actions (id, type, config, position)"))
        .param(Param::object("connections", "Connections between actions")),
        tool("update_workflow", c, "Update an existing workflow.", w, Update)
            .param(Param::string("workflow_id", "Workflow id").required())
            .param(Param::string("name", "New name"))
            .param(Param::array("actions", "Replacement actions"))
            .param(Param::object("connections", "Replacement connections")),
        tool("delete_workflow", c, "Delete a workflow.", w, Delete)
            .param(Param::string("workflow_id", "Workflow id").required()),
    ]
}

fn states() -> Vec<ToolDescriptor> {
    use CollectionOp::*;
    let (c, s) = (ToolCategory::States, Collection::States);

    vec![
        tool("list_states", c, "List the states in a project.", s, List),
        tool(
            "create_state",
            c,
            "Create a state: a screen or UI condition recognized by its identifying images.",
            s,
            Create,
        )
        .param(Param::string("name", "State name").required())
        .param(Param::string("description", "State description"))
        .param(Param::array("identifying_images", "Images that identify the state"))
        .param(Param::boolean("is_initial", "Whether this is an initial state").default(json!(false)))
        .param(Param::boolean("is_final", "Whether this is a final state").default(json!(false))),
        tool("update_state", c, "Update an existing state.", s, Update)
            .param(Param::string("state_id", "State id").required())
            .param(Param::string("name", "New name"))
            .param(Param::string("description", "New description"))
            .param(Param::array("identifying_images", "Replacement identifying images"))
            .param(Param::boolean("is_initial", "Initial state flag"))
            .param(Param::boolean("is_final", "Final state flag")),
        tool("delete_state", c, "Delete a state.", s, Delete)
            .param(Param::string("state_id", "State id").required()),
    ]
}

fn images() -> Vec<ToolDescriptor> {
    use CollectionOp::*;
    let (c, i) = (ToolCategory::Images, Collection::Images);

    vec![
        tool("list_images", c, "List the images in a project.", i, List),
        tool(
            "add_image",
            c,
            "Add a base64-encoded image for pattern matching.",
            i,
            Create,
        )
        .param(Param::string("name", "Image name").required())
        .param(Param::string("data", "Base64-encoded image data").required())
        .param(Param::string("format", "Image format").default(json!("png"))),
        tool("delete_image", c, "Delete an image.", i, Delete)
            .param(Param::string("image_id", "Image id").required()),
    ]
}

fn transitions() -> Vec<ToolDescriptor> {
    use CollectionOp::*;
    let (c, t) = (ToolCategory::Transitions, Collection::Transitions);

    vec![
        tool("list_transitions", c, "List the transitions in a project.", t, List),
        tool(
            "create_transition",
            c,
            "Create a transition between two states, run by the given workflows.",
            t,
            Create,
        )
        .param(Param::string("name", "Transition name").required())
        .param(Param::string("from_state", "Source state id").required())
        .param(Param::string("to_state", "Target state id").required())
        .param(Param::array("workflows", "Workflow ids to run"))
        .param(
            Param::string("type", "Transition type")
                .one_of(TRANSITION_TYPES)
                .default(json!("action")),
        )
        .param(Param::integer("timeout", "Timeout in milliseconds").default(json!(10000)))
        .param(Param::integer("retry_count", "Retries on failure").default(json!(3))),
        tool("update_transition", c, "Update an existing transition.", t, Update)
            .param(Param::string("transition_id", "Transition id").required())
            .param(Param::string("name", "New name"))
            .param(Param::string("from_state", "New source state id"))
            .param(Param::string("to_state", "New target state id"))
            .param(Param::array("workflows", "Replacement workflow ids"))
            .param(Param::string("type", "New transition type").one_of(TRANSITION_TYPES))
            .param(Param::integer("timeout", "New timeout in milliseconds"))
            .param(Param::integer("retry_count", "New retry count")),
        tool("delete_transition", c, "Delete a transition.", t, Delete)
            .param(Param::string("transition_id", "Transition id").required()),
    ]
}
