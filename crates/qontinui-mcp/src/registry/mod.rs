//! Tool registry: one declarative descriptor per tool
//!
//! Descriptors carry everything the dispatcher needs: the parameter table used
//! for validation and `tools/list` schemas, and the route telling it where the
//! work happens.

mod catalog;
mod store;
mod types;

pub use catalog::{TOOL_COUNT, all_tools};
pub use store::ToolRegistry;
pub use types::{
    AuthOp, BodyStyle, Collection, CollectionOp, Constraint, Param, ParamKind, Route,
    ToolCategory, ToolDescriptor,
};
