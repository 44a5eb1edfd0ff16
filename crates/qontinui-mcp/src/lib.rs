//! MCP Server for the Qontinui web backend
//!
//! This crate exposes the Qontinui REST API via the Model Context Protocol (MCP),
//! so an AI assistant can manage projects, their configuration documents, executions,
//! variables and capture sessions through named tools.
//!
//! # Architecture
//!
//! `qontinui-mcp` is a thin adapter over `qontinui-client`:
//!
//! ```text
//! [ MCP Client (Claude/IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ QontinuiMcpServer ] --> [ Dispatcher ] --> [ ToolRegistry ]
//!        |                       |
//!        |                       +--> validation --> routing / collections
//!        v                       v
//! [ QontinuiClient ] --(HTTP/JSON)--> [ Qontinui API ]
//! ```
//!
//! # Tools
//!
//! The registry holds one descriptor per tool, covering:
//! - Authentication (login, logout, status)
//! - Projects and configuration documents (export, import, validate)
//! - Workflows, states, images and transitions inside a configuration
//! - Executions, variables and capture sessions

pub mod collections;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod routing;
pub mod server;
pub mod validation;

pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use protocol::{ToolContent, ToolResult};
pub use registry::{TOOL_COUNT, ToolDescriptor, ToolRegistry};
pub use server::QontinuiMcpServer;
