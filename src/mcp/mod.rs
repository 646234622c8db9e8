//! Model Context Protocol (MCP) server module
//!
//! Exposes design-system extraction to AI agents as a single MCP tool over
//! stdio.

mod server;
mod tools;
/// MCP protocol types
pub mod types;

pub use server::McpServer;
pub use tools::{McpTool, ToolRegistry, AVAILABLE_TOOLS};
pub use types::{
    ErrorCode, ExtractDesignSystemArgs, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ServerInfo, ToolCallResult, ToolContent, ToolDefinition, PROTOCOL_VERSION,
};
