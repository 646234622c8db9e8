//! Wire types for the MCP stdio surface
//!
//! JSON-RPC 2.0 framing, the `initialize` handshake payload, and the typed
//! arguments/results of `extract_design_system`.

use crate::browser::Screenshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Incoming JSON-RPC 2.0 message; a notification when `id` is absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Raw parameters
    #[serde(default)]
    pub params: Option<Value>,
    /// Request ID
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Notifications are never answered
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC error codes this server emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Line was not valid JSON-RPC
    ParseError,
    /// Unknown method
    MethodNotFound,
    /// Params missing or of the wrong shape
    InvalidParams,
    /// Failure while producing a result
    InternalError,
}

impl ErrorCode {
    /// Numeric code on the wire
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
        })
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric code
    pub code: i32,
    /// `"<label>: <detail>"`
    pub message: String,
}

impl JsonRpcError {
    /// Error with the code's label and a detail message
    pub fn new(code: ErrorCode, detail: impl fmt::Display) -> Self {
        Self {
            code: code.code(),
            message: format!("{}: {}", code, detail),
        }
    }
}

/// Outgoing JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Echoed request ID (absent only for parse errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a response from the outcome of a method
    pub fn reply(id: Option<Value>, outcome: Result<Value, JsonRpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
            error,
        }
    }

    /// Response to a line that could not be parsed at all
    pub fn parse_error(detail: impl fmt::Display) -> Self {
        Self::reply(None, Err(JsonRpcError::new(ErrorCode::ParseError, detail)))
    }
}

/// Server name and version, from the crate manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Crate name
    pub name: String,
    /// Crate version
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Tools capability; the tool list is fixed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Always false
    pub list_changed: bool,
}

/// Capabilities advertised at `initialize`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tools are the only capability
    pub tools: ToolsCapability,
}

/// Result of `initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol revision
    pub protocol_version: String,
    /// Advertised capabilities
    pub capabilities: ServerCapabilities,
    /// Server name and version
    pub server_info: ServerInfo,
}

impl InitializeResult {
    /// Handshake payload for `info`
    pub fn new(info: ServerInfo) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: info,
        }
    }
}

/// One entry of `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema of the arguments
    pub input_schema: Value,
}

/// Params of `tools/call`
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Tool name
    pub name: String,
    /// Tool-specific arguments, decoded by the tool
    #[serde(default)]
    pub arguments: Value,
}

/// Arguments of `extract_design_system`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractDesignSystemArgs {
    /// Site to analyze
    pub url: String,
    /// Overrides the server's screenshot setting
    pub screenshot: Option<bool>,
}

impl ExtractDesignSystemArgs {
    /// Decode from raw `arguments`; `null` counts as empty
    pub fn from_arguments(arguments: Value) -> Result<Self, String> {
        if arguments.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {}", e))
    }

    /// The URL, if one was given
    pub fn url(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Result of `tools/call`
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallResult {
    /// Set when the tool failed
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    /// Content items
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Successful result
    pub fn ok(content: Vec<ToolContent>) -> Self {
        Self {
            is_error: false,
            content,
        }
    }

    /// Failed result carrying one text item
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::text(message)],
        }
    }
}

/// Content item of a tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text (the extraction JSON)
    Text {
        /// Text body
        text: String,
    },
    /// Image (the viewport screenshot)
    Image {
        /// Base64 image bytes
        data: String,
        /// MIME type
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ToolContent {
    /// Text item
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

impl From<Screenshot> for ToolContent {
    fn from(shot: Screenshot) -> Self {
        Self::Image {
            data: shot.data,
            mime_type: shot.mime_type,
        }
    }
}
