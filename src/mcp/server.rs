//! MCP stdio server implementation
//!
//! Reads newline-delimited JSON-RPC requests, dispatches them to the tool
//! registry, and writes one response line per request. Notifications get no
//! response. Logging goes to stderr; stdout carries only protocol traffic.

use crate::config::ExtractOptions;
use crate::error::Result;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{
    ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo,
    ToolCallParams,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// MCP server state
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
    /// Server info
    info: ServerInfo,
    /// Whether the server has been initialized
    initialized: RwLock<bool>,
}

impl McpServer {
    /// Create a server whose extractions use `options`
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            tools: ToolRegistry::new(options),
            info: ServerInfo::default(),
            initialized: RwLock::new(false),
        }
    }

    /// Server name and version
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Whether `initialize` has been received (and no `shutdown` since)
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Serve over process stdin/stdout until EOF
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve over any line-oriented reader/writer pair until EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "Starting MCP server: {} v{}",
            self.info.name, self.info.version
        );

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(resp) = self.handle_line(&line).await {
                let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
                    error!("Failed to serialize response: {}", e);
                    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#
                        .to_string()
                });

                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single line of input
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::parse_error(e));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request. Notifications are processed but never
    /// answered, whatever their outcome.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.id.clone();
        let outcome = self.dispatch(request).await;

        if notification {
            return None;
        }
        outcome.map(|outcome| JsonRpcResponse::reply(id, outcome))
    }

    /// Run a method; `None` for methods that never produce a reply
    async fn dispatch(
        &self,
        request: JsonRpcRequest,
    ) -> Option<std::result::Result<Value, JsonRpcError>> {
        let internal = |e: crate::error::Error| JsonRpcError::new(ErrorCode::InternalError, e);

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await.map_err(internal),
            "initialized" | "notifications/initialized" => return None,
            "shutdown" => {
                self.handle_shutdown().await;
                Ok(Value::Null)
            }
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => match request.params.map(serde_json::from_value::<ToolCallParams>) {
                Some(Ok(params)) => {
                    let result = self.tools.execute(&params.name, params.arguments).await;
                    serde_json::to_value(result).map_err(|e| internal(e.into()))
                }
                Some(Err(e)) => Err(JsonRpcError::new(ErrorCode::InvalidParams, e)),
                None => Err(JsonRpcError::new(ErrorCode::InvalidParams, "missing params")),
            },
            "ping" => Ok(json!({})),
            method => {
                warn!("Unknown method: {}", method);
                Err(JsonRpcError::new(ErrorCode::MethodNotFound, method))
            }
        };
        Some(outcome)
    }

    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        if let Some(version) = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
        {
            debug!("Client protocol version: {}", version);
        }

        *self.initialized.write().await = true;
        Ok(serde_json::to_value(InitializeResult::new(self.info.clone()))?)
    }

    async fn handle_shutdown(&self) {
        info!("Handling shutdown");
        *self.initialized.write().await = false;
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::PROTOCOL_VERSION;

    fn request(method: &str, params: Option<Value>, id: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }

    #[tokio::test]
    async fn test_initialize_and_shutdown() {
        let server = McpServer::default();
        let response = server
            .handle_request(request(
                "initialize",
                Some(json!({ "protocolVersion": PROTOCOL_VERSION })),
                Some(json!(1)),
            ))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "design-extract");
        assert!(server.is_initialized().await);

        server
            .handle_request(request("shutdown", None, Some(json!(2))))
            .await
            .unwrap();
        assert!(!server.is_initialized().await);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = McpServer::default();
        assert!(server
            .handle_request(request("initialized", None, None))
            .await
            .is_none());
        assert!(server.handle_request(request("ping", None, None)).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let server = McpServer::default();
        let response = server
            .handle_request(request("tools/call", None, Some(json!(5))))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_failed_notifications_stay_silent() {
        let server = McpServer::default();
        assert!(server
            .handle_request(request("tools/call", None, None))
            .await
            .is_none());
        assert!(server
            .handle_request(request("tools/call", Some(json!({ "arguments": {} })), None))
            .await
            .is_none());
        assert!(server
            .handle_request(request("resources/list", None, None))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = McpServer::default()
            .handle_request(request("resources/list", None, Some(json!(9))))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("resources/list"));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = McpServer::default().handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
    }
}
