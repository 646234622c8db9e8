//! MCP tool definitions and registry

use crate::config::ExtractOptions;
use crate::mcp::types::{ExtractDesignSystemArgs, ToolCallResult, ToolContent, ToolDefinition};
use crate::pipeline::{DesignExtractor, ExtractionResponse};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// A registered MCP tool
pub trait McpTool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;
    /// Tool description
    fn description(&self) -> &str;
    /// Input schema as JSON
    fn input_schema(&self) -> Value;
    /// Get tool definition
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool registry holding all available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
    options: ExtractOptions,
}

impl ToolRegistry {
    /// Create a registry whose extractions use `options`
    pub fn new(options: ExtractOptions) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            options,
        };
        registry.register(Box::new(ExtractDesignSystemTool));
        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name
    #[instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: Value) -> ToolCallResult {
        info!("Executing tool: {}", name);

        match name {
            "extract_design_system" => self.execute_extract(args).await,
            _ => ToolCallResult::error(format!("Tool not found: {}", name)),
        }
    }

    async fn execute_extract(&self, arguments: Value) -> ToolCallResult {
        let args = match ExtractDesignSystemArgs::from_arguments(arguments) {
            Ok(args) => args,
            Err(e) => return ToolCallResult::error(e),
        };
        let Some(url) = args.url() else {
            return ToolCallResult::error("Missing required parameter: url");
        };

        let mut options = self.options.clone();
        if let Some(screenshot) = args.screenshot {
            options.screenshot = screenshot;
        }

        let response = DesignExtractor::new(options).extract(url).await;
        Self::render(response)
    }

    /// Turn an extraction response into tool content: the JSON payload as
    /// text (screenshot data lifted out) plus the screenshot as an image.
    pub fn render(response: ExtractionResponse) -> ToolCallResult {
        match response {
            ExtractionResponse::Success(mut result) => {
                let screenshot = result.screenshot.take();
                let text = match serde_json::to_string_pretty(&result) {
                    Ok(text) => text,
                    Err(e) => return ToolCallResult::error(format!("Serialization failed: {}", e)),
                };

                let mut content = vec![ToolContent::text(text)];
                content.extend(screenshot.map(ToolContent::from));
                ToolCallResult::ok(content)
            }
            ExtractionResponse::Failure(failure) => {
                warn!("Extraction failed: {}", failure.error);
                let text = serde_json::to_string(&failure).unwrap_or(failure.error);
                ToolCallResult::error(text)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

/// Render a site and derive its design tokens
struct ExtractDesignSystemTool;

impl McpTool for ExtractDesignSystemTool {
    fn name(&self) -> &str {
        "extract_design_system"
    }

    fn description(&self) -> &str {
        "Render a website in a headless browser and extract its design system: \
         CSS variables, a clustered color palette with semantic roles, typography, \
         spacing scale, component styles and a viewport screenshot"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the site to analyze"
                },
                "screenshot": {
                    "type": "boolean",
                    "description": "Capture a 1280x800 JPEG of the top viewport",
                    "default": true
                }
            },
            "required": ["url"]
        })
    }
}

/// Names of all built-in tools
pub const AVAILABLE_TOOLS: &[&str] = &["extract_design_system"];
