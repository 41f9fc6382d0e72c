use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use cursor_memory_mcp::memory::{self, MemoryConfig, SuggestionFormat, UpdateRequest};

use super::params::{
    EmptyParams, GenerateMemoryUpdateScriptParams, LoadMemoryFilesParams,
    SuggestMemoryUpdateParams,
};
use crate::error::Result;

#[derive(Clone)]
pub struct McpServer {
    /// Base path fixed on the command line; otherwise resolved on every call
    base_path: Option<Arc<PathBuf>>,
}

impl McpServer {
    pub fn new(base_path: Option<PathBuf>) -> Self {
        Self {
            base_path: base_path.map(Arc::new),
        }
    }

    fn config(&self) -> MemoryConfig {
        MemoryConfig::resolve(self.base_path.as_deref().map(PathBuf::as_path))
    }

    /// Runs a tool by name.
    ///
    /// The outer error covers unknown tools and malformed arguments; the inner
    /// one is a failure of the operation itself and is reported as a tool error.
    pub fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<Result<Value>, McpError> {
        let config = self.config();

        let result = match name {
            "validate_memory_system" => to_json(memory::validate(&config)),
            "get_memory_prompt_for_current_state" => {
                to_json(memory::prompt_for_current_state(&config))
            }
            "list_memory_files" => to_json(memory::list_files(&config)),
            "load_memory_files" => {
                let params: LoadMemoryFilesParams = parse_params(arguments)?;
                to_json(memory::load_files(&config, params.file_names.as_deref()))
            }
            "suggest_memory_update" => {
                let params: SuggestMemoryUpdateParams = parse_params(arguments)?;
                let request = UpdateRequest::new(params.file_name, params.content)
                    .with_timestamp(params.add_timestamp.unwrap_or(true))
                    .with_format(params.format.unwrap_or_default());
                memory::suggest_update(&config, &request).and_then(to_json)
            }
            "generate_memory_update_script" => {
                let params: GenerateMemoryUpdateScriptParams = parse_params(arguments)?;
                let request = UpdateRequest::new(params.file_name, params.content)
                    .with_timestamp(params.add_timestamp.unwrap_or(true))
                    .with_format(SuggestionFormat::Script);
                memory::suggest_update(&config, &request).and_then(to_json)
            }
            _ => {
                return Err(McpError::invalid_params(
                    format!("Unknown tool: {}", name),
                    None,
                ));
            }
        };

        Ok(result)
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_params<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> std::result::Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

fn schema_for<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema) {
        Ok(Value::Object(map)) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

fn tool<T: JsonSchema>(name: &'static str, title: &str, description: &'static str) -> Tool {
    Tool {
        name: name.into(),
        title: Some(title.to_string()),
        description: Some(description.into()),
        input_schema: schema_for::<T>(),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

fn tools() -> Vec<Tool> {
    vec![
        tool::<EmptyParams>(
            "validate_memory_system",
            "Validate Memory System",
            "Checks whether the Cursor memory directories and core files exist. \
             Use it to decide if the memory system still needs to be initialized.",
        ),
        tool::<EmptyParams>(
            "get_memory_prompt_for_current_state",
            "Get Memory Prompt",
            "Returns the setup instructions when the memory system is not configured, \
             or the active memory prompt when it is.",
        ),
        tool::<EmptyParams>(
            "list_memory_files",
            "List Memory Files",
            "Lists short-term, long-term and memory rule files with size, \
             modification time and line counts.",
        ),
        tool::<LoadMemoryFilesParams>(
            "load_memory_files",
            "Load Memory Files",
            "Loads the contents of the named memory files, or of every memory file \
             when no names are given.",
        ),
        tool::<SuggestMemoryUpdateParams>(
            "suggest_memory_update",
            "Suggest Memory Update",
            "Suggests content to add to a memory file, as an instruction prompt or a \
             shell script. Does not modify any file.",
        ),
        tool::<GenerateMemoryUpdateScriptParams>(
            "generate_memory_update_script",
            "Generate Memory Update Script",
            "Renders a memory update as a ready-to-run shell command and script. \
             Does not modify any file.",
        ),
    ]
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "cursor-memory-mcp".to_string(),
                title: Some("Cursor Memory".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Persistent Markdown memory for Cursor. Call get_memory_prompt_for_current_state \
                 first, then load_memory_files to restore context. Updates are returned as \
                 suggestions for you to apply."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: tools(),
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        tracing::debug!("Tool call: {}", request.name);

        let result = match self.dispatch(request.name.as_ref(), request.arguments)? {
            Ok(value) => {
                let json = serde_json::to_string_pretty(&value).unwrap_or_default();
                CallToolResult::success(vec![Content::text(json)])
            }
            Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
        };

        Ok(result)
    }
}
