//! MCP tool parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cursor_memory_mcp::SuggestionFormat;

/// Parameters for tools that take no input
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct EmptyParams {}

// === load_memory_files ===
/// Parameters for loading memory file contents
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct LoadMemoryFilesParams {
    /// File names to load, searched in short-term, long-term, then rules.
    /// Omit to load every memory file.
    #[serde(default)]
    pub file_names: Option<Vec<String>>,
}

// === suggest_memory_update ===
/// Parameters for suggesting a memory file update
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SuggestMemoryUpdateParams {
    /// Memory file name, e.g. "working-memory.md" or "auth-patterns.md"
    pub file_name: String,
    /// Content to add
    pub content: String,
    /// Prefix the entry with a "## YYYY-MM-DD HH:MM:SS" heading (default: true)
    #[serde(default)]
    pub add_timestamp: Option<bool>,
    /// Output format: "prompt" or "script" (default: "prompt")
    #[serde(default)]
    pub format: Option<SuggestionFormat>,
}

// === generate_memory_update_script ===
/// Parameters for rendering a memory update as a shell script
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateMemoryUpdateScriptParams {
    /// Memory file name
    pub file_name: String,
    /// Content to append
    pub content: String,
    /// Prefix the entry with a timestamp heading (default: true)
    #[serde(default)]
    pub add_timestamp: Option<bool>,
}
