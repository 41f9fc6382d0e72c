use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::error::Result;
use cursor_memory_mcp::memory::{self, MemoryConfig, SuggestionFormat, UpdateRequest};

#[derive(Parser)]
#[command(name = "cursor-memory-mcp")]
#[command(about = "MCP server and CLI for Cursor's Markdown memory system")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Start MCP server on stdio (default)
    cursor-memory-mcp serve

    # Check whether the memory layout exists
    cursor-memory-mcp validate

    # List memory files of another project
    cursor-memory-mcp --base-path ../other list

    # Load specific memory files
    cursor-memory-mcp load working-memory.md known-issues.md

    # Render an update as a shell script
    cursor-memory-mcp suggest auth-patterns.md "Validate before handler" --format script

ENVIRONMENT:
    CURSOR_MEMORY_BASE_PATH    Base directory used when --base-path is not given
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base directory containing .cursor/ (default: $CURSOR_MEMORY_BASE_PATH or the current directory)
    #[arg(long, global = true)]
    pub base_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start MCP server on stdio
    Serve,

    /// Check the memory directories and core files
    Validate,

    /// Print the prompt for the current memory state
    Prompt,

    /// List memory files with metadata
    List,

    /// Load memory file contents
    Load {
        /// File names to load (default: all memory files)
        names: Vec<String>,
    },

    /// Suggest an update to a memory file without writing it
    Suggest {
        /// Memory file name
        file_name: String,

        /// Content to add
        content: String,

        /// Do not prefix the entry with a timestamp heading
        #[arg(long)]
        no_timestamp: bool,

        /// Output format: prompt, script
        #[arg(short, long, default_value = "prompt")]
        format: SuggestionFormat,
    },
}

pub async fn run_mcp_server(base_path: Option<PathBuf>) -> Result<()> {
    use crate::mcp::McpServer;
    use rmcp::ServiceExt;

    let server = McpServer::new(base_path);
    tracing::info!("Starting memory MCP server on stdio");

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server
        .serve(transport)
        .await
        .map_err(|e| crate::error::MemoryError::Mcp(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| crate::error::MemoryError::Mcp(e.to_string()))?;

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn validate(base_path: Option<&Path>) -> Result<()> {
    let config = MemoryConfig::resolve(base_path);
    print_json(&memory::validate(&config))
}

pub fn show_prompt(base_path: Option<&Path>) -> Result<()> {
    let config = MemoryConfig::resolve(base_path);
    print_json(&memory::prompt_for_current_state(&config))
}

pub fn list_files(base_path: Option<&Path>) -> Result<()> {
    let config = MemoryConfig::resolve(base_path);
    print_json(&memory::list_files(&config))
}

pub fn load_files(base_path: Option<&Path>, names: &[String]) -> Result<()> {
    let config = MemoryConfig::resolve(base_path);
    print_json(&memory::load_files(&config, Some(names)))
}

pub fn suggest_update(
    base_path: Option<&Path>,
    file_name: String,
    content: String,
    add_timestamp: bool,
    format: SuggestionFormat,
) -> Result<()> {
    let config = MemoryConfig::resolve(base_path);
    let request = UpdateRequest::new(file_name, content)
        .with_timestamp(add_timestamp)
        .with_format(format);
    print_json(&memory::suggest_update(&config, &request)?)
}
