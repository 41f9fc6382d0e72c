mod cli;
mod mcp;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

// Re-export from lib for internal use
use cursor_memory_mcp::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cursor_memory_mcp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let base_path = cli.base_path.as_deref();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            cli::run_mcp_server(cli.base_path.clone()).await?;
        }
        Commands::Validate => {
            cli::validate(base_path)?;
        }
        Commands::Prompt => {
            cli::show_prompt(base_path)?;
        }
        Commands::List => {
            cli::list_files(base_path)?;
        }
        Commands::Load { names } => {
            cli::load_files(base_path, &names)?;
        }
        Commands::Suggest {
            file_name,
            content,
            no_timestamp,
            format,
        } => {
            cli::suggest_update(base_path, file_name, content, !no_timestamp, format)?;
        }
    }

    Ok(())
}
