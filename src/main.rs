mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use toolschema::config::ToolSchemaConfig;
use toolschema::schema::EditorMode;

#[derive(Parser)]
#[command(name = "toolschema", version, about = "Parameter schema editor for LLM tools")]
struct Cli {
    /// Config file (defaults to ~/.toolschema/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config: stdio or sse)
    Serve {
        /// Override the configured transport
        #[arg(long)]
        transport: Option<String>,
    },
    /// Create an empty tool schema and print its id
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Stable script identifier; bindings are stored under it
        #[arg(long)]
        script_id: Option<String>,
    },
    /// List stored schemas
    List,
    /// Show a schema, its bindings, and structural problems
    Show { id: String },
    /// Apply edits to a schema through an editor session and save
    Edit {
        id: String,
        /// JSON array of edit operations
        #[arg(long)]
        ops: Option<PathBuf>,
        /// Advanced-view JSON that replaces the draft
        #[arg(long)]
        advanced: Option<PathBuf>,
        /// Run the advanced-view JSON through the optimizer first
        #[arg(long, requires = "advanced")]
        optimize: bool,
        /// tool, pre_tool, or agent_variables
        #[arg(long, default_value = "tool")]
        mode: EditorMode,
        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Export schemas and bindings as JSON to stdout
    Export {
        /// Export only this schema
        id: Option<String>,
    },
    /// Import schemas from an export file
    Import { file: PathBuf },
    /// Check database health and validate stored schemas
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ToolSchemaConfig::load_from(path)?,
        None => ToolSchemaConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            if let Some(transport) = transport {
                config.server.transport = transport;
            }
            server::serve(config).await?;
        }
        Command::Create {
            name,
            description,
            script_id,
        } => cli::create::create(&config, &name, description.as_deref(), script_id.as_deref())?,
        Command::List => cli::list::list(&config)?,
        Command::Show { id } => cli::show::show(&config, &id)?,
        Command::Edit {
            id,
            ops,
            advanced,
            optimize,
            mode,
            dry_run,
        } => {
            let input = cli::edit::EditInput {
                ops: ops.as_deref(),
                advanced: advanced.as_deref(),
                optimize,
            };
            cli::edit::edit(&config, &id, input, mode, dry_run).await?;
        }
        Command::Export { id } => cli::export::export(&config, id.as_deref())?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
