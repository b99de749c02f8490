//! ferryman - the river-crossing puzzle as MCP tools
//!
//! Subcommands:
//! - `ferryman serve` - Serve the tools over stdio JSON-RPC (default)
//! - `ferryman tools` - Print the tool catalog
//! - `ferryman play <passenger>...` - Apply moves directly and report
//! - `ferryman config` - Print the effective configuration

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ferryconf::FerryConfig;
use ferryman::{McpServer, ProtocolBridge, ToolRegistry};
use serde_json::{json, Value};
use tracing::{info, warn};

mod telemetry;

#[derive(Parser)]
#[command(name = "ferryman")]
#[command(about = "Wolf, goat and cabbage river crossing as MCP tools")]
#[command(version)]
struct Cli {
    /// Config file to load on top of the system and user files
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tools over stdin/stdout
    Serve,

    /// Print the tool catalog offered by `serve`
    Tools {
        /// Output shape
        #[arg(short, long, value_enum, default_value = "mcp")]
        format: CatalogFormat,
    },

    /// Apply moves in order, then check whether the puzzle is solved
    Play {
        /// Passengers to ferry: wolf, goat, cabbage or nothing
        moves: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogFormat {
    /// `tools/list` entries
    Mcp,
    /// Chat-completions function declarations
    Openai,
    /// Normalized descriptors
    Descriptor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = FerryConfig::load_with_sources_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    telemetry::init(&config.telemetry)?;

    for file in &sources.files {
        info!(path = %file.display(), "loaded config file");
    }
    if !sources.env_overrides.is_empty() {
        info!(vars = ?sources.env_overrides, "applied environment overrides");
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let mut server = McpServer::from_config(&config.server);
            let stdin = io::stdin();
            let stdout = io::stdout();
            server
                .run(stdin.lock(), BufWriter::new(stdout.lock()))
                .context("stdio transport failed")?;
        }
        Commands::Tools { format } => {
            print_catalog(format)?;
        }
        Commands::Play { moves } => {
            play(&moves, config.play.max_steps)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml());
        }
    }

    Ok(())
}

fn print_catalog(format: CatalogFormat) -> Result<()> {
    let bridge = ProtocolBridge::new();
    let catalog: Value = match format {
        CatalogFormat::Mcp => json!({ "tools": bridge.list_wire_tools() }),
        CatalogFormat::Openai => Value::Array(
            bridge
                .list_tools()
                .iter()
                .map(|d| d.to_function_schema())
                .collect(),
        ),
        CatalogFormat::Descriptor => serde_json::to_value(bridge.list_tools())?,
    };
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn play(moves: &[String], max_steps: u32) -> Result<()> {
    let mut registry = ToolRegistry::with_default_tools();
    println!("{}\n", registry.environment().describe());

    let limit = usize::try_from(max_steps).unwrap_or(usize::MAX);
    if moves.len() > limit {
        warn!(requested = moves.len(), max_steps, "too many moves, ignoring the rest");
    }

    for (step, passenger) in moves.iter().take(limit).enumerate() {
        let payload = registry
            .dispatch("move_across_river", json!({ "passenger": passenger }))
            .with_context(|| format!("move {} ({})", step + 1, passenger))?;
        println!("{}. {}", step + 1, payload.to_text()?);
    }

    let verdict = registry.dispatch("check_if_solved", json!({}))?;
    println!("\n{}", verdict.to_text()?);
    Ok(())
}
