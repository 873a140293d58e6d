//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use marsh_core::config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "marsh")]
#[command(version)]
#[command(about = "Work with indentation-structured chat documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (MARSH_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Parse a document and print its conversation turns
    Messages {
        /// Document to read ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the turns as JSON
        #[arg(long)]
        json: bool,

        /// Only parse the document up to this offset
        #[arg(long, value_name = "OFFSET")]
        cursor: Option<usize>,
    },

    /// Build the chat request body for a document
    Request {
        /// Document to read ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,

        /// Override max_tokens from config
        #[arg(long, value_name = "N")]
        max_tokens: Option<u32>,

        /// Only use the document up to this offset
        #[arg(long, value_name = "OFFSET")]
        cursor: Option<usize>,
    },

    /// Apply a text edit, folding line-leading tabs into indentation
    Edit {
        /// Document to edit in place
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Offset of the edit in the document text without indentation
        #[arg(long, value_name = "OFFSET")]
        at: usize,

        /// Number of units to replace
        #[arg(long, value_name = "LEN", default_value_t = 0)]
        delete: usize,

        /// Text to insert
        #[arg(long, value_name = "TEXT")]
        insert: Option<String>,

        /// Print the rewritten edit as JSON without touching the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Normalize a document by parsing and rendering it back
    Render {
        /// Document to read ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MARSH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dispatch(cli.command)
}

fn load_config() -> Result<config::Config> {
    config::Config::load().context("load config")
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Messages {
            input,
            json,
            cursor,
        } => commands::messages::run(&input, json, cursor, &load_config()?),
        Commands::Request {
            input,
            model,
            max_tokens,
            cursor,
        } => commands::request::run(&commands::request::RequestOptions {
            input: &input,
            model_override: model.as_deref(),
            max_tokens_override: max_tokens,
            cursor,
            config: &load_config()?,
        }),
        Commands::Edit {
            path,
            at,
            delete,
            insert,
            dry_run,
        } => commands::edit::run(&commands::edit::EditOptions {
            path: &path,
            at,
            delete,
            insert: insert.as_deref(),
            dry_run,
            encoding: load_config()?.offset_encoding,
        }),
        Commands::Render { input } => commands::render::run(&input),
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
