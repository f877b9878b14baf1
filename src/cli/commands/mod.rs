//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod documents;
mod edit;
mod process;
mod review;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tabledit::config::{LoadOptions, Settings};

#[derive(Parser)]
#[command(name = "tabledit")]
#[command(about = "Review and correction client for OCR table extraction results")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend server URL (overrides config file)
    #[arg(short, long, global = true, env = "TABLEDIT_SERVER")]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image for processing and show the detection summary
    Process {
        /// Path to the image file (png, jpg or jpeg)
        image: PathBuf,
        /// Start an interactive review session once processing finishes
        #[arg(short, long)]
        review: bool,
    },

    /// Show the detected cells and text for a processed image
    Show {
        /// Processed-image path or filename (as printed by `process`)
        artifact: String,
        /// Only show items with confidence below this percentage
        #[arg(long, value_name = "PERCENT")]
        below: Option<u8>,
    },

    /// Show which result file edits for an artifact would be saved to
    Resolve {
        /// Processed-image path or filename
        artifact: String,
    },

    /// Save a single text correction
    Save {
        /// Processed-image path or filename
        artifact: String,
        /// Target cell id
        #[arg(long, value_name = "ID")]
        cell: Option<i64>,
        /// Target unassigned-text id
        #[arg(long = "text-id", value_name = "ID")]
        text_id: Option<i64>,
        /// Corrected text
        text: String,
    },

    /// Interactively review and correct a processed image
    Review {
        /// Processed-image path or filename
        artifact: String,
        /// Path of the original uploaded image, recorded when publishing
        #[arg(long)]
        original: Option<String>,
    },

    /// Save the current results as a named document
    Publish {
        /// Processed-image path or filename
        artifact: String,
        /// Document name (prompted for when omitted)
        #[arg(short, long)]
        name: Option<String>,
        /// Path of the original uploaded image
        #[arg(long)]
        original: Option<String>,
    },

    /// Browse saved documents
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },
}

#[derive(Subcommand)]
enum DocumentCommands {
    /// List saved documents
    List,
    /// Show one saved document with its text items
    Show {
        /// Document id
        id: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        server_override: cli.server,
    };
    let settings = Settings::load(&options)?;

    match cli.command {
        Commands::Process { image, review } => {
            process::cmd_process(&settings, &image, review).await
        }
        Commands::Show { artifact, below } => show::cmd_show(&settings, &artifact, below).await,
        Commands::Resolve { artifact } => edit::cmd_resolve(&settings, &artifact).await,
        Commands::Save {
            artifact,
            cell,
            text_id,
            text,
        } => edit::cmd_save(&settings, &artifact, cell, text_id, &text).await,
        Commands::Review { artifact, original } => {
            review::cmd_review(&settings, &artifact, original).await
        }
        Commands::Publish {
            artifact,
            name,
            original,
        } => documents::cmd_publish(&settings, &artifact, name, original).await,
        Commands::Documents { command } => match command {
            DocumentCommands::List => documents::cmd_documents_list(&settings).await,
            DocumentCommands::Show { id } => documents::cmd_document_show(&settings, &id).await,
        },
    }
}
