//! docqa: ask questions about local documents.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use docqa_core::chunker::Chunker;
use docqa_core::config::Config;
use docqa_core::loader::DocumentLoader;
use docqa_rag::{Pipeline, PipelineContext};

#[derive(Parser, Debug)]
#[command(name = "docqa", version, about = "Question answering over your own documents")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question, grounded in the given files when any are readable
    Ask {
        question: String,
        /// Document to use as context (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
        /// Directory whose files are all used as context (repeatable)
        #[arg(short, long = "dir")]
        dirs: Vec<PathBuf>,
        /// Print the route and sources as JSON alongside the answer
        #[arg(long)]
        json: bool,
    },
    /// Show how a file is split into chunks
    Chunk { file: PathBuf },
    /// Report which capabilities initialized
    Status,
    /// Check that the language model answers
    Health,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

/// Explicit files first, then every regular file under each directory in
/// name order.
fn collect_paths(files: Vec<PathBuf>, dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = files;
    for dir in dirs {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() => paths.push(e.into_path()),
                Ok(_) => {}
                Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
            }
        }
    }
    debug!(count = paths.len(), "input files collected");
    paths
}

fn print_chunks(config: &Config, file: &Path) -> anyhow::Result<()> {
    let units = DocumentLoader::new().load_file(file).with_context(|| format!("loading {}", file.display()))?;
    let docs = Chunker::from_settings(&config.settings().chunking).chunk_units(&units);
    println!("{:>5}  {:<24}  {:>6}  preview", "id", "source", "chars");
    for c in docs.chunks() {
        let preview: String = c.content.chars().take(60).map(|ch| if ch.is_whitespace() { ' ' } else { ch }).collect();
        println!("{:>5}  {:<24}  {:>6}  {}", c.chunk_id, c.source, c.content.chars().count(), preview);
    }
    println!("✅ {} chunks", docs.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    match cli.command {
        Commands::Chunk { file } => print_chunks(&config, &file)?,
        Commands::Ask { question, files, dirs, json } => {
            let paths = collect_paths(files, &dirs);
            let pipeline = Pipeline::new(PipelineContext::initialize(config.settings()));
            let response = pipeline.respond(&question, &paths);
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.answer);
            }
        }
        Commands::Status => {
            let pipeline = Pipeline::new(PipelineContext::initialize(config.settings()));
            println!("{}", serde_json::to_string_pretty(&pipeline.setup_status())?);
        }
        Commands::Health => {
            let pipeline = Pipeline::new(PipelineContext::initialize(config.settings()));
            println!("{}", serde_json::to_string_pretty(&pipeline.health_check())?);
        }
    }
    Ok(())
}
