use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod list;

#[derive(Parser)]
#[command(name = "lunar", version, about = "Lunar chunk inspection tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a precompiled chunk and print its listing
    List {
        chunk: PathBuf,
        /// Emit the decoded prototype tree as JSON instead
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { chunk, json } => list_chunk(chunk, json)?,
    }

    Ok(())
}

fn list_chunk(path: PathBuf, json: bool) -> Result<()> {
    let data = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let proto =
        lunar_chunk::undump(&data).with_context(|| format!("decoding {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&proto)?);
    } else {
        print!("{}", list::list(&proto)?);
    }

    Ok(())
}
