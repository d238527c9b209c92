use clap::{Parser, Subcommand};

use crate::{
    create_index::CreateIndexArgs, error::Result, ingest::IngestArgs, search::SearchArgs,
};

mod create_index;
mod error;
mod ingest;
mod observability;
mod remote;
mod search;

#[derive(Parser)]
#[command(name = "keywave")]
#[command(about = "Keyword search ingestion CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest keyword archives from the object store into the search index
    Ingest {
        #[clap(flatten)]
        inner: IngestArgs,
    },
    /// Create a keyword index with the fixed schema
    CreateIndex {
        #[clap(flatten)]
        inner: CreateIndexArgs,
    },
    /// Search a keyword index, ranked by volume
    Search {
        #[clap(flatten)]
        inner: SearchArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_observability();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { inner } => inner.run().await,
        Commands::CreateIndex { inner } => inner.run().await,
        Commands::Search { inner } => inner.run().await,
    }
}
