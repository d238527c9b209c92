use clap::Parser;
use keywave_search::{CreateOutcome, IndexName, IndexSchema, SearchIndex};
use snafu::ResultExt;

use crate::{
    error::{IndexSnafu, Result, SearchIndexSnafu},
    remote::SearchServiceArgs,
};

/// Create a keyword index with the fixed schema
#[derive(Parser)]
pub struct CreateIndexArgs {
    /// First segment of the index name.
    #[arg(long, default_value = "keywords")]
    index_prefix: String,

    /// Language part of the index name.
    #[arg(long)]
    language: String,

    /// Country part of the index name.
    #[arg(long)]
    country: String,

    /// Year part of the index name.
    #[arg(long)]
    year: String,

    /// Month part of the index name.
    #[arg(long)]
    month: String,

    /// Number of primary shards.
    #[arg(long, default_value = "10")]
    shards: u32,

    /// Number of replicas.
    #[arg(long, default_value = "1")]
    replicas: u32,

    #[clap(flatten)]
    search: SearchServiceArgs,
}

impl CreateIndexArgs {
    pub async fn run(self) -> Result<()> {
        let name = IndexName::new(
            &self.index_prefix,
            &self.language,
            &self.country,
            &self.year,
            &self.month,
        )
        .context(IndexSnafu {})?;

        let schema = IndexSchema {
            number_of_shards: self.shards,
            number_of_replicas: self.replicas,
        };

        let index = self.search.search_index()?;
        let outcome = index
            .create_index(&name, &schema)
            .await
            .context(SearchIndexSnafu {})?;

        match outcome {
            CreateOutcome::Created => println!("Created index {name}"),
            CreateOutcome::AlreadyExists => println!("Index {name} already exists"),
        }

        Ok(())
    }
}
