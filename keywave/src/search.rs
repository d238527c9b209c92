use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use keywave_search::{IndexName, RankedKeyword, SearchIndex, SearchMode, SearchRequest};
use snafu::ResultExt;

use crate::{
    error::{CsvSnafu, IndexSnafu, IoSnafu, Result, SearchIndexSnafu},
    remote::SearchServiceArgs,
};

/// Search a keyword index, ranked by volume
#[derive(Parser)]
pub struct SearchArgs {
    /// Search term.
    term: String,

    /// Full name of the index to query.
    #[arg(long)]
    index: String,

    /// How the term matches the keyword field.
    #[arg(long, value_enum, default_value = "broad")]
    mode: MatchMode,

    /// Maximum number of results.
    #[arg(long, default_value = "1000")]
    limit: usize,

    /// Write the results to this CSV file instead of printing them.
    #[arg(long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    search: SearchServiceArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Every term must match, in any order.
    Broad,
    /// The terms must match as an exact phrase.
    Phrase,
}

impl From<MatchMode> for SearchMode {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Broad => SearchMode::Broad,
            MatchMode::Phrase => SearchMode::Phrase,
        }
    }
}

impl SearchArgs {
    pub async fn run(self) -> Result<()> {
        let name = IndexName::parse(&self.index).context(IndexSnafu {})?;
        let index = self.search.search_index()?;

        let request = SearchRequest {
            term: self.term.clone(),
            mode: self.mode.into(),
            limit: self.limit,
        };

        let results = index
            .search(&name, request)
            .await
            .context(SearchIndexSnafu {})?;

        match &self.output {
            Some(path) => {
                write_csv(path, &results)?;
                println!("Wrote {} results to {}", results.len(), path.display());
            }
            None => {
                for result in &results {
                    match result.volume {
                        Some(volume) => println!("{}\t{}", result.keyword, volume),
                        None => println!("{}\t-", result.keyword),
                    }
                }
            }
        }

        Ok(())
    }
}

fn write_csv(path: &std::path::Path, results: &[RankedKeyword]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context(CsvSnafu {})?;

    for result in results {
        writer.serialize(result).context(CsvSnafu {})?;
    }

    writer.flush().context(IoSnafu {})?;
    Ok(())
}
