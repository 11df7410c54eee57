//! CLI for scriptdex.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scriptdex_core::config::{self, ScriptdexConfig};
use std::path::{Path, PathBuf};

use commands::{run_crawl, run_fingerprint, run_verify};

/// Start page used when `crawl` is given no URL.
pub const DEFAULT_START_URL: &str = "http://ya.ru";

/// Top-level CLI for scriptdex.
#[derive(Debug, Parser)]
#[command(name = "scriptdex")]
#[command(about = "scriptdex: crawl a site and store its JavaScript, deduplicated by content", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl a site, store every distinct script once and write the URL index.
    Crawl {
        /// Start page (http or https).
        #[arg(default_value = DEFAULT_START_URL)]
        url: String,

        /// Directory for script files (overrides config `output_dir`).
        #[arg(short = 'o', long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Path of the JSON index written at the end of the run.
        #[arg(long, visible_alias = "meta", value_name = "FILE")]
        index_file: Option<PathBuf>,

        /// Link depth; the start page is depth 1.
        #[arg(long, value_name = "N")]
        max_depth: Option<u32>,

        /// Pages fetched concurrently.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Skip links whose URL contains WORD. Repeatable; added to config `filter_words`.
        #[arg(long = "filter-word", visible_alias = "fw", value_name = "WORD")]
        filter_words: Vec<String>,
    },

    /// Check that a written index points at existing, distinct files.
    Verify {
        /// Path to the JSON index.
        index_file: PathBuf,
    },

    /// Print the content fingerprint of a file.
    Fingerprint {
        /// Path to the file.
        path: PathBuf,
    },
}

/// Crawl flags layered over the loaded config.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlOverrides {
    pub output: Option<PathBuf>,
    pub index_file: Option<PathBuf>,
    pub max_depth: Option<u32>,
    pub workers: Option<usize>,
    pub filter_words: Vec<String>,
}

impl CrawlOverrides {
    pub fn apply(self, mut cfg: ScriptdexConfig) -> ScriptdexConfig {
        if let Some(dir) = self.output {
            cfg.output_dir = dir;
        }
        if let Some(file) = self.index_file {
            cfg.index_file = file;
        }
        if let Some(depth) = self.max_depth {
            cfg.max_depth = depth;
        }
        if let Some(n) = self.workers {
            cfg.workers = n;
        }
        for word in self.filter_words {
            if !cfg.filter_words.contains(&word) {
                cfg.filter_words.push(word);
            }
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Crawl {
                url,
                output,
                index_file,
                max_depth,
                workers,
                filter_words,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let cfg = CrawlOverrides {
                    output,
                    index_file,
                    max_depth,
                    workers,
                    filter_words,
                }
                .apply(cfg);
                run_crawl(&cfg, &url).await?;
            }
            CliCommand::Verify { index_file } => run_verify(&index_file).await?,
            CliCommand::Fingerprint { path } => run_fingerprint(Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
