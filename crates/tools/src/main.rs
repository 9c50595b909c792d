use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog::ItemType;
use clap::{Parser, Subcommand, ValueEnum};
use explorer::{ExplorerConfig, Tab, ViewState, canonical_query};
use search::SearchIndex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "explore", about = "Inspect place datasets and explorer URLs offline")]
struct Cli {
    /// Explorer config JSON; environment overrides apply on top.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load datasets and summarize types and groups.
    Stats {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Type for sheet rows with an empty type cell.
        #[arg(long)]
        fallback_type: Option<String>,
    },
    /// Run a fuzzy query against loaded datasets.
    Search {
        query: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = TabArg::Places)]
        tab: TabArg,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Decode a URL into view state and print its canonical query.
    Url { url: String },
    /// Apply a URL to loaded datasets and show the resulting view.
    Resolve {
        url: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = 20)]
        list: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TabArg {
    Groups,
    Places,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Tab {
        match tab {
            TabArg::Groups => Tab::Groups,
            TabArg::Places => Tab::Places,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ExplorerConfig> {
    let config = match path {
        Some(path) => ExplorerConfig::from_path(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Stats {
            files,
            top,
            fallback_type,
        } => {
            if let Some(raw) = fallback_type {
                let ty = ItemType::normalize(&raw);
                for path in &files {
                    let stem = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default();
                    if !config.sources.iter().any(|s| s.name == stem) {
                        config.sources.push(
                            catalog::SheetSource::new(stem, path.display().to_string())
                                .with_fallback_type(ty),
                        );
                    }
                }
            }
            let (store, report) = tools::load_files(&files, &config)?;
            print!("{}", tools::stats_report(&store, report, top));
        }
        Command::Search {
            query,
            files,
            tab,
            limit,
        } => {
            let (store, _) = tools::load_files(&files, &config)?;
            let index = SearchIndex::build(&store, config.fuzzy_threshold);
            print!("{}", tools::search_report(&store, &index, &query, tab.into(), limit));
        }
        Command::Url { url } => {
            let query = tools::query_part(&url);
            let state = ViewState::from_query(query);
            print!("{}", tools::describe_state(&state));
            println!("canonical: ?{}", canonical_query(query));
        }
        Command::Resolve { url, files, list } => {
            let (store, _) = tools::load_files(&files, &config)?;
            print!("{}", tools::resolve_report(store, config, &url, list));
        }
    }
    Ok(())
}
