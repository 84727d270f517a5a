use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pathdex::index::build::{build_from_dir, build_from_list, Catalog, CatalogOptions};
use pathdex::index::{self, HashFilter, MatchFlags, NodeId};
use pathdex::output;
use pathdex::utils::AppConfig;
use std::ops::ControlFlow;
use std::path::PathBuf;
use termcolor::ColorChoice;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pathdex")]
#[command(about = "Catalog paths into a fragment tree and look them up")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory to catalog
    #[arg(short, long, global = true, default_value = ".", conflicts_with = "list")]
    root: PathBuf,

    /// Listing file to catalog instead of a directory (one path per line)
    #[arg(short, long, global = true)]
    list: Option<PathBuf>,

    /// Path delimiter (overrides the config file)
    #[arg(short, long, global = true)]
    delimiter: Option<char>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep duplicate leaves instead of merging repeated paths
    #[arg(long, global = true)]
    duplicates: bool,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Subcommand)]
enum Commands {
    /// Show catalog statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find nodes matching a path pattern (`*`, `?` in the last fragment)
    Find {
        pattern: String,

        /// The pattern must cover the whole path
        #[arg(short, long)]
        full: bool,

        /// Ignore leaves (files)
        #[arg(long)]
        no_leaves: bool,

        /// Ignore branches (directories)
        #[arg(long)]
        no_branches: bool,

        /// Print every match instead of the first
        #[arg(short, long)]
        all: bool,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// List the entries of a directory
    Ls {
        /// Directory path, top level if omitted
        dir: Option<String>,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print every cataloged path
    Paths {
        /// Only print leaves
        #[arg(long)]
        leaves: bool,

        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(clap::Args)]
struct FormatArgs {
    /// Print JSON lines
    #[arg(long)]
    json: bool,

    /// Show kind, hash and size
    #[arg(long = "long", short = 'L')]
    long: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let mut options = CatalogOptions::from(&config);
    if let Some(delimiter) = cli.delimiter {
        if !delimiter.is_ascii() {
            anyhow::bail!("delimiter must be an ASCII character, got {:?}", delimiter);
        }
        options.delimiter = delimiter;
    }
    if cli.duplicates {
        options.index.allow_duplicate_leaves = true;
    }
    options.silent = true;

    let catalog = match &cli.list {
        Some(list) => build_from_list(list, &options)?,
        None => build_from_dir(&cli.root, &options)?,
    };
    let color = ColorChoice::from(cli.color);

    match cli.command {
        Commands::Stats { json } => {
            if json {
                let stats = index::stats::index_stats(&catalog.index);
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                index::stats::show_stats(&catalog);
            }
        }
        Commands::Find {
            pattern,
            full,
            no_leaves,
            no_branches,
            all,
            format,
        } => {
            let mut flags = MatchFlags::new();
            if full {
                flags |= MatchFlags::MATCH_FULL;
            }
            if no_leaves {
                flags |= MatchFlags::NO_LEAF;
            }
            if no_branches {
                flags |= MatchFlags::NO_BRANCH;
            }

            let ids = if all {
                catalog.index.find_all(flags, &pattern, catalog.delimiter)
            } else {
                catalog
                    .index
                    .find(flags, &pattern, catalog.delimiter)
                    .into_iter()
                    .collect()
            };
            if ids.is_empty() {
                tracing::info!(%pattern, "no match");
                std::process::exit(1);
            }
            print(&catalog, &ids, &format, color)?;
        }
        Commands::Ls { dir, format } => {
            let parent = match dir.as_deref() {
                Some(dir) => Some(
                    catalog
                        .index
                        .find(
                            MatchFlags(MatchFlags::NO_LEAF | MatchFlags::MATCH_FULL),
                            dir,
                            catalog.delimiter,
                        )
                        .with_context(|| format!("No such directory: {}", dir))?,
                ),
                None => None,
            };
            let ids = catalog.index.children(parent, MatchFlags::new());
            print(&catalog, &ids, &format, color)?;
        }
        Commands::Paths { leaves, format } => {
            let flags = if leaves {
                MatchFlags(MatchFlags::NO_BRANCH)
            } else {
                MatchFlags::new()
            };
            let mut ids = Vec::with_capacity(catalog.index.node_count());
            catalog
                .index
                .iterate::<(), _>(flags, None, HashFilter::Any, |id, _| {
                    ids.push(id);
                    ControlFlow::Continue(())
                });
            print(&catalog, &ids, &format, color)?;
        }
    }

    Ok(())
}

fn print(catalog: &Catalog, ids: &[NodeId], format: &FormatArgs, color: ColorChoice) -> Result<()> {
    let records = output::collect_records(&catalog.index, ids, catalog.delimiter);
    if format.json {
        output::print_json(&records)?;
    } else {
        output::print_records(&records, color, format.long)?;
    }
    Ok(())
}

/// Log to stderr, filtered by `PATHDEX_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env("PATHDEX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
