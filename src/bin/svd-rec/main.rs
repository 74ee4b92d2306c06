//! svd-rec - recommendations from precomputed SVD factors
//!
//! Usage:
//!   svd-rec products U123 -n 5         # top-5 products for a user
//!   svd-rec users P42                  # users sharing the product's cluster
//!   svd-rec list users --limit 20      # available user ids
//!   svd-rec info                       # model summary
//!   svd-rec shell                      # interactive lookups
//!
//! Artifacts are read from `--model-dir` (default: current directory) or the
//! paths in `--config`.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use svd_recommender::config::{StoreConfig, DEFAULT_CONFIG_FILE};
use svd_recommender::report::{render_products, render_users, OutputFormat};
use svd_recommender::ModelStore;
use tracing_subscriber::{fmt, EnvFilter};

mod error;
mod output;
mod shell;

use error::Result;

/// svd-rec - Product and user recommendations from SVD latent factors
#[derive(Parser)]
#[command(name = "svd-rec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = EXIT_CODES)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (artifact paths, limits)
    #[arg(long, global = true, env = "SVDREC_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the model artifacts
    #[arg(long, global = true, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Output format: table or json
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Top-N products for a user
    Products {
        /// User identifier
        user_id: String,

        /// Number of products (default from config)
        #[arg(short = 'n', long = "top-n")]
        top_n: Option<usize>,

        /// Include reconstructed scores in table output
        #[arg(long)]
        scores: bool,
    },

    /// Users in the same cluster as a product
    Users {
        /// Product identifier
        product_id: String,

        /// Number of users (default from config)
        #[arg(short = 'n', long = "top-n")]
        top_n: Option<usize>,
    },

    /// List available identifiers
    List {
        /// Which table to list
        #[arg(value_enum)]
        table: ListTable,

        /// Show at most this many ids
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show model summary
    Info,

    /// Interactive lookups on one loaded model
    Shell,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListTable {
    Users,
    Products,
}

const EXIT_CODES: &str = "\
Exit codes:
  0   success
  2   unknown user or product id
  3   top-N outside 1..=max_top_n
  4   model store could not be loaded
  5   invalid configuration
  6   output could not be written
  64  invalid command-line usage";

/// Exit code for argument errors, kept apart from the lookup codes.
const USAGE_EXIT_CODE: u8 = 64;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_exit(&e),
    };

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}

/// Prints clap's message; help and version are not failures.
fn usage_exit(e: &clap::Error) -> ExitCode {
    let _ = e.print();
    if e.use_stderr() {
        ExitCode::from(USAGE_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.model_dir.as_deref())?;
    let store = ModelStore::load(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let format = cli.format;

    match &cli.command {
        Commands::Products {
            user_id,
            top_n,
            scores,
        } => {
            let n = top_n.unwrap_or(store.limits().default_top_n);
            let recs = store.recommend_products(user_id, n)?;
            output::report(&mut out, &render_products(&recs, format, *scores)?, format)?;
        }
        Commands::Users { product_id, top_n } => {
            let n = top_n.unwrap_or(store.limits().default_top_n);
            let recs = store.recommend_users(product_id, n)?;
            output::report(&mut out, &render_users(&recs, format)?, format)?;
        }
        Commands::List { table, limit } => {
            let ids: Vec<String> = match table {
                ListTable::Users => store.user_ids().map(ToString::to_string).collect(),
                ListTable::Products => store.product_ids().map(ToString::to_string).collect(),
            };
            let shown = &ids[..limit.unwrap_or(ids.len()).min(ids.len())];
            match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(shown)?)?,
                OutputFormat::Table => {
                    for id in shown {
                        writeln!(out, "{id}")?;
                    }
                }
            }
        }
        Commands::Info => {
            let summary = store.summary();
            match format {
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
                }
                OutputFormat::Table => {
                    output::section(&mut out, "Model")?;
                    output::kv(&mut out, "Users", summary.users)?;
                    output::kv(&mut out, "Products", summary.products)?;
                    output::kv(&mut out, "Latent factors", summary.latent_dim)?;
                    output::kv(&mut out, "User clusters", summary.user_clusters)?;
                    output::kv(&mut out, "Product clusters", summary.product_clusters)?;
                    if summary.duplicate_users + summary.duplicate_products > 0 {
                        output::kv(
                            &mut out,
                            "Duplicate ids",
                            format!(
                                "{} users, {} products",
                                summary.duplicate_users, summary.duplicate_products
                            ),
                        )?;
                    }
                    let limits = store.limits();
                    output::kv(
                        &mut out,
                        "Top-N",
                        format!("default {}, max {}", limits.default_top_n, limits.max_top_n),
                    )?;
                }
            }
        }
        Commands::Shell => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            shell::run(&store, stdin.lock(), &mut out, format, interactive)?;
        }
    }
    Ok(())
}

/// Picks the config source: `--config`, then `svdrec.toml` in the model
/// directory, then defaults. `--model-dir` always overrides `base_dir`.
fn load_config(config: Option<&Path>, model_dir: Option<&Path>) -> Result<StoreConfig> {
    let dir = model_dir.unwrap_or_else(|| Path::new("."));
    let discovered = dir.join(DEFAULT_CONFIG_FILE);

    let mut store_config = match config {
        Some(path) => StoreConfig::from_file(path)?,
        None if discovered.is_file() => StoreConfig::from_file(&discovered)?,
        None => StoreConfig::default(),
    };
    if let Some(dir) = model_dir {
        store_config = store_config.with_base_dir(dir);
    }
    tracing::debug!(base_dir = ?store_config.base_dir, "config resolved");
    Ok(store_config)
}
