//! repomerge - canonicalize, deduplicate, and token-chunk scraped
//! repository metadata.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use repomerge_config::PipelineConfig;
use repomerge_engine::{
    RunPlan, TokenBudget, TokenCounter, TokenEncoding, filter_file, load_dirty_list, merge_files,
    reconcile_file, run, split_file,
};

#[derive(Parser, Debug)]
#[command(name = "repomerge", version, about)]
struct Cli {
    /// TOML config file (defaults to ./repomerge.toml, then ~/.repomerge/config.toml)
    #[arg(long, global = true, env = "REPOMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum estimated tokens per chunk file
    #[arg(long, global = true)]
    budget: Option<u32>,

    /// Tokenizer used for estimates (cl100k_base, o200k_base)
    #[arg(long, global = true)]
    encoding: Option<TokenEncoding>,

    /// Reference instant for relative dates (RFC 3339; defaults to now)
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate every JSON file in a directory into one array
    Merge {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Canonicalize and deduplicate records, keeping the latest per repo
    Reconcile {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drop repositories named in a dirty list
    Filter {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        dirty_list: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Pack a JSON array or object into token-bounded chunk files
    Split {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        prefix: Option<PathBuf>,
    },
    /// Merge, reconcile, filter, and split in one pass
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long)]
    merge_input: Option<PathBuf>,
    #[arg(long)]
    dirty_list: Option<PathBuf>,
    #[arg(long)]
    prefix: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn set(slot: &mut Option<PathBuf>, value: Option<PathBuf>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Layer command-line flags over the file and environment configuration.
fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    if let Some(tokens) = cli.budget {
        config.token_budget = TokenBudget::new(tokens).context("invalid --budget")?;
    }
    if let Some(encoding) = cli.encoding {
        config.token_encoding = encoding;
    }
    if cli.now.is_some() {
        config.now = cli.now;
    }

    match &cli.command {
        Command::Merge { input, output } => {
            set(&mut config.merge_input, input.clone());
            set(&mut config.merge_output, output.clone());
        }
        Command::Reconcile { input, output } => {
            set(&mut config.reconcile_input, input.clone());
            set(&mut config.reconcile_output, output.clone());
        }
        Command::Filter {
            input,
            dirty_list,
            output,
        } => {
            set(&mut config.filtered_input, input.clone());
            set(&mut config.dirty_list, dirty_list.clone());
            set(&mut config.filtered_output, output.clone());
        }
        Command::Split { input, prefix } => {
            set(&mut config.split_input, input.clone());
            set(&mut config.split_prefix, prefix.clone());
        }
        Command::Run(args) => {
            set(&mut config.merge_input, args.merge_input.clone());
            set(&mut config.dirty_list, args.dirty_list.clone());
            set(&mut config.split_prefix, args.prefix.clone());
        }
    }

    Ok(config)
}

fn print_chunks<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        println!("{}", path.display());
    }
}

fn main() -> Result<()> {
    // A missing .env is the common case.
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = resolve_config(&cli).context("failed to resolve configuration")?;
    let now = config.now.unwrap_or_else(Utc::now);
    tracing::debug!(?config, %now, "Resolved configuration");

    match &cli.command {
        Command::Merge { .. } => {
            merge_files(config.merge_input()?, config.merge_output()?)?;
        }
        Command::Reconcile { .. } => {
            reconcile_file(config.reconcile_input()?, config.reconcile_output()?, now)?;
        }
        Command::Filter { .. } => {
            let dirty = load_dirty_list(config.dirty_list()?)?;
            filter_file(config.filtered_input()?, &dirty, config.filtered_output()?)?;
        }
        Command::Split { .. } => {
            let counter = TokenCounter::with_encoding(config.token_encoding);
            let chunks = split_file(
                config.split_input()?,
                config.split_prefix(),
                config.token_budget,
                &counter,
            )?;
            print_chunks(chunks.iter().map(|chunk| chunk.path.as_path()));
        }
        Command::Run(_) => {
            let plan = RunPlan::from_config(&config)?;
            let summary = run(&plan, now)?;
            print_chunks(summary.chunks.iter().map(|chunk| chunk.path.as_path()));
        }
    }

    Ok(())
}
