//! `kgquest`: build quest-generation prompt datasets from game knowledge graphs.
//!
//! ```text
//! kgquest [--config PATH] [--train-type MODE] [--depth N] [--seed S] <command>
//!
//!   prompts     --split <train|val> [--inference] --out PATH
//!   background  --split <train|val> --id ID
//!   dump        --results PATH
//! ```

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]

mod pipeline;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kgquest_core::dataset::Split;
use kgquest_core::{KgQuestConfig, TrainType};

#[derive(Parser, Debug)]
#[command(name = "kgquest", version, about = "KG-conditioned quest prompt builder")]
struct Cli {
    /// Path to the TOML configuration. Missing file means defaults.
    #[arg(long, global = true, default_value = "kgquest.toml")]
    config: PathBuf,

    /// Prompt mode: no_kg, text_kg or tree_kg.
    #[arg(long, global = true)]
    train_type: Option<TrainType>,

    /// Sampling and traversal depth.
    #[arg(long, global = true, allow_hyphen_values = true)]
    depth: Option<i32>,

    /// Seed for relation sampling.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble prompts for a dataset split and write them as JSONL.
    Prompts {
        #[arg(long)]
        split: Split,
        /// Emit inference samples (prompt plus expected output).
        #[arg(long)]
        inference: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the composed background for one example.
    Background {
        #[arg(long)]
        split: Split,
        #[arg(long)]
        id: String,
    },
    /// Re-render a results JSONL file as its text dump.
    Dump {
        #[arg(long)]
        results: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<KgQuestConfig> {
    let mut config = if cli.config.exists() {
        KgQuestConfig::from_file(&cli.config)
            .with_context(|| format!("reading {}", cli.config.display()))?
    } else {
        KgQuestConfig::default()
    };
    config.apply_env_overrides()?;
    if let Some(train_type) = cli.train_type {
        config.kg.train_type = train_type;
    }
    if let Some(depth) = cli.depth {
        config.kg.depth = depth;
    }
    if cli.seed.is_some() {
        config.kg.seed = cli.seed;
    }
    Ok(config)
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.general.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %config.kg.train_type,
        depth = config.kg.depth,
        "Starting kgquest"
    );

    let mut rng = pipeline::make_rng(config.kg.seed);
    match &cli.command {
        Command::Prompts { split, inference, out } => {
            let registry = pipeline::load_registry(&config)?;
            pipeline::write_prompts(&config, &registry, *split, !inference, out, &mut rng)?;
        }
        Command::Background { split, id } => {
            let registry = pipeline::load_graphs(&config)?;
            let text = pipeline::background_for(&config, &registry, *split, id, &mut rng)?;
            print!("{text}");
        }
        Command::Dump { results } => {
            let path = pipeline::dump_results(results)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
