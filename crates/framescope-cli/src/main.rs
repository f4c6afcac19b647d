//! Framescope CLI - index key-frame features and look up captions by nearest
//! neighbour.
//!
//! `fsc build` assembles the aligned corpus from the raw sources and writes a
//! snapshot; every other command reads that snapshot.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use framescope_ops::{Config, Sources};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{build, config as config_cmd, inspect, query};

/// Framescope CLI - nearest-neighbour captions for video key frames.
#[derive(Parser, Debug)]
#[command(
    name = "fsc",
    author,
    version,
    about = "Framescope: key-frame feature index and caption lookup",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the raw sources, assemble the corpus and save a snapshot.
    Build {
        /// Root of the `<segment>/<NNNN>.<ext>` frame tree.
        #[arg(long)]
        frames: PathBuf,

        /// Caption database (JSON).
        #[arg(long)]
        captions: PathBuf,

        /// Directory of `<segment>.txt` key-frame lists.
        #[arg(long)]
        key_frames: PathBuf,

        /// Directory of `<segment>.txt` feature files.
        #[arg(long)]
        features: PathBuf,

        /// Keep raw vectors; cosine queries will warn until normalized.
        #[arg(long)]
        no_normalize: bool,

        /// Snapshot path (overrides config).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the captions of the k nearest corpus records.
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["vector", "vector_file", "segment"])
    ))]
    Query {
        /// Query vector as comma-separated numbers.
        #[arg(long, allow_hyphen_values = true)]
        vector: Option<String>,

        /// File whose first non-empty line is the query vector.
        #[arg(long)]
        vector_file: Option<PathBuf>,

        /// Use the stored feature of a segment's frame as the query.
        #[arg(long)]
        segment: Option<String>,

        /// Frame index within `--segment` (defaults to 0).
        #[arg(long, requires = "segment")]
        frame: Option<usize>,

        /// Metric: cosine or euclidean (defaults to config).
        #[arg(short, long)]
        metric: Option<String>,

        /// Number of neighbours (defaults to config).
        #[arg(short)]
        k: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show snapshot status and catalog counts.
    Status,

    /// List the key-frame paths of a segment.
    Frames {
        /// Segment name, e.g. `v_QOlSCBRmfWY0`.
        segment: String,
    },

    /// Print the key-frame feature vectors of a segment.
    Features {
        /// Segment name.
        segment: String,
    },

    /// Print the caption of a segment.
    Caption {
        /// Segment name.
        segment: String,
    },

    /// Export every loaded caption as a JSON array.
    Captions {
        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the snapshot.
    Clean,

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr);
    match EnvFilter::try_from_default_env() {
        Ok(filter) => subscriber.with_env_filter(filter).init(),
        Err(_) => subscriber.with_max_level(level).init(),
    }

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config = Config::load()?;

    match cli.command {
        Commands::Build {
            frames,
            captions,
            key_frames,
            features,
            no_normalize,
            output,
        } => {
            let sources = Sources {
                frames_dir: frames,
                captions_file: captions,
                key_frames_dir: key_frames,
                features_dir: features,
            };
            let snapshot = output.unwrap_or_else(|| config.snapshot_path.clone());
            build::execute(&config, &sources, &snapshot, !no_normalize)?;
        }

        Commands::Query {
            vector,
            vector_file,
            segment,
            frame,
            metric,
            k,
            json,
        } => {
            let source = match (vector, vector_file, segment) {
                (Some(text), _, _) => query::QuerySource::Inline(text),
                (_, Some(path), _) => query::QuerySource::File(path),
                (_, _, Some(segment)) => query::QuerySource::Stored {
                    segment,
                    frame: frame.unwrap_or(0),
                },
                (None, None, None) => anyhow::bail!("a query vector source is required"),
            };
            let metric = match metric {
                Some(name) => name.parse().map_err(anyhow::Error::msg)?,
                None => config.default_metric,
            };
            let k = k.unwrap_or(config.default_top_k);
            query::execute(&config, &source, metric, k, json)?;
        }

        Commands::Status => inspect::status(&config)?,
        Commands::Frames { segment } => inspect::frames(&config, &segment)?,
        Commands::Features { segment } => inspect::features(&config, &segment)?,
        Commands::Caption { segment } => inspect::caption(&config, &segment)?,
        Commands::Captions { output } => inspect::captions(&config, output.as_deref())?,
        Commands::Clean => inspect::clean(&config)?,

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => config_cmd::show(&config)?,
                ConfigCommands::Set { key, value } => config_cmd::set(&mut config, &key, &value)?,
                ConfigCommands::Get { key } => config_cmd::get(&config, &key)?,
                ConfigCommands::Reset => config_cmd::reset()?,
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
