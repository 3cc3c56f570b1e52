use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use keyscope_core::{CheckKind, KeyscopeConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

const DEFAULT_CONFIG: &str = "keyscope.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "keyscope",
    version,
    about = "Probe the CRUD permissions an API key holds on a REST data service"
)]
struct Cli {
    /// Path to the configuration file. Defaults to ./keyscope.yaml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project base URL, e.g. https://xyz.supabase.co
    #[arg(long, env = "KEYSCOPE_URL", global = true)]
    url: Option<String>,

    /// API key to probe.
    #[arg(long, env = "KEYSCOPE_API_KEY", global = true, hide_env_values = true)]
    key: Option<String>,

    /// Log request-level detail.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tables the schema endpoint describes.
    Schema,

    /// Attempt insert, read, update and delete on every table and report the outcome.
    Probe {
        /// Only probe this table (repeatable).
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Never probe this table (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Do not attempt this check (repeatable): insert, read, update, delete.
        #[arg(long)]
        skip: Vec<CheckKind>,

        /// Seed for generated records.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the record an insert probe would send to a table, without sending it.
    Sample {
        #[arg(long)]
        table: String,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, cli.url, cli.key);

    match cli.cmd {
        Command::Schema => commands::schema::run(config).await?,

        Command::Probe {
            tables,
            exclude,
            skip,
            seed,
            format,
        } => {
            config.probe.include.extend(tables);
            config.probe.exclude.extend(exclude);
            config.probe.skip.extend(skip);
            if seed.is_some() {
                config.probe.seed = seed;
            }
            commands::probe::run(config, format).await?
        }

        Command::Sample { table, seed } => {
            if seed.is_some() {
                config.probe.seed = seed;
            }
            commands::sample::run(config, &table).await?
        }
    }

    Ok(())
}

/// Load the explicit config file, or `./keyscope.yaml` if it exists.
fn load_config(path: Option<&Path>) -> anyhow::Result<KeyscopeConfig> {
    match path {
        Some(path) => KeyscopeConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                KeyscopeConfig::load(default).context("Failed to load ./keyscope.yaml")
            } else {
                Ok(KeyscopeConfig::default())
            }
        }
    }
}

/// Command-line values win over the file. A key given here replaces any
/// `api_key_env` indirection.
fn apply_overrides(config: &mut KeyscopeConfig, url: Option<String>, key: Option<String>) {
    if let Some(url) = url {
        config.service.url = Some(url);
    }
    if let Some(key) = key {
        config.service.api_key = Some(key);
        config.service.api_key_env = None;
    }
}
