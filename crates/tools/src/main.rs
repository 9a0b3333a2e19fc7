use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use num_bigint::BigUint;

use chainenv_tools::logging::init_logging;
use chainenv_tools::{Address, LayeredEnv, ProcessEnv, Recorder, Resolver, ToolchainConfig};

#[derive(Parser)]
#[command(name = "chainenv")]
#[command(about = "Resolve toolchain configuration and record deployment values")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    String,
    Address,
    Integer,
    BigInteger,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved toolchain configuration
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Directory holding the .env.<APP_ENV> files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Resolve a single variable
    Get {
        name: String,
        /// Expected value type
        #[arg(short, long, value_enum, default_value = "string")]
        kind: Kind,
        /// Value used when the variable is unset or empty
        #[arg(long)]
        default: Option<String>,
        /// Directory holding the .env.<APP_ENV> files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Record a value to .env.<APP_ENV>.<suffix>
    Record {
        /// File suffix
        #[arg(short, long)]
        suffix: String,
        key: String,
        value: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn get(name: &str, kind: Kind, default: Option<String>, dir: PathBuf) -> Result<String> {
    let source = LayeredEnv::for_app_env(ProcessEnv, &dir)
        .with_context(|| format!("loading dotenv files from {}", dir.display()))?;
    let resolver = Resolver::new(source);

    let value = match kind {
        Kind::String => resolver.string(name, default.as_deref())?,
        Kind::Address => {
            let default = default
                .map(|d| d.parse::<Address>())
                .transpose()
                .context("default is not an address")?;
            resolver.address(name, default)?.to_string()
        }
        Kind::Integer => {
            let default = default
                .map(|d| d.parse::<u64>())
                .transpose()
                .context("default is not an integer")?;
            resolver.integer(name, default)?.to_string()
        }
        Kind::BigInteger => {
            let default = default
                .map(|d| d.parse::<BigUint>())
                .transpose()
                .context("default is not an integer")?;
            resolver.big_integer(name, default)?.to_string()
        }
    };
    Ok(value)
}

fn main() -> Result<()> {
    // Load .env file if it exists (non-fatal)
    let _ = dotenvy::dotenv();
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { json, dir } => {
            let config = ToolchainConfig::load(&dir).context("resolving toolchain configuration")?;
            if json {
                println!("{}", config.to_json()?);
            } else {
                config.print_summary();
            }
            Ok(())
        }
        Commands::Get {
            name,
            kind,
            default,
            dir,
        } => {
            println!("{}", get(&name, kind, default, dir)?);
            Ok(())
        }
        Commands::Record {
            suffix,
            key,
            value,
            dir,
        } => {
            let mut recorder = Recorder::with_source(&ProcessEnv, &dir, &suffix)?;
            recorder
                .set(&key, value)
                .with_context(|| format!("writing {}", recorder.path().display()))?;
            println!("{}", recorder.path().display());
            Ok(())
        }
    }
}
