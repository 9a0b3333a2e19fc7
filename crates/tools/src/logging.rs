use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::vars;

const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber filtered by `CHAINENV_LOG` (default `warn`).
pub fn init_logging() -> Result<()> {
    let filter_spec = resolve_filter_spec();
    let env_filter = EnvFilter::try_new(&filter_spec)
        .with_context(|| format!("invalid log filter: {filter_spec}"))?;

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to initialize tracing subscriber")?;
    Ok(())
}

fn resolve_filter_spec() -> String {
    std::env::var(vars::CHAINENV_LOG)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
