pub mod config;

use std::path::Path;

use clap::{Parser, Subcommand};

/// credex: session coordination for attribute-based credential exchange.
#[derive(Debug, Parser)]
#[command(name = "credex", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the session registry and expiry sweeper (default when no
    /// subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `CX_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: cx_domain::config::Config
pub fn load_config() -> anyhow::Result<(cx_domain::config::Config, String)> {
    let config_path = std::env::var("CX_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(Path::new(&config_path))?;
    Ok((config, config_path))
}

/// Parse the config at `path`, or return defaults when the file does not
/// exist.
pub fn load_config_from(path: &Path) -> anyhow::Result<cx_domain::config::Config> {
    if !path.exists() {
        return Ok(cx_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}
