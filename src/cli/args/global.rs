//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. Clap resolves
/// the first two layers; [`GlobalOptions::apply_to`] lays them over a
/// loaded [`Config`].
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.figcache/config.yaml)
    pub config: Option<String>,

    /// Figma file key override
    pub file_key: Option<String>,

    /// Figma token override
    pub token: Option<String>,

    /// Custom API host for development/testing
    pub api_host: Option<String>,

    /// Bypass the cache and hit the API for every request
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            file_key: cli.file_key.clone(),
            token: cli.token.clone(),
            api_host: cli.api_host.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Overlay flag/env values on a config loaded from disk
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(file_key) = &self.file_key {
            config.file_key = Some(file_key.clone());
        }
        if let Some(host) = &self.api_host {
            config.api_host = Some(host.clone());
        }
    }
}
