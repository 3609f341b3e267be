//! Command execution context
//!
//! Loads config, applies overrides and builds the cached Figma client, so
//! handlers start from a ready-to-use client.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CachedFigmaClient, MemoryCache, Sweeper, TtlPolicy};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::FigmaClient;
use crate::config::Config;
use crate::error::Result;

/// Context for command execution containing the client and runtime options.
pub struct CommandContext {
    /// Cached API client (Arc-wrapped for concurrent batch steps)
    pub client: Arc<CachedFigmaClient<FigmaClient>>,
    /// Output format preference
    pub format: OutputFormat,
    /// Background sweep, absent with `--no-cache`
    sweeper: Option<Sweeper>,
}

impl CommandContext {
    /// Create a context for the configured file.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded or the token or file key
    /// is missing.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        Self::for_file(opts, None).await
    }

    /// Create a context, letting `file_key` (from a Figma URL or a batch
    /// manifest) replace the configured file key.
    pub async fn for_file(opts: &GlobalOptions, file_key: Option<&str>) -> Result<Self> {
        let mut config = Config::load_or_default_at(opts.config_ref())?;
        opts.apply_to(&mut config);

        if let Some(key) = file_key {
            log::debug!("Using file key {} from input", key);
            config.file_key = Some(key.to_string());
        }

        config.validate()?;
        let token = config.require_token()?.to_string();
        let file_key = config.require_file_key()?.to_string();

        let raw_client = FigmaClient::with_host(token, config.token_kind, config.api_host.clone())?;
        let ttl = TtlPolicy::from(&config.cache);

        // Wrap with caching layer (disabled if --no-cache)
        let (cache, sweeper) = if opts.no_cache {
            log::debug!("Cache disabled");
            (None, None)
        } else {
            let cache = Arc::new(MemoryCache::<Value>::new(config.cache.default_ttl()));
            let sweeper = Sweeper::spawn(cache.clone(), config.cache.sweep_interval());
            (Some(cache), Some(sweeper))
        };

        let client = Arc::new(CachedFigmaClient::new(raw_client, file_key, cache, ttl));

        Ok(Self {
            client,
            format: opts.format,
            sweeper,
        })
    }

    /// Stop background work before the command returns
    pub async fn shutdown(self) {
        if let Some(sweeper) = self.sweeper {
            sweeper.stop().await;
        }
    }
}
