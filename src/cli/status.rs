//! Status command implementation

use colored::Colorize;
use serde::Serialize;

use crate::cache::TtlPolicy;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::{Config, TokenKind};
use crate::error::Result;
use crate::output::json;

/// Effective configuration after flag/env overrides
#[derive(Debug, Serialize)]
struct StatusReport {
    config_path: String,
    config_found: bool,
    token_configured: bool,
    token_kind: TokenKind,
    file_key: Option<String>,
    api_host: Option<String>,
    cache_enabled: bool,
    ttl_minutes: TtlMinutes,
    sweep_interval_secs: u64,
}

#[derive(Debug, Serialize)]
struct TtlMinutes {
    default: u64,
    metadata: u64,
    file: u64,
    screenshot: u64,
    variables: u64,
}

impl StatusReport {
    fn build(opts: &GlobalOptions) -> Result<Self> {
        let path = Config::resolve_path(opts.config_ref())?;
        let config_found = path.exists();

        let mut config = Config::load_or_default_at(opts.config_ref())?;
        opts.apply_to(&mut config);

        let ttl = TtlPolicy::from(&config.cache);
        let minutes = |d: std::time::Duration| d.as_secs() / 60;

        Ok(Self {
            config_path: path.display().to_string(),
            config_found,
            token_configured: config.require_token().is_ok(),
            token_kind: config.token_kind,
            file_key: config.file_key.clone(),
            api_host: config.api_host.clone(),
            cache_enabled: !opts.no_cache,
            ttl_minutes: TtlMinutes {
                default: config.cache.default_ttl_minutes,
                metadata: minutes(ttl.metadata),
                file: minutes(ttl.file),
                screenshot: minutes(ttl.screenshot),
                variables: minutes(ttl.variables),
            },
            sweep_interval_secs: config.cache.sweep_interval_secs,
        })
    }
}

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let report = StatusReport::build(opts)?;

    if opts.format == OutputFormat::Json {
        println!("{}", json::format_json(&report)?);
        return Ok(());
    }

    println!("{}\n", "figcache Configuration Status".bold());

    if report.config_found {
        println!("Config file: {}", report.config_path.cyan());
    } else {
        println!(
            "{} Configuration file not found ({})",
            "○".dimmed(),
            report.config_path
        );
    }
    println!();

    if report.token_configured {
        let kind = match report.token_kind {
            TokenKind::Personal => "personal access token",
            TokenKind::Oauth => "OAuth token",
        };
        println!("{} Token configured ({})", "✓".green(), kind);
    } else {
        println!("{} Token not configured", "✗".red());
        println!("  → Run 'figcache init' or set FIGMA_TOKEN");
    }

    match report.file_key.as_deref() {
        Some(key) => println!("{} File key: {}", "✓".green(), key),
        None => {
            println!("{} No file key set", "✗".red());
            println!("  → Pass --file-key or set FIGMA_FILE_KEY");
        }
    }

    if let Some(host) = report.api_host.as_deref() {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }

    println!();
    if report.cache_enabled {
        let ttl = &report.ttl_minutes;
        println!(
            "Cache TTLs (min): metadata {}, file {}, screenshot {}, variables {}, default {}",
            ttl.metadata, ttl.file, ttl.screenshot, ttl.variables, ttl.default
        );
        println!("Sweep interval: {}s", report.sweep_interval_secs);
    } else {
        println!("{} Cache disabled (--no-cache)", "⚠".yellow());
    }
    println!();

    Ok(())
}
