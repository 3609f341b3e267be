//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

use crate::client::ImageFormat;

pub mod args;
pub mod batch;
pub mod completions;
pub mod context;
pub mod file;
pub mod init;
pub mod node;
pub mod status;
pub mod variables;

pub use args::OutputFormat;
pub use context::CommandContext;

/// figcache - cached access to Figma design data
#[derive(Parser, Debug)]
#[command(name = "figcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "FIGCACHE_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "FIGCACHE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Figma file key to read from
    #[arg(long, global = true, env = "FIGMA_FILE_KEY", hide_env = true)]
    pub file_key: Option<String>,

    /// Figma access token
    #[arg(
        long,
        global = true,
        env = "FIGMA_TOKEN",
        hide_env = true,
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Custom API host (for testing against a local server)
    #[arg(long, global = true, env = "FIGCACHE_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "FIGCACHE_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass cache, fetch fresh data from API
    #[arg(long, global = true, env = "FIGCACHE_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize figcache configuration
    Init,

    /// Show configuration status
    Status,

    /// Read a single node
    #[command(subcommand)]
    Node(NodeCommands),

    /// Show file name, version and pages
    File,

    /// Show design variables
    Variables,

    /// Run a manifest of requests through one shared cache
    #[command(after_help = "\
Manifest format (YAML):
  concurrency: 4
  steps:
    - op: metadata
      node: \"1:2\"
    - op: screenshot
      node: \"1:2\"
      scale: 2
    - op: invalidate
      node: \"1:2\"
    - op: stats

Ops: metadata, screenshot, code, file, variables, invalidate, invalidate_all, stats")]
    Batch {
        /// Path to the YAML manifest
        manifest: PathBuf,
    },

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   figcache completion bash > /etc/bash_completion.d/figcache
  zsh:    figcache completion zsh > \"${fpath[1]}/_figcache\"
  fish:   figcache completion fish > ~/.config/fish/completions/figcache.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Node subcommands.
///
/// `NODE` is a node id (`123:456` or `123-456`) or a Figma URL with a
/// `node-id` parameter. A URL's file key takes precedence over the
/// configured one.
#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Show node metadata
    Get {
        /// Node id or Figma URL
        node: String,
    },

    /// Generate a React component for the node
    Code {
        /// Node id or Figma URL
        node: String,
    },

    /// Render the node to an image
    Screenshot {
        /// Node id or Figma URL
        node: String,

        /// Render scale (0.01 to 4)
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Image format
        #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
        image_format: ImageFormat,

        /// Download the image and embed it base64-encoded
        #[arg(long)]
        download: bool,
    },
}
