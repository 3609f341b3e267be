//! figcache - cached access to Figma design data

use clap::Parser;
use colored::Colorize;

mod cache;
mod cli;
mod client;
mod codegen;
mod config;
mod error;
mod models;
mod output;

use cli::args::GlobalOptions;
use cli::{Cli, Commands, NodeCommands, OutputFormat};
use error::{Error, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);
    if let Err(err) = run(cli.command, &opts).await {
        report_error(&err, opts.format);
        std::process::exit(1);
    }
}

/// `RUST_LOG` sets the base filter; `--debug` raises this crate to debug.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("figcache", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn report_error(err: &Error, format: OutputFormat) {
    // A failed batch has already printed its own envelope
    if format == OutputFormat::Json && !matches!(err, Error::BatchFailed { .. }) {
        match output::json::format_json_error(&err.to_string()) {
            Ok(envelope) => println!("{}", envelope),
            Err(_) => eprintln!("Error: {}", err),
        }
        return;
    }
    eprintln!("{} {}", "Error:".red().bold(), err);
}

async fn run(command: Commands, opts: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Init => cli::init::run(opts).await,
        Commands::Status => cli::status::run(opts),
        Commands::Node(node_cmd) => match node_cmd {
            NodeCommands::Get { node } => cli::node::get(opts, &node).await,
            NodeCommands::Code { node } => cli::node::code(opts, &node).await,
            NodeCommands::Screenshot {
                node,
                scale,
                image_format,
                download,
            } => cli::node::screenshot(opts, &node, scale, image_format, download).await,
        },
        Commands::File => cli::file::run(opts).await,
        Commands::Variables => cli::variables::run(opts).await,
        Commands::Batch { manifest } => cli::batch::run(opts, &manifest).await,
        Commands::Completion { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    }
}
