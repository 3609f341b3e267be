//! File command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::PageDisplay;
use crate::output::{Formattable, json, table};

/// Run the file command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let file = ctx.client.get_file().await?;
    let pages: Vec<PageDisplay> = file.pages.iter().map(PageDisplay::from).collect();

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&file)?),
        OutputFormat::Table => pages.print(ctx.format)?,
        OutputFormat::Pretty => {
            println!("{}", file.name.bold());
            println!("  Key: {}", file.key.cyan());
            println!("  Last modified: {}", file.last_modified);
            if let Some(version) = file.version.as_deref() {
                println!("  Version: {}", version);
            }
            if let Some(editor) = file.editor_type.as_deref() {
                println!("  Editor: {}", editor);
            }
            println!();
            println!("{}", table::format_table(&pages));
        }
    }

    ctx.shutdown().await;
    Ok(())
}
