//! Variables command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::VariableDisplay;
use crate::output::{Formattable, json};

/// Run the variables command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let table = ctx.client.get_design_variables().await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&table)?),
        OutputFormat::Table | OutputFormat::Pretty => {
            if ctx.format == OutputFormat::Pretty {
                println!(
                    "{} {}",
                    "Design variables".bold(),
                    format!("(source: {})", table.source).dimmed()
                );
            }
            let rows: Vec<VariableDisplay> =
                table.variables.iter().map(VariableDisplay::from).collect();
            rows.print(ctx.format)?;
        }
    }

    ctx.shutdown().await;
    Ok(())
}
