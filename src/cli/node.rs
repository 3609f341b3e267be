//! Node command implementations

use base64::{Engine as _, engine::general_purpose};
use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{
    ImageFormat, ImageOptions, ImageResult, NodeMetadata, parse_figma_url, parse_node_id,
};
use crate::error::{ConfigError, Result};
use crate::models::NodeDisplay;
use crate::output::{Formattable, json, table};

/// A node id, plus the file key when the node was given as a URL
#[derive(Debug, PartialEq, Eq)]
struct NodeTarget {
    file_key: Option<String>,
    node_id: String,
}

fn resolve_target(input: &str) -> Result<NodeTarget> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        let location = parse_figma_url(input)?;
        let node_id = location.node_id.ok_or_else(|| {
            ConfigError::Invalid(format!("URL has no node-id parameter: {}", input))
        })?;
        return Ok(NodeTarget {
            file_key: Some(location.file_key),
            node_id,
        });
    }

    Ok(NodeTarget {
        file_key: None,
        node_id: parse_node_id(input)?,
    })
}

/// Run the node get command
pub async fn get(opts: &GlobalOptions, node: &str) -> Result<()> {
    let target = resolve_target(node)?;
    let ctx = CommandContext::for_file(opts, target.file_key.as_deref()).await?;

    let metadata = ctx.client.get_node_metadata(&target.node_id).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&metadata)?),
        OutputFormat::Table => NodeDisplay::rows(&metadata).print(ctx.format)?,
        OutputFormat::Pretty => print_node(&metadata),
    }

    ctx.shutdown().await;
    Ok(())
}

fn print_node(node: &NodeMetadata) {
    println!("{} {}", node.name.bold(), node.node_type.dimmed());
    println!("  ID: {}", node.id.cyan());

    if let Some(b) = node.bounds.as_ref() {
        println!(
            "  Size: {}×{} at ({}, {})",
            b.width.round(),
            b.height.round(),
            b.x.round(),
            b.y.round()
        );
    }
    if let Some(fill) = node.fills.first() {
        println!("  Fill: {}", fill.color);
    }
    if let Some(text) = node.text.as_deref() {
        println!("  Text: \"{}\"", text);
    }
    if !node.visible {
        println!("  {}", "hidden".yellow());
    }
    println!("  Nodes in subtree: {}", node.node_count());

    if !node.children.is_empty() {
        println!();
        let rows: Vec<NodeDisplay> = node.children.iter().map(NodeDisplay::from).collect();
        println!("{}", table::format_table(&rows));
    }
}

/// Run the node code command
pub async fn code(opts: &GlobalOptions, node: &str) -> Result<()> {
    let target = resolve_target(node)?;
    let ctx = CommandContext::for_file(opts, target.file_key.as_deref()).await?;

    let result = ctx.client.generate_code(&target.node_id).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&result)?),
        OutputFormat::Table => print!("{}", result.code),
        OutputFormat::Pretty => {
            println!(
                "{}",
                format!("// {} ({})", result.component_name, result.node_id).dimmed()
            );
            print!("{}", result.code);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

/// Run the node screenshot command
pub async fn screenshot(
    opts: &GlobalOptions,
    node: &str,
    scale: f64,
    format: ImageFormat,
    download: bool,
) -> Result<()> {
    let target = resolve_target(node)?;
    let ctx = CommandContext::for_file(opts, target.file_key.as_deref()).await?;

    let options = ImageOptions {
        scale,
        format,
        embed: download,
    };
    let image = ctx
        .client
        .get_node_screenshot(&target.node_id, &options)
        .await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&image)?),
        OutputFormat::Table => {
            let mut fields = vec![
                ("Node", image.node_id.clone()),
                ("Format", image.format.to_string()),
                ("Scale", image.scale.to_string()),
                ("URL", image.url.clone()),
            ];
            if let Some(size) = embedded_size(&image) {
                fields.push(("Embedded bytes", size.to_string()));
            }
            println!("{}", table::format_record(&fields));
        }
        OutputFormat::Pretty => {
            println!(
                "{} Rendered {} as {} @{}x",
                "✓".green(),
                image.node_id.bold(),
                image.format,
                image.scale
            );
            println!("  URL: {}", image.url.cyan());
            if let Some(size) = embedded_size(&image) {
                println!("  Embedded: {} bytes ({})", size, image.format.mime_type());
            }
        }
    }

    ctx.shutdown().await;
    Ok(())
}

fn embedded_size(image: &ImageResult) -> Option<usize> {
    let data = image.data.as_deref()?;
    general_purpose::STANDARD
        .decode(data)
        .map(|bytes| bytes.len())
        .ok()
}
