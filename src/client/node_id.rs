//! Node id and Figma URL parsing
//!
//! Node ids appear as `123:456` in the API and as `123-456` in browser URLs.

use reqwest::Url;

use crate::error::{ConfigError, Result};

/// File key and optional node id extracted from a Figma URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigmaLocation {
    pub file_key: String,
    pub node_id: Option<String>,
}

/// URL path segments that are followed by a file key
const FILE_PATH_KINDS: [&str; 5] = ["file", "design", "proto", "board", "slides"];

/// Normalize a node id given as `123:456`, `123-456` or a Figma URL.
pub fn parse_node_id(input: &str) -> Result<String> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        return parse_figma_url(input)?.node_id.ok_or_else(|| {
            ConfigError::Invalid(format!("URL has no node-id parameter: {}", input)).into()
        });
    }

    normalize_node_id(input)
}

/// Extract the file key and node id from a Figma URL
pub fn parse_figma_url(input: &str) -> Result<FigmaLocation> {
    let url = Url::parse(input.trim())
        .map_err(|e| ConfigError::Invalid(format!("Invalid URL '{}': {}", input, e)))?;

    let host = url.host_str().unwrap_or_default();
    if host != "figma.com" && !host.ends_with(".figma.com") {
        return Err(ConfigError::Invalid(format!("Not a Figma URL: {}", input)).into());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let file_key = match segments.as_slice() {
        [kind, key, ..] if FILE_PATH_KINDS.contains(kind) => key.to_string(),
        _ => {
            return Err(
                ConfigError::Invalid(format!("No file key in Figma URL: {}", input)).into(),
            );
        }
    };

    let node_id = url
        .query_pairs()
        .find(|(k, _)| k == "node-id")
        .map(|(_, v)| normalize_node_id(&v))
        .transpose()?;

    Ok(FigmaLocation { file_key, node_id })
}

fn normalize_node_id(raw: &str) -> Result<String> {
    let id = if raw.contains(':') {
        raw.to_string()
    } else {
        raw.replacen('-', ":", 1)
    };

    let valid = !id.is_empty()
        && id.contains(':')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | ';' | '-'));

    if valid {
        Ok(id)
    } else {
        Err(ConfigError::Invalid(format!("Invalid node id: '{}'", raw)).into())
    }
}
