//! Figma API response models
//!
//! `Raw*` types mirror the Figma REST payloads and are only used while
//! parsing. Everything else is the provider-agnostic shape returned to
//! callers and stored in the cache.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Provider-agnostic models
// ============================================================================

/// Metadata for a single design node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub id: String,
    pub name: String,
    /// Figma node type (FRAME, TEXT, RECTANGLE, ...)
    #[serde(rename = "type")]
    pub node_type: String,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Text content for TEXT nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeMetadata>,
}

impl NodeMetadata {
    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeMetadata::node_count).sum::<usize>()
    }
}

/// Absolute bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Solid fill colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// `#RRGGBB`
    pub color: String,
    /// Combined colour alpha and paint opacity, 0.0 - 1.0
    pub opacity: f64,
}

/// Text style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub weight: u32,
}

/// File-level information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub key: String,
    pub name: String,
    pub last_modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_type: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageSummary>,
}

/// Top-level page (canvas) of a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub name: String,
}

/// Image formats the render endpoint supports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for rendering a node to an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub scale: f64,
    pub format: ImageFormat,
    /// Download the image and embed it base64-encoded
    #[serde(default)]
    pub embed: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            format: ImageFormat::Png,
            embed: false,
        }
    }
}

/// Rendered image for a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub node_id: String,
    pub url: String,
    pub format: ImageFormat,
    pub scale: f64,
    /// Base64 image bytes when embedding was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Design token table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    /// Where the values came from ("static" for the built-in table)
    pub source: String,
    pub variables: Vec<DesignVariable>,
}

/// A single design token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignVariable {
    pub name: String,
    pub category: String,
    pub value: String,
}

/// Code generated from a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeResult {
    pub node_id: String,
    pub component_name: String,
    pub framework: String,
    pub code: String,
}

// ============================================================================
// Raw Figma payloads
// ============================================================================

/// GET /v1/files/:key/nodes
#[derive(Debug, Deserialize)]
pub struct RawNodesResponse {
    #[serde(default)]
    pub nodes: HashMap<String, Option<RawNodeEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct RawNodeEntry {
    pub document: RawNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub absolute_bounding_box: Option<Bounds>,
    #[serde(default)]
    pub fills: Vec<RawPaint>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub style: Option<RawTypeStyle>,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RawPaint {
    #[serde(rename = "type")]
    pub paint_type: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub color: Option<RawColor>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl RawColor {
    /// `#RRGGBB`, channels clamped to 0..=255
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTypeStyle {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: Option<f64>,
}

impl From<RawNode> for NodeMetadata {
    fn from(raw: RawNode) -> Self {
        let fills = raw
            .fills
            .iter()
            .filter(|p| p.visible && p.paint_type == "SOLID")
            .filter_map(|p| {
                p.color.map(|c| Fill {
                    color: c.to_hex(),
                    opacity: c.a * p.opacity.unwrap_or(1.0),
                })
            })
            .collect();

        let font = raw.style.and_then(|s| {
            Some(Font {
                family: s.font_family?,
                size: s.font_size.unwrap_or(16.0),
                weight: s.font_weight.map(|w| w.round() as u32).unwrap_or(400),
            })
        });

        Self {
            id: raw.id,
            name: raw.name,
            node_type: raw.node_type,
            visible: raw.visible,
            bounds: raw.absolute_bounding_box,
            fills,
            corner_radius: raw.corner_radius,
            text: raw.characters,
            font,
            children: raw.children.into_iter().map(NodeMetadata::from).collect(),
        }
    }
}

/// GET /v1/files/:key?depth=1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFileResponse {
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub editor_type: Option<String>,
    #[serde(default)]
    pub document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub children: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub id: String,
    pub name: String,
}

impl RawFileResponse {
    pub fn into_file_info(self, key: &str) -> FileInfo {
        FileInfo {
            key: key.to_string(),
            name: self.name,
            last_modified: self.last_modified,
            version: self.version,
            thumbnail_url: self.thumbnail_url,
            editor_type: self.editor_type,
            pages: self
                .document
                .map(|d| {
                    d.children
                        .into_iter()
                        .map(|p| PageSummary {
                            id: p.id,
                            name: p.name,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// GET /v1/images/:key
#[derive(Debug, Deserialize)]
pub struct RawImagesResponse {
    #[serde(default)]
    pub err: Option<String>,
    #[serde(default)]
    pub images: HashMap<String, Option<String>>,
}
