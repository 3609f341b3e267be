//! Figma API client

use async_trait::async_trait;

use crate::error::Result;

pub mod figma;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod node_id;
pub mod variables;

pub use figma::FigmaClient;
#[cfg(test)]
pub use mock::MockFigmaClient;
pub use models::{
    CodeResult, FileInfo, ImageFormat, ImageOptions, ImageResult, NodeMetadata, VariableTable,
};
pub use node_id::{parse_figma_url, parse_node_id};

/// Figma REST API operations the cache fronts
#[async_trait]
pub trait FigmaApi: Send + Sync {
    /// Fetch a node and its subtree
    async fn get_node(&self, file_key: &str, node_id: &str) -> Result<NodeMetadata>;

    /// Fetch file-level info (name, version, pages)
    async fn get_file(&self, file_key: &str) -> Result<FileInfo>;

    /// Render a node and return the image URL
    async fn render_image(
        &self,
        file_key: &str,
        node_id: &str,
        options: &ImageOptions,
    ) -> Result<String>;

    /// Download the bytes behind a rendered image URL
    async fn download_image(&self, url: &str) -> Result<Vec<u8>>;
}
