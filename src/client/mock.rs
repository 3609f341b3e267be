//! Mock Figma API client for testing
//!
//! Serves canned nodes and files without network access and counts calls
//! so tests can tell cache hits from upstream fetches.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{FileInfo, ImageOptions, NodeMetadata};
use super::FigmaApi;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockFigmaClient::new().with_node(node("1:2", "Hero")).await;
/// let node = mock.get_node("KEY", "1:2").await?;
/// ```
pub struct MockFigmaClient {
    /// Nodes returned by get_node, keyed by id
    nodes: Arc<Mutex<HashMap<String, NodeMetadata>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

impl Default for MockFigmaClient {
    fn default() -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub get_node: usize,
    pub get_file: usize,
    pub render_image: usize,
    pub download_image: usize,
}

/// Build a minimal node for tests
pub fn node(id: &str, name: &str) -> NodeMetadata {
    NodeMetadata {
        id: id.to_string(),
        name: name.to_string(),
        node_type: "FRAME".to_string(),
        visible: true,
        bounds: None,
        fills: Vec::new(),
        corner_radius: None,
        text: None,
        font: None,
        children: Vec::new(),
    }
}

impl MockFigmaClient {
    /// Create a new mock client with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node returned by get_node.
    pub async fn with_node(self, node: NodeMetadata) -> Self {
        self.nodes.lock().await.insert(node.id.clone(), node);
        self
    }

    /// Fail the next API call with `error`.
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl FigmaApi for MockFigmaClient {
    async fn get_node(&self, file_key: &str, node_id: &str) -> Result<NodeMetadata> {
        self.call_count.lock().await.get_node += 1;
        self.check_error().await?;

        self.nodes
            .lock()
            .await
            .get(node_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!("Node {} not found in file {}", node_id, file_key))
                    .into()
            })
    }

    async fn get_file(&self, file_key: &str) -> Result<FileInfo> {
        self.call_count.lock().await.get_file += 1;
        self.check_error().await?;

        Ok(FileInfo {
            key: file_key.to_string(),
            name: "Mock File".to_string(),
            last_modified: "2024-01-01T00:00:00Z".to_string(),
            version: None,
            thumbnail_url: None,
            editor_type: None,
            pages: Vec::new(),
        })
    }

    async fn render_image(
        &self,
        _file_key: &str,
        node_id: &str,
        options: &ImageOptions,
    ) -> Result<String> {
        self.call_count.lock().await.render_image += 1;
        self.check_error().await?;

        Ok(format!(
            "https://images.example.com/{}@{}x.{}",
            node_id.replace(':', "-"),
            options.scale,
            options.format
        ))
    }

    async fn download_image(&self, _url: &str) -> Result<Vec<u8>> {
        self.call_count.lock().await.download_image += 1;
        self.check_error().await?;

        Ok(b"\x89PNG".to_vec())
    }
}
