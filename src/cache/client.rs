//! Cached wrapper for the Figma API client
//!
//! Each logical request is routed through [`MemoryCache::wrap`] with the TTL
//! for its resource type. Values are stored as JSON so one cache can hold
//! every resource shape.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::cache::{CacheStats, MemoryCache, ResourceKind, TtlPolicy, cache_key};
use crate::client::variables::builtin_variables;
use crate::client::{
    CodeResult, FigmaApi, FileInfo, ImageOptions, ImageResult, NodeMetadata, VariableTable,
};
use crate::codegen;
use crate::error::{ConfigError, Result};

/// Cached wrapper for any FigmaApi implementation.
///
/// Cache can be disabled by passing `None` (for `--no-cache`), in which
/// case every call goes straight to the inner client.
pub struct CachedFigmaClient<C: FigmaApi> {
    inner: Arc<C>,
    cache: Option<Arc<MemoryCache<Value>>>,
    file_key: String,
    ttl: TtlPolicy,
}

impl<C: FigmaApi> CachedFigmaClient<C> {
    /// Create a new cached client wrapper.
    ///
    /// # Arguments
    /// * `inner` - The underlying API client to wrap
    /// * `file_key` - Figma file every request targets
    /// * `cache` - Shared cache, or `None` to bypass caching
    /// * `ttl` - Per-resource TTLs
    pub fn new(
        inner: C,
        file_key: impl Into<String>,
        cache: Option<Arc<MemoryCache<Value>>>,
        ttl: TtlPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(inner),
            cache,
            file_key: file_key.into(),
            ttl,
        }
    }

    /// The file key requests are made against
    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    /// The wrapped client
    #[cfg(test)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Run `fetch` through the cache under `key`
    async fn cached<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(cache) = self.cache.as_ref() else {
            return fetch().await;
        };

        let value = cache
            .wrap(key, Some(ttl), || async move {
                let fresh = fetch().await?;
                Ok::<_, crate::error::Error>(serde_json::to_value(&fresh)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Metadata for a node, cached for the metadata TTL
    pub async fn get_node_metadata(&self, node_id: &str) -> Result<NodeMetadata> {
        let key = cache_key(ResourceKind::Metadata, node_id, &[]);
        self.cached(&key, self.ttl.metadata, || {
            self.inner.get_node(&self.file_key, node_id)
        })
        .await
    }

    /// File-level info, cached for the file TTL
    pub async fn get_file(&self) -> Result<FileInfo> {
        let key = cache_key(ResourceKind::File, &self.file_key, &[]);
        self.cached(&key, self.ttl.file, || self.inner.get_file(&self.file_key))
            .await
    }

    /// Rendered image for a node, cached per scale/format for the screenshot TTL
    pub async fn get_node_screenshot(
        &self,
        node_id: &str,
        options: &ImageOptions,
    ) -> Result<ImageResult> {
        let scale = options.scale.to_string();
        let mut params = vec![("scale", scale.as_str()), ("format", options.format.as_str())];
        if options.embed {
            params.push(("embed", "true"));
        }
        let key = cache_key(ResourceKind::Screenshot, node_id, &params);

        self.cached(&key, self.ttl.screenshot, || async {
            let url = self
                .inner
                .render_image(&self.file_key, node_id, options)
                .await?;

            let data = if options.embed {
                let bytes = self.inner.download_image(&url).await?;
                Some(general_purpose::STANDARD.encode(bytes))
            } else {
                None
            };

            Ok(ImageResult {
                node_id: node_id.to_string(),
                url,
                format: options.format,
                scale: options.scale,
                data,
            })
        })
        .await
    }

    /// Design variable table, cached for the variables TTL
    pub async fn get_design_variables(&self) -> Result<VariableTable> {
        let key = cache_key(ResourceKind::Variables, &self.file_key, &[]);
        self.cached(&key, self.ttl.variables, || async { Ok(builtin_variables()) })
            .await
    }

    /// React code for a node.
    ///
    /// Only the underlying metadata is cached; the code is regenerated on
    /// every call.
    pub async fn generate_code(&self, node_id: &str) -> Result<CodeResult> {
        let metadata = self.get_node_metadata(node_id).await?;
        Ok(codegen::generate_react(&metadata))
    }

    /// Drop cached entries for one identifier, or everything.
    ///
    /// Returns the number of entries removed. A blank identifier is rejected,
    /// since it would match every key.
    pub fn invalidate_cache(&self, id: Option<&str>) -> Result<usize> {
        if id.is_some_and(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "cannot invalidate an empty identifier".to_string(),
            )
            .into());
        }

        let Some(cache) = self.cache.as_ref() else {
            return Ok(0);
        };

        let removed = match id {
            Some(id) => cache.delete_pattern(id),
            None => cache.clear(),
        };
        log::debug!(
            "Invalidated {} cache entries matching '{}'",
            removed,
            id.unwrap_or("*")
        );
        Ok(removed)
    }

    /// Current cache statistics (all zero when caching is disabled)
    pub fn cache_stats(&self) -> CacheStats {
        match self.cache.as_ref() {
            Some(cache) => cache.stats(),
            None => CacheStats {
                total_entries: 0,
                valid_entries: 0,
                expired_entries: 0,
                default_ttl_minutes: self.ttl.default.as_secs() / 60,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::client::mock::{MockFigmaClient, node};
    use crate::cache::CacheTtl;
    use crate::client::ImageFormat;
    use crate::error::{ApiError, Error};

    async fn create_test_client(
        enabled: bool,
    ) -> (CachedFigmaClient<MockFigmaClient>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let mock = MockFigmaClient::new()
            .with_node(node("123:456", "Hero"))
            .await
            .with_node(node("999:000", "Footer"))
            .await;

        let cache = enabled
            .then(|| Arc::new(MemoryCache::with_clock(CacheTtl::DEFAULT, clock.clone())));
        let client = CachedFigmaClient::new(mock, "FILEKEY", cache, TtlPolicy::default());

        (client, clock)
    }

    #[tokio::test]
    async fn test_metadata_cached() {
        let (client, _clock) = create_test_client(true).await;

        let first = client.get_node_metadata("123:456").await.unwrap();
        let second = client.get_node_metadata("123:456").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.inner.call_counts().await.get_node, 1);
    }

    #[tokio::test]
    async fn test_metadata_refetched_after_ttl() {
        let (client, clock) = create_test_client(true).await;

        client.get_node_metadata("123:456").await.unwrap();
        clock.advance(chrono::Duration::minutes(11));
        client.get_node_metadata("123:456").await.unwrap();

        assert_eq!(client.inner.call_counts().await.get_node, 2);
    }

    #[tokio::test]
    async fn test_cache_disabled_bypasses_cache() {
        let (client, _clock) = create_test_client(false).await;

        client.get_node_metadata("123:456").await.unwrap();
        client.get_node_metadata("123:456").await.unwrap();

        assert_eq!(client.inner.call_counts().await.get_node, 2);
        assert_eq!(client.cache_stats().total_entries, 0);
        assert_eq!(client.invalidate_cache(None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_not_cached() {
        let (client, _clock) = create_test_client(true).await;

        client
            .inner
            .fail_next(ApiError::ServerError("boom".to_string()))
            .await;

        let err = client.get_node_metadata("123:456").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::ServerError(_))));
        assert_eq!(client.cache_stats().total_entries, 0);

        let node = client.get_node_metadata("123:456").await.unwrap();
        assert_eq!(node.name, "Hero");
        assert_eq!(client.inner.call_counts().await.get_node, 2);
    }

    #[tokio::test]
    async fn test_not_found_propagates() {
        let (client, _clock) = create_test_client(true).await;

        let err = client.get_node_metadata("1:1").await.unwrap_err();

        match err {
            Error::Api(ApiError::NotFound(msg)) => assert!(msg.contains("1:1")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_screenshot_cached_per_options() {
        let (client, _clock) = create_test_client(true).await;
        let png = ImageOptions {
            scale: 2.0,
            format: ImageFormat::Png,
            embed: false,
        };
        let svg = ImageOptions {
            format: ImageFormat::Svg,
            ..png
        };

        client.get_node_screenshot("123:456", &png).await.unwrap();
        client.get_node_screenshot("123:456", &png).await.unwrap();
        let image = client.get_node_screenshot("123:456", &svg).await.unwrap();

        assert_eq!(image.format, ImageFormat::Svg);
        assert!(image.data.is_none());
        assert_eq!(client.inner.call_counts().await.render_image, 2);
    }

    #[tokio::test]
    async fn test_screenshot_embed_downloads_once() {
        let (client, _clock) = create_test_client(true).await;
        let options = ImageOptions {
            embed: true,
            ..Default::default()
        };

        let first = client.get_node_screenshot("123:456", &options).await.unwrap();
        client.get_node_screenshot("123:456", &options).await.unwrap();

        assert_eq!(first.data.as_deref(), Some("iVBORw=="));
        assert_eq!(client.inner.call_counts().await.download_image, 1);
    }

    #[tokio::test]
    async fn test_file_and_variables_cached() {
        let (client, _clock) = create_test_client(true).await;

        let file = client.get_file().await.unwrap();
        client.get_file().await.unwrap();
        let variables = client.get_design_variables().await.unwrap();

        assert_eq!(file.key, "FILEKEY");
        assert_eq!(variables.source, "static");
        assert_eq!(client.inner.call_counts().await.get_file, 1);
        assert_eq!(client.cache_stats().total_entries, 2);
    }

    #[tokio::test]
    async fn test_generate_code_reuses_metadata() {
        let (client, _clock) = create_test_client(true).await;

        let code = client.generate_code("123:456").await.unwrap();
        client.generate_code("123:456").await.unwrap();

        assert_eq!(code.component_name, "Hero");
        assert_eq!(code.node_id, "123:456");
        assert_eq!(client.inner.call_counts().await.get_node, 1);
        assert_eq!(client.cache_stats().total_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate_single_identifier() {
        let (client, _clock) = create_test_client(true).await;

        client.get_node_metadata("123:456").await.unwrap();
        client
            .get_node_screenshot("123:456", &ImageOptions::default())
            .await
            .unwrap();
        client.get_node_metadata("999:000").await.unwrap();

        assert_eq!(client.invalidate_cache(Some("123:456")).unwrap(), 2);
        assert_eq!(client.cache_stats().total_entries, 1);

        client.get_node_metadata("999:000").await.unwrap();
        assert_eq!(client.inner.call_counts().await.get_node, 2);
    }

    #[tokio::test]
    async fn test_invalidate_everything() {
        let (client, _clock) = create_test_client(true).await;

        client.get_node_metadata("123:456").await.unwrap();
        client.get_file().await.unwrap();
        client.get_design_variables().await.unwrap();

        assert_eq!(client.invalidate_cache(None).unwrap(), 3);
        assert_eq!(client.cache_stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_blank_identifier_rejected() {
        let (client, _clock) = create_test_client(true).await;

        client.get_node_metadata("123:456").await.unwrap();
        client.get_file().await.unwrap();

        for blank in ["", "   "] {
            let err = client.invalidate_cache(Some(blank)).unwrap_err();
            assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
        }
        assert_eq!(client.cache_stats().total_entries, 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_reports_configured_default_ttl() {
        let mock = MockFigmaClient::new();
        let ttl = TtlPolicy {
            default: Duration::from_secs(45 * 60),
            ..TtlPolicy::default()
        };
        let client = CachedFigmaClient::new(mock, "FILEKEY", None, ttl);

        assert_eq!(client.cache_stats().default_ttl_minutes, 45);
    }
}
