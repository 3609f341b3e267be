//! Figma REST API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{
    FileInfo, ImageOptions, NodeMetadata, RawFileResponse, RawImagesResponse, RawNodesResponse,
};
use super::FigmaApi;
use crate::config::TokenKind;
use crate::error::{ApiError, Result};

/// Figma API base URL
const API_BASE_URL: &str = "https://api.figma.com";

/// Client-side request budget; Figma throttles bursts per token
const RATE_LIMIT_PER_SECOND: u32 = 2;

/// Figma API client
pub struct FigmaClient {
    http: HttpClient,
    base_url: String,
    token: String,
    token_kind: TokenKind,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl FigmaClient {
    /// Create a client against `host`, or the public Figma API when `None`
    pub fn with_host(token: String, token_kind: TokenKind, host: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota =
            Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let base_url = host
            .map(|h| h.trim_end_matches('/').to_string())
            .unwrap_or_else(|| API_BASE_URL.to_string());

        Ok(Self {
            http,
            base_url,
            token,
            token_kind,
            rate_limiter,
        })
    }

    /// Make an authenticated GET request and parse the JSON body
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let request = self.http.get(&url).query(query);
        let request = match self.token_kind {
            TokenKind::Personal => request.header("X-Figma-Token", self.token.as_str()),
            TokenKind::Oauth => request.bearer_auth(&self.token),
        };

        let response = request.send().await.map_err(ApiError::from)?;
        let response = check_status(response).await?;

        let data = response.json::<T>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;
        Ok(data)
    }
}

/// Map non-success statuses onto API errors
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
        StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
        StatusCode::NOT_FOUND => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Resource not found".to_string());
            Err(ApiError::NotFound(error_msg).into())
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Bad request".to_string());
            Err(ApiError::BadRequest(error_msg).into())
        }
        status if status.is_server_error() => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Server error: {}", status));
            Err(ApiError::ServerError(error_msg).into())
        }
        _ => {
            let error_msg = format!("Unexpected status code: {}", status);
            Err(ApiError::InvalidResponse(error_msg).into())
        }
    }
}

/// Format a scale the way Figma expects (`2`, not `2.0`)
fn format_scale(scale: f64) -> String {
    if scale.fract() == 0.0 {
        format!("{}", scale as i64)
    } else {
        format!("{}", scale)
    }
}

#[async_trait]
impl FigmaApi for FigmaClient {
    async fn get_node(&self, file_key: &str, node_id: &str) -> Result<NodeMetadata> {
        let path = format!("/v1/files/{}/nodes", file_key);
        let response: RawNodesResponse = self
            .get_json(&path, &[("ids", node_id.to_string())])
            .await?;

        let entry = response
            .nodes
            .into_iter()
            .find(|(id, _)| id == node_id)
            .and_then(|(_, entry)| entry)
            .ok_or_else(|| {
                ApiError::NotFound(format!("Node {} not found in file {}", node_id, file_key))
            })?;

        Ok(NodeMetadata::from(entry.document))
    }

    async fn get_file(&self, file_key: &str) -> Result<FileInfo> {
        let path = format!("/v1/files/{}", file_key);
        let response: RawFileResponse = self
            .get_json(&path, &[("depth", "1".to_string())])
            .await?;

        Ok(response.into_file_info(file_key))
    }

    async fn render_image(
        &self,
        file_key: &str,
        node_id: &str,
        options: &ImageOptions,
    ) -> Result<String> {
        if !(0.01..=4.0).contains(&options.scale) {
            return Err(ApiError::BadRequest(format!(
                "Image scale must be between 0.01 and 4, got {}",
                options.scale
            ))
            .into());
        }

        let path = format!("/v1/images/{}", file_key);
        let query = [
            ("ids", node_id.to_string()),
            ("scale", format_scale(options.scale)),
            ("format", options.format.as_str().to_string()),
        ];
        let response: RawImagesResponse = self.get_json(&path, &query).await?;

        if let Some(err) = response.err {
            return Err(ApiError::InvalidResponse(format!("Render failed: {}", err)).into());
        }

        response
            .images
            .into_iter()
            .find(|(id, _)| id == node_id)
            .and_then(|(_, url)| url)
            .ok_or_else(|| {
                ApiError::NotFound(format!("No image rendered for node {}", node_id)).into()
            })
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Downloading image {}", url);

        // Render URLs are pre-signed, no auth header
        let response = self.http.get(url).send().await.map_err(ApiError::from)?;
        let response = check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read image: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
