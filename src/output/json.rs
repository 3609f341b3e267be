//! JSON output formatting
//!
//! Every JSON response, success or failure, uses the same envelope so
//! scripts can branch on `success` without parsing error text.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Envelope for JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// Whether the command succeeded
    pub success: bool,

    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// RFC 3339 time the output was produced
    pub timestamp: String,
}

impl<T> JsonOutput<T> {
    /// Successful envelope around `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Failure envelope carrying `message`
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Format data as a pretty-printed success envelope
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::ok(data))
}

/// Format an error message as a pretty-printed failure envelope
pub fn format_json_error(message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::<()>::err(message))
}
