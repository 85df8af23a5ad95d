//! Model and transport configuration.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use std::time::Duration;

/// Model behavior parameters for a completion backend.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Model identifier (e.g., "gemini-2.0-flash").
    pub model: String,

    /// Temperature for sampling (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Top-p (nucleus) sampling parameter.
    pub top_p: Option<f32>,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl ModelOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Request timeout. If None, the default client timeout is used.
    pub timeout: Option<Duration>,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
    /// Additional headers to send with every request.
    pub headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the proxy.
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy = Some(proxy_url);
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
