//! # Scan Configuration Module
//!
//! This module defines configuration structures for label scanning,
//! including the vision endpoint settings, image size limits and the
//! caller-side recovery settings.
//!
//! Credentials are always passed in by the caller; nothing here reads the
//! environment.

use std::fmt;
use std::time::Duration;

// Constants for vision configuration
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024; // 20MB limit for label images

/// Vision endpoint configuration, handed to the client at construction time
#[derive(Clone)]
pub struct VisionConfig {
    /// Bearer token for the vision endpoint
    pub api_key: String,
    /// Chat-completions style endpoint URL
    pub endpoint: String,
    /// Vision-capable model identifier
    pub model: String,
    /// Bound on each HTTP request made with this configuration
    pub timeout: Duration,
    /// Completion token budget
    pub max_tokens: u32,
    /// Sampling temperature, kept low for repeatable extraction
    pub temperature: f32,
}

impl VisionConfig {
    /// Configuration with default endpoint, model and limits
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the API key out of logs
impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Format-specific size limits for label images
#[derive(Debug, Clone)]
pub struct ImageLimits {
    /// Maximum allowed size in bytes for any format
    pub max_file_size: u64,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// PNG format limit (lossless phone screenshots get large)
    pub png_max: u64,
    /// JPEG format limit (camera photos)
    pub jpeg_max: u64,
    /// WebP format limit
    pub webp_max: u64,
    /// GIF format limit (first frame only is read by the model)
    pub gif_max: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            png_max: 20 * 1024 * 1024,  // 20MB for PNG
            jpeg_max: 15 * 1024 * 1024, // 15MB for JPEG
            webp_max: 15 * 1024 * 1024, // 15MB for WebP
            gif_max: 5 * 1024 * 1024,   // 5MB for GIF
        }
    }
}

/// Recovery configuration for the caller-side retry layer
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 1000, // 1 second
            max_retry_delay_ms: 10000, // 10 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}
