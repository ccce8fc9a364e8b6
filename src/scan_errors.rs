//! # Scan Error Types Module
//!
//! This module defines the error taxonomy used throughout the label scanning pipeline.
//! Errors never escape the public analysis functions: they are folded into an
//! [`AnalysisResult`](crate::nutrient_model::AnalysisResult) with `success: false`
//! so callers can always render a "try again" state.

use std::time::Duration;
use thiserror::Error;

use crate::nutrient_model::FailureKind;

/// Custom error types for label scanning operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// Network-level failure talking to the vision endpoint
    #[error("transport error: {0}")]
    Transport(String),
    /// The vision endpoint answered with a non-success status
    #[error("vision API error ({status}): {message}")]
    HttpStatus { status: u16, message: String },
    /// The call exceeded the configured per-request timeout
    #[error("request timed out after {}", format_timeout(.0))]
    Timeout(Duration),
    /// The completion carried no text content
    #[error("no response content from vision model")]
    EmptyResponse,
    /// No JSON object could be located in the model reply
    #[error("could not parse response")]
    UnparseableResponse,
    /// JSON was found but did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The label image could not be read, recognized or re-encoded
    #[error("image error: {0}")]
    ImageLoad(String),
    /// Input rejected before any network call (size limits, empty paths)
    #[error("validation error: {0}")]
    Validation(String),
    /// Every strategy of a multi-strategy analysis failed
    #[error("all analysis methods failed")]
    AllStrategiesFailed,
    /// The caller-side circuit breaker is refusing calls
    #[error("circuit breaker open: vision service temporarily unavailable")]
    CircuitOpen,
}

impl ScanError {
    /// Machine-readable classification carried alongside the error message
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::Transport(_) => FailureKind::Transport,
            ScanError::HttpStatus { status, .. } => FailureKind::HttpStatus(*status),
            ScanError::Timeout(_) => FailureKind::Timeout,
            ScanError::EmptyResponse | ScanError::UnparseableResponse => FailureKind::Unparseable,
            ScanError::MalformedResponse(_) => FailureKind::Malformed,
            ScanError::ImageLoad(_) | ScanError::Validation(_) => FailureKind::InvalidImage,
            ScanError::AllStrategiesFailed => FailureKind::AllStrategiesFailed,
            ScanError::CircuitOpen => FailureKind::CircuitOpen,
        }
    }
}

/// Whole seconds as `30s`, anything finer as `250ms`
fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_millis() == 0 && timeout.as_secs() > 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        ScanError::Transport(err.to_string())
    }
}

impl From<image::ImageError> for ScanError {
    fn from(err: image::ImageError) -> Self {
        ScanError::ImageLoad(err.to_string())
    }
}
