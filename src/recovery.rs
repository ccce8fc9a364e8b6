//! # Recovery Module
//!
//! Caller-side retry policy around [`analyze_label`]. The pipeline itself
//! makes one logical attempt per call; this layer decides whether a failed
//! attempt is worth repeating.
//!
//! Only failures whose [`FailureKind`](crate::nutrient_model::FailureKind) is
//! retryable (transport errors, timeouts, HTTP 429 and 5xx) are retried, with
//! jittered exponential backoff. Those failures also feed a
//! [`CircuitBreaker`]; while it is open, calls fail fast with
//! `FailureKind::CircuitOpen` and the model is not contacted.

use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::label_analyzer::{analyze_label, AnalysisOptions, LabelReport};
use crate::label_image::LabelImage;
use crate::scan_config::RecoveryConfig;
use crate::scan_errors::ScanError;
use crate::vision_client::VisionModel;

/// Delay before retry number `attempt` (1-based)
///
/// `base * 2^(attempt - 1)`, capped at the configured maximum, plus up to 10%
/// random jitter so concurrent callers do not retry in lockstep.
pub fn calculate_retry_delay(attempt: u32, config: &RecoveryConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let exponential = config.base_retry_delay_ms.saturating_mul(1u64 << exponent);
    let capped = exponential.min(config.max_retry_delay_ms);

    let jitter = if capped >= 10 {
        rand::thread_rng().gen_range(0..=capped / 10)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

/// Runs label analyses with retries and a circuit breaker
#[derive(Debug)]
pub struct RetryingAnalyzer {
    model: Box<dyn VisionModel>,
    breaker: CircuitBreaker,
    config: RecoveryConfig,
}

impl RetryingAnalyzer {
    pub fn new(model: Box<dyn VisionModel>, config: RecoveryConfig) -> Self {
        Self {
            model,
            breaker: CircuitBreaker::new(config.clone()),
            config,
        }
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Analyze a label, retrying transient failures
    pub async fn analyze(&self, image: &LabelImage, options: &AnalysisOptions) -> LabelReport {
        if self.breaker.is_open() {
            warn!(
                consecutive_failures = self.breaker.consecutive_failures(),
                "Circuit breaker open, refusing label analysis"
            );
            return LabelReport::failed(&ScanError::CircuitOpen, options);
        }

        let mut attempt = 0;
        loop {
            let report = analyze_label(self.model.as_ref(), image, options).await;

            if report.success() {
                self.breaker.record_success();
                return report;
            }

            let retryable = report.failure().is_some_and(|kind| kind.is_retryable());
            if !retryable {
                debug!(error = ?report.error(), "Failure is not retryable");
                return report;
            }

            self.breaker.record_failure();

            if attempt >= self.config.max_retries || self.breaker.is_open() {
                warn!(
                    attempts = attempt + 1,
                    error = ?report.error(),
                    "Giving up on label analysis"
                );
                return report;
            }

            attempt += 1;
            let delay = calculate_retry_delay(attempt, &self.config);
            info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = ?report.error(),
                "Retrying label analysis"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
