//! Runtime configuration for the client and the collector.

use crate::core::domain::error::ValidationError;
use std::time::Duration;

/// Token-bucket limit for requests sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Settings for the HTTP side of the client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Optional limit on upstream requests; `None` disables limiting.
    pub rate_limit: Option<RateLimitConfig>,
    /// Optional per-request timeout enforced by the HTTP client.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ValidationError::Field` for a zero rate or burst.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(rl) = self.rate_limit {
            if rl.requests_per_second == 0 {
                return Err(ValidationError::Field {
                    field: "rate_limit.requests_per_second".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
            if rl.burst_size == 0 {
                return Err(ValidationError::Field {
                    field: "rate_limit.burst_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ValidationError::Field {
                field: "request_timeout".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings for the scrape cycle and its cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Period between scrape cycles; also the deadline of each cycle.
    pub scrape_interval: Duration,
    /// Number of per-device workers in a cycle.
    pub workers: usize,
    /// Skip a tick while the previous cycle is still running.
    ///
    /// Off by default: overlapping cycles are allowed.
    pub skip_overlapping: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            scrape_interval: Duration::from_secs(15),
            workers: 5,
            skip_overlapping: false,
        }
    }
}

impl CollectorConfig {
    /// Entries live for five scrape intervals.
    pub fn cache_ttl(&self) -> Duration {
        self.scrape_interval * 5
    }

    /// Expired entries are swept every ten scrape intervals.
    pub fn cache_sweep_interval(&self) -> Duration {
        self.scrape_interval * 10
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ValidationError::Field` for a zero interval or zero workers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scrape_interval.is_zero() {
            return Err(ValidationError::Field {
                field: "scrape_interval".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(ValidationError::Field {
                field: "workers".to_string(),
                message: "at least one worker is required".to_string(),
            });
        }
        Ok(())
    }
}
