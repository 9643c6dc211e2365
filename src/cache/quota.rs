//! Gauge sink for observed rate-limit quota.
//!
//! The cache republishes the most recent `remaining` value per installation
//! so operators can watch apps approach exhaustion. The sink is write-only
//! from the cache's perspective.

use crate::types::InstallationId;

/// Receives the last observed remaining quota per installation.
pub trait QuotaSink: Send + Sync {
    fn record(&self, installation: InstallationId, remaining: u32);
}

/// Publishes quota to the `github_token_rate_limits_available` gauge,
/// labeled by installation id.
#[derive(Debug, Default)]
pub struct MetricsQuotaSink;

impl QuotaSink for MetricsQuotaSink {
    fn record(&self, installation: InstallationId, remaining: u32) {
        metrics::gauge!(
            "github_token_rate_limits_available",
            "installation_id" => installation.to_string()
        )
        .set(remaining as f64);
    }
}

/// Discards quota observations. Useful when no metrics recorder is installed.
#[derive(Debug, Default)]
pub struct NullQuotaSink;

impl QuotaSink for NullQuotaSink {
    fn record(&self, _installation: InstallationId, _remaining: u32) {}
}
