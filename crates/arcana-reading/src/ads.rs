//! Monetization capability interface.
//!
//! The orchestrator consumes ads through this trait instead of probing an
//! ambient SDK. Both calls are best-effort: a failed preload or show must
//! never affect a reading's outcome.

use async_trait::async_trait;

/// Classified reasons an ad could not be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdFailure {
    /// No ad SDK is wired into this deployment.
    SdkUnavailable,
    /// The network has no ad to serve right now.
    NoInventory,
    /// The SDK reported a connectivity problem.
    Network,
    /// Any other SDK-reported failure.
    Ad(String),
}

/// Options passed to the ad collaborator.
#[derive(Debug, Clone, Default)]
pub struct AdOptions {
    /// Placement identifier, e.g. the screen requesting the ad.
    pub placement: String,
}

/// Result of a show attempt.
#[derive(Debug, Clone)]
pub struct AdOutcome {
    /// Whether an ad was shown to completion.
    pub ok: bool,
    /// SDK payload forwarded on success, if any.
    pub payload: Option<serde_json::Value>,
    /// Classified failure when `ok` is false.
    pub failure: Option<AdFailure>,
}

/// Capability interface over the ad collaborator.
#[async_trait]
pub trait AdGateway: Send + Sync {
    /// Warms the ad inventory. Failures are swallowed by implementations.
    async fn preload(&self, options: &AdOptions);

    /// Attempts to show an ad and reports the classified outcome.
    async fn show(&self, options: &AdOptions) -> AdOutcome;
}

/// The gateway used when no ad SDK is configured: preload does nothing
/// and show reports the SDK as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAdGateway;

#[async_trait]
impl AdGateway for UnavailableAdGateway {
    async fn preload(&self, _options: &AdOptions) {}

    async fn show(&self, _options: &AdOptions) -> AdOutcome {
        AdOutcome {
            ok: false,
            payload: None,
            failure: Some(AdFailure::SdkUnavailable),
        }
    }
}
