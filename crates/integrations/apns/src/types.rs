use serde::Deserialize;

/// Body of a rejected APNs request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApnsErrorResponse {
    /// Error reason, e.g. `BadDeviceToken`.
    pub reason: String,

    /// Milliseconds since the epoch at which the token was last valid;
    /// only present with status 410.
    pub timestamp: Option<i64>,
}

/// Reason APNs gives when the provider token is older than an hour.
pub const EXPIRED_PROVIDER_TOKEN: &str = "ExpiredProviderToken";
