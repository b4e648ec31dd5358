use herald_auth::ServiceAccountKey;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://fcm.googleapis.com";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

/// Configuration for the FCM connector.
///
/// Deserializes straight from a Google service-account JSON key; the extra
/// fields of that file are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    #[serde(flatten)]
    pub service_account: ServiceAccountKey,

    /// Base URL for the FCM API. Override this for testing against a mock
    /// server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl FcmConfig {
    pub fn new(service_account: ServiceAccountKey) -> Self {
        Self {
            service_account,
            api_base_url: default_api_base_url(),
        }
    }

    /// Parse a service-account JSON key.
    pub fn from_service_account_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the OAuth token endpoint (useful for testing).
    #[must_use]
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.service_account.token_uri = uri.into();
        self
    }
}
