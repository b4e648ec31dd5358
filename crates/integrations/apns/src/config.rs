use serde::{Deserialize, Serialize};

pub const PRODUCTION_HOST: &str = "api.push.apple.com";
pub const SANDBOX_HOST: &str = "api.sandbox.push.apple.com";

fn default_production() -> bool {
    true
}

/// Configuration for the APNs connector.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApnsConfig {
    /// Apple Developer team id, the token issuer.
    pub team_id: String,

    /// Id of the `.p8` signing key.
    pub key_id: String,

    /// PEM contents of the `.p8` signing key.
    pub private_key: String,

    /// App bundle id, sent as `apns-topic`.
    pub bundle_id: String,

    /// Send to the production gateway (default) or the sandbox.
    #[serde(default = "default_production")]
    pub production: bool,

    /// Base URL override for testing against a mock server.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl std::fmt::Debug for ApnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsConfig")
            .field("team_id", &self.team_id)
            .field("key_id", &self.key_id)
            .field("private_key", &"[REDACTED]")
            .field("bundle_id", &self.bundle_id)
            .field("production", &self.production)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ApnsConfig {
    pub fn new(
        team_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key: impl Into<String>,
        bundle_id: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            key_id: key_id.into(),
            private_key: private_key.into(),
            bundle_id: bundle_id.into(),
            production: true,
            api_base_url: None,
        }
    }

    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None if self.production => format!("https://{PRODUCTION_HOST}"),
            None => format!("https://{SANDBOX_HOST}"),
        }
    }
}
