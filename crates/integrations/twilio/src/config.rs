use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";

/// Configuration for the Twilio connector.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID, also the Basic auth username.
    pub account_sid: String,

    /// Auth token used as the Basic auth password.
    pub auth_token: String,

    /// Default sender number (E.164) when a send does not name one.
    #[serde(default)]
    pub from: Option<String>,

    /// Base URL for the Twilio REST API. Override this for testing against a
    /// mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from", &self.from)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl TwilioConfig {
    /// Create a configuration with the given Account SID and auth token.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: None,
            api_base_url: default_api_base_url(),
        }
    }

    #[must_use]
    pub fn with_from(mut self, number: impl Into<String>) -> Self {
        self.from = Some(number.into());
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
