use serde::{Deserialize, Serialize};

/// Configuration for the Slack connector.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Incoming webhook URL used when a send does not carry its own. The URL
    /// embeds the credential, so it is never logged.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SlackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default incoming webhook URL.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}
