use serde::{Deserialize, Serialize};

/// Configuration for the SNS connector.
#[derive(Clone, Serialize, Deserialize)]
pub struct SnsConfig {
    /// AWS region, e.g. `us-east-1`.
    pub region: String,

    pub access_key_id: String,

    pub secret_access_key: String,

    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,

    /// Endpoint override (for `LocalStack` or a mock server). Defaults to
    /// `https://sns.{region}.amazonaws.com`.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for SnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl SnsConfig {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            endpoint_url: None,
        }
    }

    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// The URL requests are posted to.
    pub fn endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("https://sns.{}.amazonaws.com", self.region),
        }
    }
}
