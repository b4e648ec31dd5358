use std::fmt;

use serde::{Deserialize, Serialize};

/// Delivery channel a connector serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Sms,
    Chat,
    Push,
}

impl ChannelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Chat => "chat",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a connector authenticates against its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrategy {
    /// HTTP Basic credentials on every request.
    Basic,
    /// A locally signed, cached provider token (APNs).
    SignedToken,
    /// A signed assertion exchanged for a cached access token (FCM).
    #[serde(rename = "oauth_exchange")]
    OAuthExchange,
    /// Per-request AWS Signature Version 4.
    RequestSigning,
    /// The destination URL itself is the credential (incoming webhooks).
    WebhookUrl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&ChannelType::Sms).unwrap(), "\"sms\"");
        let parsed: ChannelType = serde_json::from_str("\"push\"").unwrap();
        assert_eq!(parsed, ChannelType::Push);
        assert_eq!(ChannelType::Chat.to_string(), "chat");
    }

    #[test]
    fn auth_strategy_serde() {
        assert_eq!(
            serde_json::to_string(&AuthStrategy::OAuthExchange).unwrap(),
            "\"oauth_exchange\""
        );
        assert_eq!(
            serde_json::to_string(&AuthStrategy::RequestSigning).unwrap(),
            "\"request_signing\""
        );
    }
}
