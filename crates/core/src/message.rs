use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::channel::ChannelType;
use crate::error::ConnectorError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailOptions {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub from: Option<String>,
    pub text: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl EmailOptions {
    pub fn new(
        to: impl IntoIterator<Item = impl Into<String>>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            html: html.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmsOptions {
    /// Destination number.
    pub to: String,
    pub content: String,
    /// Sender; connectors fall back to their configured default.
    pub from: Option<String>,
}

impl SmsOptions {
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

/// Whether a push is rendered by the OS or delivered silently to the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushKind {
    #[default]
    Notification,
    Data,
}

/// Per-send push overrides. Every field is optional and absent fields
/// never overwrite computed defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushOverrides {
    #[serde(rename = "type")]
    pub kind: Option<PushKind>,
    pub data: Option<BTreeMap<String, String>>,
    pub tag: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<u32>,
    pub color: Option<String>,
    pub sound: Option<String>,
    pub title: Option<String>,
    pub android: Option<Value>,
    pub apns: Option<Value>,
    pub fcm_options: Option<Value>,
    pub web_push: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    /// Device tokens to deliver to.
    pub target: Vec<String>,
    pub title: String,
    pub content: String,
    /// Custom key/values delivered alongside the notification.
    pub payload: Map<String, Value>,
    pub overrides: PushOverrides,
}

impl PushOptions {
    pub fn new(
        target: impl IntoIterator<Item = impl Into<String>>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into_iter().map(Into::into).collect(),
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: PushOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Per-send webhook URL, taking precedence over the connector's own.
    pub webhook_url: Option<String>,
    pub channel: Option<String>,
    pub content: String,
}

impl ChatOptions {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// Channel-specific send options, tagged by channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOptions {
    Email(EmailOptions),
    Sms(SmsOptions),
    Push(PushOptions),
    Chat(ChatOptions),
}

impl MessageOptions {
    pub fn channel(&self) -> ChannelType {
        match self {
            Self::Email(_) => ChannelType::Email,
            Self::Sms(_) => ChannelType::Sms,
            Self::Push(_) => ChannelType::Push,
            Self::Chat(_) => ChannelType::Chat,
        }
    }

    pub fn email(&self) -> Result<&EmailOptions, ConnectorError> {
        match self {
            Self::Email(options) => Ok(options),
            other => Err(other.mismatch(ChannelType::Email)),
        }
    }

    pub fn sms(&self) -> Result<&SmsOptions, ConnectorError> {
        match self {
            Self::Sms(options) => Ok(options),
            other => Err(other.mismatch(ChannelType::Sms)),
        }
    }

    pub fn push(&self) -> Result<&PushOptions, ConnectorError> {
        match self {
            Self::Push(options) => Ok(options),
            other => Err(other.mismatch(ChannelType::Push)),
        }
    }

    pub fn chat(&self) -> Result<&ChatOptions, ConnectorError> {
        match self {
            Self::Chat(options) => Ok(options),
            other => Err(other.mismatch(ChannelType::Chat)),
        }
    }

    fn mismatch(&self, expected: ChannelType) -> ConnectorError {
        ConnectorError::validation(format!(
            "expected {expected} options, got {}",
            self.channel()
        ))
    }
}

impl From<EmailOptions> for MessageOptions {
    fn from(options: EmailOptions) -> Self {
        Self::Email(options)
    }
}

impl From<SmsOptions> for MessageOptions {
    fn from(options: SmsOptions) -> Self {
        Self::Sms(options)
    }
}

impl From<PushOptions> for MessageOptions {
    fn from(options: PushOptions) -> Self {
        Self::Push(options)
    }
}

impl From<ChatOptions> for MessageOptions {
    fn from(options: ChatOptions) -> Self {
        Self::Chat(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn channel_of_each_variant() {
        assert_eq!(
            MessageOptions::from(EmailOptions::default()).channel(),
            ChannelType::Email
        );
        assert_eq!(
            MessageOptions::from(SmsOptions::new("+1", "hi")).channel(),
            ChannelType::Sms
        );
        assert_eq!(
            MessageOptions::from(PushOptions::new(["t"], "T", "B")).channel(),
            ChannelType::Push
        );
        assert_eq!(
            MessageOptions::from(ChatOptions::new("hi")).channel(),
            ChannelType::Chat
        );
    }

    #[test]
    fn wrong_channel_is_a_validation_error() {
        let options = MessageOptions::from(ChatOptions::new("hi"));
        let err = options.sms().unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationOmission);
        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "expected sms options, got chat");
        assert!(options.chat().is_ok());
    }

    #[test]
    fn overrides_deserialize_with_type_key() {
        let overrides: PushOverrides = serde_json::from_value(serde_json::json!({
            "type": "data",
            "badge": 3,
            "fcm_options": { "analytics_label": "x" }
        }))
        .unwrap();
        assert_eq!(overrides.kind, Some(PushKind::Data));
        assert_eq!(overrides.badge, Some(3));
        assert!(overrides.fcm_options.is_some());
        assert!(overrides.title.is_none());
    }

    #[test]
    fn email_options_round_through_the_enum() {
        let options = MessageOptions::from(EmailOptions::new(
            ["ada@example.com", "bob@example.com"],
            "Welcome",
            "<p>Hi</p>",
        ));

        let email = options.email().unwrap();
        assert_eq!(email.to, ["ada@example.com", "bob@example.com"]);
        assert_eq!(email.subject, "Welcome");
        assert_eq!(email.html, "<p>Hi</p>");
        assert!(email.from.is_none());
        assert!(email.cc.is_empty());

        let err = options.push().unwrap_err();
        assert_eq!(err.message, "expected push options, got email");
    }
}
