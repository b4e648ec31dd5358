use std::sync::Arc;

use herald_core::http::{apply_passthrough, default_client};
use herald_core::{
    AuthStrategy, BridgeProviderData, Casing, ChannelType, ChatOptions, Clock, Connector,
    ConnectorError, MessageOptions, SendResponse, SystemClock, deep_merge_entries,
};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::SlackConfig;

/// Posts chat messages to Slack incoming webhooks.
pub struct SlackConnector {
    config: SlackConfig,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl SlackConnector {
    pub fn new(config: SlackConfig) -> Self {
        Self::with_client(config, default_client())
    }

    /// Create a connector with a custom HTTP client.
    pub fn with_client(config: SlackConfig, client: Client) -> Self {
        Self {
            config,
            client,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The per-send URL wins over the configured one.
    fn resolve_webhook_url<'a>(&'a self, chat: &'a ChatOptions) -> Result<&'a str, ConnectorError> {
        chat.webhook_url
            .as_deref()
            .or(self.config.webhook_url.as_deref())
            .ok_or_else(|| {
                ConnectorError::validation(
                    "missing webhook URL: provide it in the chat options or SlackConfig",
                )
            })
    }

    fn trigger_data(chat: &ChatOptions) -> Map<String, Value> {
        let mut trigger = Map::new();
        deep_merge_entries(
            &mut trigger,
            [
                ("text", Some(Value::from(chat.content.as_str()))),
                ("channel", chat.channel.as_deref().map(Value::from)),
            ],
        );
        trigger
    }
}

impl Connector for SlackConnector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn id(&self) -> &str {
        "slack"
    }

    fn channel(&self) -> ChannelType {
        ChannelType::Chat
    }

    fn casing(&self) -> Casing {
        Casing::SnakeCase
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::WebhookUrl
    }

    #[instrument(skip(self, options, bridge), fields(provider = "slack"))]
    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        let chat = options.chat()?;
        let webhook_url = self.resolve_webhook_url(chat)?;
        let request = self.transform(bridge, &Self::trigger_data(chat));

        debug!("posting message to Slack webhook");

        let builder = self.client.post(webhook_url).json(&request.body);
        let response = apply_passthrough(builder, &request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %text, "Slack rejected the message");
            let message = if text.is_empty() {
                format!("request failed with status code {}", status.as_u16())
            } else {
                text.clone()
            };
            return Err(
                ConnectorError::provider_rejection(status.as_u16(), message).with_provider_message(text),
            );
        }

        Ok(SendResponse::with_id(self.clock.now(), None))
    }
}
