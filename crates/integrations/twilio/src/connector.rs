use std::sync::Arc;

use herald_core::http::{apply_passthrough, default_client};
use herald_core::{
    AuthStrategy, BridgeProviderData, Casing, ChannelType, Clock, Connector, ConnectorError,
    MessageOptions, SendResponse, SmsOptions, SystemClock, deep_merge_entries,
};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::TwilioConfig;
use crate::types::{TwilioErrorResponse, TwilioMessageResponse};

/// Sends SMS through the Twilio Messages API.
pub struct TwilioConnector {
    config: TwilioConfig,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl TwilioConnector {
    pub fn new(config: TwilioConfig) -> Self {
        Self::with_client(config, default_client())
    }

    /// Create a connector with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool across connectors.
    pub fn with_client(config: TwilioConfig, client: Client) -> Self {
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

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url, self.config.account_sid
        )
    }

    /// Fields computed from the options, before casing and overrides.
    fn trigger_data(&self, sms: &SmsOptions) -> Map<String, Value> {
        let from = sms.from.as_ref().or(self.config.from.as_ref());
        let mut trigger = Map::new();
        deep_merge_entries(
            &mut trigger,
            [
                ("To", Some(Value::from(sms.to.as_str()))),
                ("From", from.map(|f| Value::from(f.as_str()))),
                ("Body", Some(Value::from(sms.content.as_str()))),
            ],
        );
        trigger
    }
}

impl Connector for TwilioConnector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn id(&self) -> &str {
        "twilio"
    }

    fn channel(&self) -> ChannelType {
        ChannelType::Sms
    }

    fn casing(&self) -> Casing {
        Casing::PascalCase
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::Basic
    }

    #[instrument(skip(self, options, bridge), fields(provider = "twilio"))]
    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        let sms = options.sms()?;
        let request = self.transform(bridge, &self.trigger_data(sms));

        if !request.body.contains_key("From") {
            return Err(ConnectorError::validation(
                "no sender number: set SmsOptions::from or TwilioConfig::from",
            ));
        }

        debug!(to = %sms.to, "sending SMS via Twilio");

        let builder = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&request.form_fields());
        let response = apply_passthrough(builder, &request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Twilio rejected the message");
            return Err(ConnectorError::from_http_response::<TwilioErrorResponse>(response).await);
        }

        let message: TwilioMessageResponse = response.json().await?;
        debug!(sid = ?message.sid, status = ?message.status, "Twilio accepted the message");

        Ok(SendResponse::with_id(self.clock.now(), message.sid))
    }
}
