use std::sync::Arc;

use herald_auth::ServiceAccountTokenSource;
use herald_core::http::{apply_passthrough, default_client};
use herald_core::{
    AuthStrategy, BridgeProviderData, Casing, ChannelType, Clock, Connector, ConnectorError,
    MessageOptions, PushKind, PushOverrides, SendResponse, SystemClock, TransformedRequest,
    deep_merge_entries, fan_out, single,
};
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use crate::config::FcmConfig;
use crate::message::{Address, MessageTemplate};
use crate::types::{FcmErrorResponse, FcmSendResponse};

/// Sends push notifications through the FCM HTTP v1 API.
pub struct FcmConnector {
    config: FcmConfig,
    client: Client,
    tokens: ServiceAccountTokenSource,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FcmConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcmConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FcmConnector {
    /// Create a connector. Fails when the service-account private key is
    /// not a valid RSA PEM.
    pub fn new(config: FcmConfig) -> Result<Self, ConnectorError> {
        Self::with_client(config, default_client())
    }

    /// Create a connector with a custom HTTP client, shared with the token
    /// exchange.
    pub fn with_client(config: FcmConfig, client: Client) -> Result<Self, ConnectorError> {
        let tokens =
            ServiceAccountTokenSource::with_client(config.service_account.clone(), client.clone())?;
        Ok(Self {
            config,
            client,
            tokens,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.config.api_base_url,
            self.tokens.project_id()
        )
    }

    /// Overrides become trigger data; absent fields are skipped.
    fn trigger_data(overrides: &PushOverrides) -> Map<String, Value> {
        let kind = overrides.kind.map(|kind| match kind {
            PushKind::Notification => Value::from("notification"),
            PushKind::Data => Value::from("data"),
        });
        let data = overrides.data.as_ref().map(|data| {
            Value::Object(
                data.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            )
        });

        let mut trigger = Map::new();
        deep_merge_entries(
            &mut trigger,
            [
                ("type", kind),
                ("android", overrides.android.clone()),
                ("apns", overrides.apns.clone()),
                ("fcmOptions", overrides.fcm_options.clone()),
                ("webPush", overrides.web_push.clone()),
                ("data", data),
                ("title", overrides.title.as_deref().map(Value::from)),
                ("body", overrides.body.as_deref().map(Value::from)),
            ],
        );
        trigger
    }

    async fn post_message(
        &self,
        url: &str,
        access_token: &str,
        message: Value,
        request: &TransformedRequest,
    ) -> Result<String, ConnectorError> {
        let builder = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&json!({ "message": message }));
        let response = apply_passthrough(builder, request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "FCM rejected the message");
            return Err(ConnectorError::from_http_response::<FcmErrorResponse>(response).await);
        }

        let sent: FcmSendResponse = response.json().await?;
        Ok(sent.name)
    }
}

impl Connector for FcmConnector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn id(&self) -> &str {
        "fcm"
    }

    fn channel(&self) -> ChannelType {
        ChannelType::Push
    }

    fn casing(&self) -> Casing {
        Casing::SnakeCase
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::OAuthExchange
    }

    #[instrument(skip(self, options, bridge), fields(provider = "fcm"))]
    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        let push = options.push()?;
        let access_token = self.tokens.access_token(self.clock.now()).await?;

        let request = self.transform(bridge, &Self::trigger_data(&push.overrides));
        let template = MessageTemplate::resolve(&request.body, push);
        let url = self.send_url();

        let ids = if let Some(topic) = request.body.get("topic").and_then(Value::as_str) {
            debug!(topic, "broadcasting FCM message to topic");
            let message = template.message(Address::Topic(topic));
            single(self.post_message(&url, &access_token, message, &request)).await?
        } else {
            debug!(targets = push.target.len(), "sending FCM message to device tokens");
            let (url, access_token, template, request) = (&url, &access_token, &template, &request);
            fan_out("FCM", push.target.iter(), move |token| {
                let message = template.message(Address::Token(token));
                self.post_message(url, access_token, message, request)
            })
            .await?
        };

        Ok(SendResponse::with_ids(self.clock.now(), ids))
    }
}
