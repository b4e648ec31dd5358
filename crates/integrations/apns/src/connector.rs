use std::sync::Arc;

use herald_auth::ProviderTokenSigner;
use herald_core::http::{apply_passthrough, default_client};
use herald_core::{
    AuthStrategy, BridgeProviderData, Casing, ChannelType, Clock, Connector, ConnectorError,
    MessageOptions, PushOptions, SendResponse, SystemClock, TransformedRequest, fan_out,
};
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use crate::config::ApnsConfig;
use crate::types::{ApnsErrorResponse, EXPIRED_PROVIDER_TOKEN};

/// Sends push notifications to Apple devices through APNs.
pub struct ApnsConnector {
    config: ApnsConfig,
    client: Client,
    signer: ProviderTokenSigner,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ApnsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApnsConnector {
    /// Create a connector. Fails when the signing key is not a valid P-256
    /// PEM.
    pub fn new(config: ApnsConfig) -> Result<Self, ConnectorError> {
        Self::with_client(config, default_client())
    }

    /// Create a connector with a custom HTTP client.
    pub fn with_client(config: ApnsConfig, client: Client) -> Result<Self, ConnectorError> {
        let signer = ProviderTokenSigner::new(
            &config.team_id,
            &config.key_id,
            config.private_key.as_bytes(),
        )?;
        Ok(Self {
            config,
            client,
            signer,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The APNs payload: `aps` from the options and overrides, custom
    /// payload keys at the top level.
    fn trigger_data(push: &PushOptions) -> Map<String, Value> {
        let overrides = &push.overrides;

        let mut aps = Map::new();
        aps.insert(
            "alert".into(),
            json!({
                "title": overrides.title.as_deref().unwrap_or(&push.title),
                "body": overrides.body.as_deref().unwrap_or(&push.content),
            }),
        );
        if let Some(sound) = &overrides.sound {
            aps.insert("sound".into(), sound.as_str().into());
        }
        if let Some(badge) = overrides.badge {
            aps.insert("badge".into(), badge.into());
        }

        let mut trigger = Map::new();
        trigger.insert("aps".into(), Value::Object(aps));
        trigger.extend(push.payload.clone());
        trigger
    }

    async fn send_to_device(
        &self,
        device_token: &str,
        jwt: &str,
        request: &TransformedRequest,
    ) -> Result<String, ConnectorError> {
        let url = format!("{}/3/device/{device_token}", self.config.base_url());
        let builder = self
            .client
            .post(url)
            .header("authorization", format!("bearer {jwt}"))
            .header("apns-topic", &self.config.bundle_id)
            .header("apns-push-type", "alert")
            .json(&request.body);
        let response = apply_passthrough(builder, request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response
                .headers()
                .get("apns-id")
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default()
                .to_owned());
        }

        let text = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ApnsErrorResponse>(&text)
            .map(|body| body.reason)
            .unwrap_or_else(|_| format!("APNs request failed with status {}", status.as_u16()));
        warn!(status = status.as_u16(), %reason, "APNs rejected the notification");

        if reason == EXPIRED_PROVIDER_TOKEN {
            self.signer.invalidate().await;
        }

        Err(ConnectorError::provider_rejection(status.as_u16(), reason.clone())
            .with_provider_code(reason.clone())
            .with_provider_message(reason))
    }
}

impl Connector for ApnsConnector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn id(&self) -> &str {
        "apns"
    }

    fn channel(&self) -> ChannelType {
        ChannelType::Push
    }

    fn casing(&self) -> Casing {
        Casing::CamelCase
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::SignedToken
    }

    #[instrument(skip(self, options, bridge), fields(provider = "apns", bundle_id = %self.config.bundle_id))]
    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        let push = options.push()?;
        let jwt = self.signer.token(self.clock.now()).await?;
        let request = self.transform(bridge, &Self::trigger_data(push));

        debug!(targets = push.target.len(), "sending APNs notification");

        let (jwt, request) = (jwt.as_str(), &request);
        let ids = fan_out("APNs", push.target.iter(), move |token| {
            self.send_to_device(token, jwt, request)
        })
        .await?;

        Ok(SendResponse::with_ids(self.clock.now(), ids))
    }
}
