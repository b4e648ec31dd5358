use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::casing::Casing;
use crate::channel::{AuthStrategy, ChannelType};
use crate::error::ConnectorError;
use crate::message::MessageOptions;
use crate::response::{CheckIntegrationResponse, SendResponse};
use crate::transform::{BridgeProviderData, TransformedRequest, transform};

/// Strongly-typed connector trait with native `async fn`.
///
/// A connector is described by its channel, the key casing its provider
/// expects, and how it authenticates; [`send`](Self::send) does the
/// provider-specific work on top of the shared pipeline.
///
/// This trait is **not** object-safe. For dynamic dispatch use
/// [`DynConnector`], which every `Connector` implements through a blanket
/// implementation.
pub trait Connector: Send + Sync {
    /// Unique provider id, e.g. `"twilio"`.
    fn id(&self) -> &str;

    fn channel(&self) -> ChannelType;

    /// Naming convention applied to payload keys before sending.
    fn casing(&self) -> Casing;

    fn auth_strategy(&self) -> AuthStrategy;

    /// Shape the outbound request from computed trigger data and the
    /// caller's bridge data, using this connector's casing.
    fn transform(
        &self,
        bridge: &BridgeProviderData,
        trigger_data: &Map<String, Value>,
    ) -> TransformedRequest {
        transform(self.casing(), bridge, trigger_data)
    }

    /// Deliver a message.
    ///
    /// Succeeds on full or partial delivery. Options for another channel are
    /// rejected with a validation error before any network call.
    fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> impl std::future::Future<Output = Result<SendResponse, ConnectorError>> + Send;
}

/// Object-safe connector trait for use behind `Arc<dyn DynConnector>`.
///
/// Implement [`Connector`] instead and rely on the blanket implementation.
#[async_trait]
pub trait DynConnector: Send + Sync {
    fn id(&self) -> &str;

    fn channel(&self) -> ChannelType;

    fn casing(&self) -> Casing;

    fn auth_strategy(&self) -> AuthStrategy;

    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError>;
}

#[async_trait]
impl<T: Connector + Sync> DynConnector for T {
    fn id(&self) -> &str {
        Connector::id(self)
    }

    fn channel(&self) -> ChannelType {
        Connector::channel(self)
    }

    fn casing(&self) -> Casing {
        Connector::casing(self)
    }

    fn auth_strategy(&self) -> AuthStrategy {
        Connector::auth_strategy(self)
    }

    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        Connector::send(self, options, bridge).await
    }
}

/// Probe a connector's configuration by sending `options` for real.
///
/// A provider refusal with 401 or 403 is reported as bad credentials; every
/// other failure as a generic failure.
pub async fn check_integration(
    connector: &dyn DynConnector,
    options: &MessageOptions,
) -> CheckIntegrationResponse {
    match connector.send(options, &BridgeProviderData::default()).await {
        Ok(_) => {
            debug!(provider = connector.id(), "integration check passed");
            CheckIntegrationResponse::success()
        }
        Err(err) => {
            warn!(
                provider = connector.id(),
                status = err.status_code,
                error = %err,
                "integration check failed"
            );
            CheckIntegrationResponse::failure(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::message::{ChatOptions, SmsOptions};
    use crate::response::CheckIntegrationCode;

    struct EchoConnector {
        fail_with: Option<u16>,
    }

    impl Connector for EchoConnector {
        fn id(&self) -> &str {
            "echo"
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

        async fn send(
            &self,
            options: &MessageOptions,
            bridge: &BridgeProviderData,
        ) -> Result<SendResponse, ConnectorError> {
            let sms = options.sms()?;
            if let Some(status) = self.fail_with {
                return Err(ConnectorError::provider_rejection(status, "refused"));
            }
            let mut trigger = Map::new();
            trigger.insert("to".into(), json!(sms.to));
            let request = self.transform(bridge, &trigger);
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            Ok(SendResponse::with_id(
                now,
                request.body.get("To").and_then(Value::as_str).map(str::to_owned),
            ))
        }
    }

    #[tokio::test]
    async fn send_through_dyn_connector() {
        let connector: Arc<dyn DynConnector> = Arc::new(EchoConnector { fail_with: None });
        assert_eq!(connector.id(), "echo");
        assert_eq!(connector.channel(), ChannelType::Sms);
        assert_eq!(connector.casing(), Casing::PascalCase);

        let resp = connector
            .send(&SmsOptions::new("+1555", "hi").into(), &BridgeProviderData::new())
            .await
            .unwrap();
        assert_eq!(resp.id.as_deref(), Some("+1555"));
        assert_eq!(resp.date, "2024-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn wrong_channel_rejected_before_sending() {
        let connector = EchoConnector { fail_with: None };
        let err = Connector::send(
            &connector,
            &ChatOptions::new("hi").into(),
            &BridgeProviderData::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[tokio::test]
    async fn check_integration_classifies_failures() {
        let options: MessageOptions = SmsOptions::new("+1555", "hi").into();

        let ok = check_integration(&EchoConnector { fail_with: None }, &options).await;
        assert!(ok.success);
        assert_eq!(ok.code, CheckIntegrationCode::Success);

        let denied = check_integration(&EchoConnector { fail_with: Some(401) }, &options).await;
        assert_eq!(denied.code, CheckIntegrationCode::BadCredentials);

        let failed = check_integration(&EchoConnector { fail_with: Some(429) }, &options).await;
        assert!(!failed.success);
        assert_eq!(failed.code, CheckIntegrationCode::Failed);
        assert_eq!(failed.message, "refused");
    }
}
