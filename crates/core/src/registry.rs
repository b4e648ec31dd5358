use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::ChannelType;
use crate::connector::DynConnector;

/// Maps connector ids to their implementations.
///
/// Built once at startup and then shared; mutation is not synchronized.
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn DynConnector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self {
            connectors: HashMap::new(),
        }
    }

    /// Register a connector under its [`DynConnector::id`], replacing any
    /// connector already registered with that id.
    pub fn register(&mut self, connector: Arc<dyn DynConnector>) {
        let id = connector.id().to_owned();
        self.connectors.insert(id, connector);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DynConnector>> {
        self.connectors.get(id).cloned()
    }

    /// Sorted ids of every registered connector.
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of the connectors serving `channel`.
    pub fn for_channel(&self, channel: ChannelType) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .connectors
            .iter()
            .filter(|(_, c)| c.channel() == channel)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::casing::Casing;
    use crate::channel::AuthStrategy;
    use crate::connector::Connector;
    use crate::error::ConnectorError;
    use crate::message::{MessageOptions, SmsOptions};
    use crate::response::SendResponse;
    use crate::transform::BridgeProviderData;

    struct StubConnector {
        id: String,
        channel: ChannelType,
    }

    impl StubConnector {
        fn new(id: &str, channel: ChannelType) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_owned(),
                channel,
            })
        }
    }

    impl Connector for StubConnector {
        fn id(&self) -> &str {
            &self.id
        }

        fn channel(&self) -> ChannelType {
            self.channel
        }

        fn casing(&self) -> Casing {
            Casing::SnakeCase
        }

        fn auth_strategy(&self) -> AuthStrategy {
            AuthStrategy::WebhookUrl
        }

        async fn send(
            &self,
            _options: &MessageOptions,
            _bridge: &BridgeProviderData,
        ) -> Result<SendResponse, ConnectorError> {
            Ok(SendResponse::with_id(Utc::now(), Some(self.id.clone())))
        }
    }

    #[test]
    fn empty_registry() {
        let reg = ConnectorRegistry::default();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.list().is_empty());
    }

    #[test]
    fn register_get_and_list() {
        let mut reg = ConnectorRegistry::new();
        reg.register(StubConnector::new("twilio", ChannelType::Sms));
        reg.register(StubConnector::new("apns", ChannelType::Push));
        reg.register(StubConnector::new("sns", ChannelType::Sms));

        assert_eq!(reg.len(), 3);
        assert_eq!(reg.list(), vec!["apns", "sns", "twilio"]);
        assert_eq!(reg.for_channel(ChannelType::Sms), vec!["sns", "twilio"]);
        assert!(reg.for_channel(ChannelType::Email).is_empty());
        assert!(reg.get("fcm").is_none());
        assert_eq!(reg.get("apns").map(|c| c.channel()), Some(ChannelType::Push));
    }

    #[test]
    fn register_replaces_existing() {
        let mut reg = ConnectorRegistry::new();
        reg.register(StubConnector::new("slack", ChannelType::Chat));
        reg.register(StubConnector::new("slack", ChannelType::Chat));
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn send_through_registry() {
        let mut reg = ConnectorRegistry::new();
        reg.register(StubConnector::new("twilio", ChannelType::Sms));

        let connector = reg.get("twilio").unwrap();
        let resp = connector
            .send(&SmsOptions::new("+1", "hi").into(), &BridgeProviderData::new())
            .await
            .unwrap();
        assert_eq!(resp.id.as_deref(), Some("twilio"));
    }
}
