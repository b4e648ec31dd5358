use std::sync::Arc;

use herald_auth::{AwsCredentials, SigV4Signer, SignableRequest, canonical_query};
use herald_core::http::{apply_passthrough_headers, default_client};
use herald_core::{
    AuthStrategy, BridgeProviderData, Casing, ChannelType, Clock, Connector, ConnectorError,
    MessageOptions, SendResponse, SmsOptions, SystemClock,
};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::SnsConfig;
use crate::types::{SnsErrorResponse, message_id};

const SERVICE: &str = "sns";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sends SMS by publishing to a phone number through Amazon SNS.
pub struct SnsConnector {
    config: SnsConfig,
    signer: SigV4Signer,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl SnsConnector {
    pub fn new(config: SnsConfig) -> Self {
        Self::with_client(config, default_client())
    }

    /// Create a connector with a custom HTTP client.
    pub fn with_client(config: SnsConfig, client: Client) -> Self {
        let mut credentials =
            AwsCredentials::new(&config.access_key_id, &config.secret_access_key);
        if let Some(token) = &config.session_token {
            credentials = credentials.with_session_token(token);
        }
        let signer = SigV4Signer::new(credentials, &config.region, SERVICE);
        Self {
            config,
            signer,
            client,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn publish_url(&self) -> Result<Url, ConnectorError> {
        let endpoint = format!("{}/", self.config.endpoint());
        Url::parse(&endpoint).map_err(|e| {
            ConnectorError::validation(format!("invalid SNS endpoint {endpoint}: {e}"))
        })
    }

    fn trigger_data(sms: &SmsOptions) -> Map<String, Value> {
        let mut trigger = Map::new();
        trigger.insert("Action".into(), "Publish".into());
        trigger.insert("PhoneNumber".into(), sms.to.as_str().into());
        trigger.insert("Message".into(), sms.content.as_str().into());
        trigger
    }
}

/// The `Host` header value reqwest sends for `url`.
fn host_header(url: &Url) -> Result<String, ConnectorError> {
    let host = url
        .host_str()
        .ok_or_else(|| ConnectorError::validation(format!("SNS endpoint {url} has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

impl Connector for SnsConnector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn id(&self) -> &str {
        "sns"
    }

    fn channel(&self) -> ChannelType {
        ChannelType::Sms
    }

    fn casing(&self) -> Casing {
        Casing::PascalCase
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::RequestSigning
    }

    #[instrument(skip(self, options, bridge), fields(provider = "sns", region = %self.config.region))]
    async fn send(
        &self,
        options: &MessageOptions,
        bridge: &BridgeProviderData,
    ) -> Result<SendResponse, ConnectorError> {
        let sms = options.sms()?;
        let request = self.transform(bridge, &Self::trigger_data(sms));

        let body = serde_urlencoded::to_string(request.form_fields())
            .map_err(|e| ConnectorError::validation(format!("cannot encode SNS request: {e}")))?;
        let mut url = self.publish_url()?;
        let host = host_header(&url)?;
        let query: Vec<(String, String)> = request
            .query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let signed = self.signer.sign(
            &SignableRequest {
                method: "POST",
                host: &host,
                path: url.path(),
                query: &query,
                content_type: FORM_CONTENT_TYPE,
                payload: body.as_bytes(),
            },
            self.clock.now(),
        )?;

        // The query goes out byte-for-byte as signed, not form-encoded.
        if !query.is_empty() {
            url.set_query(Some(&canonical_query(&query)));
        }

        debug!(to = %sms.to, "publishing SMS via SNS");

        let builder = signed.apply(
            self.client
                .post(url)
                .header("content-type", FORM_CONTENT_TYPE)
                .body(body),
        );
        let response = apply_passthrough_headers(builder, &request).send().await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let error = SnsErrorResponse::from_xml(&text);
            warn!(status = status.as_u16(), code = ?error.code, "SNS rejected the publish");
            return Err(ConnectorError::from_response(
                status.as_u16(),
                Some(&error),
                format!("request failed with status code {}", status.as_u16()),
            ));
        }

        let id = message_id(&text);
        debug!(message_id = %id, "SNS accepted the publish");

        Ok(SendResponse::with_id(self.clock.now(), Some(id)))
    }
}
