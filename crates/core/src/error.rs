use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code reported when the origin of a failure supplies none.
pub const DEFAULT_STATUS_CODE: u16 = 500;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a [`ConnectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required option or configuration value was missing. Raised before
    /// any network call.
    ValidationOmission,
    /// The request never produced a provider response (network, DNS,
    /// timeout, unexpected failure).
    TransportFailure,
    /// The provider answered and declined the request.
    ProviderRejection,
    /// Every target of a multi-target send failed.
    TotalFanOutFailure,
    /// A short-lived credential could not be derived.
    Credential,
}

/// The single error shape surfaced by every connector.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConnectorError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
    pub provider_code: Option<String>,
    pub provider_message: Option<String>,
    #[source]
    pub source: Option<BoxError>,
}

impl ConnectorError {
    fn new(kind: ErrorKind, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code,
            provider_code: None,
            provider_message: None,
            source: None,
        }
    }

    /// A caller configuration error (HTTP 400 semantics).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationOmission, message, 400)
    }

    /// A transport-level failure without a provider status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFailure, message, DEFAULT_STATUS_CODE)
    }

    /// A provider response that declined the request.
    pub fn provider_rejection(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProviderRejection, message, status_code)
    }

    /// A failure to derive a signing credential or access token.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message, DEFAULT_STATUS_CODE)
    }

    /// Aggregate failure for a fan-out where no target succeeded.
    pub fn total_fan_out(attempted: usize, label: &str, reasons: &[String]) -> Self {
        Self::new(
            ErrorKind::TotalFanOutFailure,
            format!("All {attempted} {label} message(s) failed to send"),
            DEFAULT_STATUS_CODE,
        )
        .with_provider_message(reasons.join("; "))
    }

    /// Build a rejection from a provider's structured error body.
    ///
    /// The message comes from the body when it carries one, otherwise from
    /// `fallback`.
    pub fn from_response<B>(status_code: u16, body: Option<&B>, fallback: impl Into<String>) -> Self
    where
        B: ProviderErrorBody + ?Sized,
    {
        let code = body.and_then(ProviderErrorBody::provider_code);
        let provider_message = body.and_then(ProviderErrorBody::provider_message);
        let message = provider_message.clone().unwrap_or_else(|| fallback.into());

        let mut err = Self::provider_rejection(status_code, message);
        err.provider_code = code;
        err.provider_message = provider_message;
        err
    }

    /// Normalize an arbitrary failure.
    ///
    /// An error that already is a [`ConnectorError`] is returned unchanged;
    /// anything else becomes a transport failure carrying its message.
    pub fn normalize(err: BoxError) -> Self {
        match err.downcast::<Self>() {
            Ok(normalized) => *normalized,
            Err(other) => Self::transport(other.to_string()).with_source(other),
        }
    }

    #[must_use]
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_provider_message(mut self, message: impl Into<String>) -> Self {
        self.provider_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Short reason used for per-target failure entries: the provider's
    /// message when known, otherwise the error message.
    pub fn failure_reason(&self) -> &str {
        self.provider_message.as_deref().unwrap_or(&self.message)
    }

    /// Returns `true` when the provider refused the caller's credentials.
    pub fn is_bad_credentials(&self) -> bool {
        matches!(self.status_code, 401 | 403)
    }
}

/// Provider-specific error payload from which a code and message can be
/// extracted.
///
/// Connectors implement this for their provider's error JSON so the field
/// names stay local to the connector.
pub trait ProviderErrorBody {
    fn provider_code(&self) -> Option<String>;
    fn provider_message(&self) -> Option<String>;
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        let status = err
            .status()
            .map_or(DEFAULT_STATUS_CODE, |status| status.as_u16());
        Self::new(ErrorKind::TransportFailure, err.to_string(), status).with_source(err)
    }
}

#[cfg(feature = "http")]
impl ConnectorError {
    /// Turn a non-success HTTP response into a provider rejection.
    ///
    /// The body is decoded as `B` on a best-effort basis; an undecodable body
    /// still yields an error with the response status.
    pub async fn from_http_response<B>(response: reqwest::Response) -> Self
    where
        B: ProviderErrorBody + serde::de::DeserializeOwned,
    {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body: Option<B> = serde_json::from_str(&text).ok();
        Self::from_response(
            status,
            body.as_ref(),
            format!("request failed with status code {status}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct StubErrorBody {
        code: Option<i64>,
        message: Option<String>,
    }

    impl ProviderErrorBody for StubErrorBody {
        fn provider_code(&self) -> Option<String> {
            self.code.map(|c| c.to_string())
        }

        fn provider_message(&self) -> Option<String> {
            self.message.clone()
        }
    }

    #[test]
    fn constructors_set_kind_and_status() {
        let err = ConnectorError::validation("missing webhook url");
        assert_eq!(err.kind, ErrorKind::ValidationOmission);
        assert_eq!(err.status_code, 400);

        let err = ConnectorError::transport("connection reset");
        assert_eq!(err.kind, ErrorKind::TransportFailure);
        assert_eq!(err.status_code, DEFAULT_STATUS_CODE);

        let err = ConnectorError::credential("bad key");
        assert_eq!(err.kind, ErrorKind::Credential);
        assert_eq!(err.status_code, DEFAULT_STATUS_CODE);
    }

    #[test]
    fn from_response_extracts_provider_fields() {
        let body = StubErrorBody {
            code: Some(21211),
            message: Some("Invalid 'To' Phone Number".into()),
        };
        let err = ConnectorError::from_response(400, Some(&body), "fallback");

        assert_eq!(err.kind, ErrorKind::ProviderRejection);
        assert_eq!(err.status_code, 400);
        assert_eq!(err.provider_code.as_deref(), Some("21211"));
        assert_eq!(err.provider_message.as_deref(), Some("Invalid 'To' Phone Number"));
        assert_eq!(err.message, "Invalid 'To' Phone Number");
    }

    #[test]
    fn from_response_without_body_uses_fallback() {
        let err = ConnectorError::from_response::<StubErrorBody>(503, None, "upstream down");
        assert_eq!(err.status_code, 503);
        assert_eq!(err.message, "upstream down");
        assert!(err.provider_code.is_none());
        assert!(err.provider_message.is_none());
    }

    #[test]
    fn normalize_foreign_error_defaults_to_500() {
        let io = std::io::Error::other("socket closed");
        let err = ConnectorError::normalize(Box::new(io));
        assert_eq!(err.kind, ErrorKind::TransportFailure);
        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "socket closed");
        assert!(err.source.is_some());
    }

    #[test]
    fn normalize_is_idempotent() {
        let original = ConnectorError::provider_rejection(403, "InvalidProviderToken")
            .with_provider_code("InvalidProviderToken");
        let once = ConnectorError::normalize(Box::new(original));
        let twice = ConnectorError::normalize(Box::new(once));

        assert_eq!(twice.kind, ErrorKind::ProviderRejection);
        assert_eq!(twice.status_code, 403);
        assert_eq!(twice.provider_code.as_deref(), Some("InvalidProviderToken"));
        assert!(twice.source.is_none(), "must not be wrapped again");
    }

    #[test]
    fn total_fan_out_joins_reasons() {
        let reasons = vec!["BadDeviceToken".to_owned(), "Unregistered".to_owned()];
        let err = ConnectorError::total_fan_out(2, "APNs", &reasons);
        assert_eq!(err.kind, ErrorKind::TotalFanOutFailure);
        assert_eq!(err.status_code, 500);
        assert_eq!(err.to_string(), "All 2 APNs message(s) failed to send");
        assert_eq!(
            err.provider_message.as_deref(),
            Some("BadDeviceToken; Unregistered")
        );
    }

    #[test]
    fn failure_reason_prefers_provider_message() {
        let err = ConnectorError::provider_rejection(400, "HTTP 400").with_provider_message("bad");
        assert_eq!(err.failure_reason(), "bad");
        let err = ConnectorError::transport("timed out");
        assert_eq!(err.failure_reason(), "timed out");
    }

    #[test]
    fn bad_credentials_detection() {
        assert!(ConnectorError::provider_rejection(401, "x").is_bad_credentials());
        assert!(ConnectorError::provider_rejection(403, "x").is_bad_credentials());
        assert!(!ConnectorError::provider_rejection(400, "x").is_bad_credentials());
    }
}
