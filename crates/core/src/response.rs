use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

/// Result of a successful (full or partial) send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// One entry per target for fan-out sends: a provider id, or the reason
    /// that target failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// RFC 3339 UTC timestamp.
    pub date: String,
}

impl SendResponse {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            ids: None,
            date: timestamp(now),
        }
    }

    /// A single-message response.
    pub fn with_id(now: DateTime<Utc>, id: Option<String>) -> Self {
        Self {
            id,
            ..Self::new(now)
        }
    }

    /// A fan-out response.
    pub fn with_ids(now: DateTime<Utc>, ids: Vec<String>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::new(now)
        }
    }
}

/// Format `now` the way response dates are reported, e.g.
/// `2024-01-01T00:00:00.000Z`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIntegrationCode {
    Success,
    BadCredentials,
    Failed,
}

/// Outcome of probing a connector's configuration with a real send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIntegrationResponse {
    pub success: bool,
    pub message: String,
    pub code: CheckIntegrationCode,
}

impl CheckIntegrationResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            message: "Integrated successfully!".to_owned(),
            code: CheckIntegrationCode::Success,
        }
    }

    /// Classify a send failure: 401/403 mean bad credentials, anything else
    /// is a generic failure.
    pub fn failure(err: &ConnectorError) -> Self {
        let code = if err.is_bad_credentials() {
            CheckIntegrationCode::BadCredentials
        } else {
            CheckIntegrationCode::Failed
        };
        Self {
            success: false,
            message: err.message.clone(),
            code,
        }
    }
}
