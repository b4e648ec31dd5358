use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::casing::{Casing, transform_keys};
use crate::error::ConnectorError;
use crate::merge::deep_merge;

/// Reserved key carrying the passthrough override inside raw bridge data.
pub const PASSTHROUGH_KEY: &str = "_passthrough";

/// Caller-supplied raw override.
///
/// The body is merged last and never re-cased; headers and query are handed
/// to the transport exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Passthrough {
    #[serde(default)]
    pub body: Map<String, Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// Provider data supplied alongside a send: known fields that get cased,
/// plus an optional passthrough override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeProviderData {
    pub known: Map<String, Value>,
    pub passthrough: Option<Passthrough>,
}

impl BridgeProviderData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a raw mapping into known fields and the [`PASSTHROUGH_KEY`]
    /// override.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self, ConnectorError> {
        let passthrough = match map.remove(PASSTHROUGH_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value(raw).map_err(|e| {
                ConnectorError::validation(format!("invalid {PASSTHROUGH_KEY} value: {e}"))
            })?),
        };
        Ok(Self {
            known: map,
            passthrough,
        })
    }

    #[must_use]
    pub fn with_known(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.known.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = Some(passthrough);
        self
    }
}

/// Final request shape handed to a connector's transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformedRequest {
    pub body: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl TransformedRequest {
    /// Flatten the body into form fields, in body key order.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.body
            .iter()
            .map(|(key, value)| (key.clone(), form_value(value)))
            .collect()
    }
}

/// Shape the outbound request for a provider using `casing`.
///
/// Precedence, lowest to highest: internally computed `trigger_data`, the
/// cased known caller fields, the raw passthrough body.
pub fn transform(
    casing: Casing,
    bridge: &BridgeProviderData,
    trigger_data: &Map<String, Value>,
) -> TransformedRequest {
    let cased_trigger = transform_keys(trigger_data, casing);
    let cased_known = transform_keys(&bridge.known, casing);

    let mut body = Map::new();
    deep_merge(&mut body, [&cased_trigger, &cased_known]);

    match &bridge.passthrough {
        Some(passthrough) => {
            deep_merge(&mut body, [&passthrough.body]);
            TransformedRequest {
                body,
                headers: passthrough.headers.clone(),
                query: passthrough.query.clone(),
            }
        }
        None => TransformedRequest {
            body,
            ..TransformedRequest::default()
        },
    }
}

/// Render a body value as a single form field.
pub fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
