//! Shaping of the FCM v1 `message` object.

use herald_core::{PushKind, PushOptions, form_value};
use serde_json::{Map, Value, json};

/// Where a message is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address<'a> {
    Token(&'a str),
    Topic(&'a str),
}

/// Everything about a push except its address, resolved once per send from
/// the transformed body and the push options.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    pub kind: PushKind,
    pub title: String,
    pub body: String,
    /// Custom payload and `data` override, stringified, `data` winning.
    pub data: Map<String, Value>,
    /// Whether a `data` override was supplied at all.
    pub has_data_override: bool,
    pub android: Option<Value>,
    pub apns: Option<Value>,
    pub fcm_options: Option<Value>,
    pub webpush: Option<Value>,
}

impl MessageTemplate {
    /// Resolve the template from a snake_cased transformed `body`, falling
    /// back to the push options for the title and body text.
    pub fn resolve(body: &Map<String, Value>, push: &PushOptions) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_owned);
        let object = |key: &str| body.get(key).filter(|v| !v.is_null()).cloned();

        let kind = match body.get("type").and_then(Value::as_str) {
            Some("data") => PushKind::Data,
            _ => PushKind::Notification,
        };

        let data_override = body.get("data").and_then(Value::as_object);
        let mut data = stringify(&push.payload);
        if let Some(overrides) = data_override {
            data.extend(stringify(overrides));
        }

        Self {
            kind,
            title: text("title").unwrap_or_else(|| push.title.clone()),
            body: text("body").unwrap_or_else(|| push.content.clone()),
            data,
            has_data_override: data_override.is_some(),
            android: object("android"),
            apns: object("apns"),
            fcm_options: object("fcm_options"),
            webpush: object("web_push"),
        }
    }

    /// Build the `message` object for one address.
    pub fn message(&self, address: Address<'_>) -> Value {
        let mut message = Map::new();
        match address {
            Address::Token(token) => message.insert("token".into(), token.into()),
            Address::Topic(topic) => message.insert("topic".into(), topic.into()),
        };

        match self.kind {
            PushKind::Data => {
                let mut data = Map::new();
                data.insert("title".into(), self.title.as_str().into());
                data.insert("body".into(), self.body.as_str().into());
                data.extend(self.data.clone());
                message.insert("data".into(), Value::Object(data));
            }
            PushKind::Notification => {
                message.insert(
                    "notification".into(),
                    json!({ "title": self.title, "body": self.body }),
                );
                if self.has_data_override || !self.data.is_empty() {
                    message.insert("data".into(), Value::Object(self.data.clone()));
                }
            }
        }

        let platform = [
            ("android", &self.android),
            ("apns", &self.apns),
            ("fcm_options", &self.fcm_options),
            ("webpush", &self.webpush),
        ];
        for (key, value) in platform {
            if let Some(value) = value {
                message.insert(key.into(), value.clone());
            }
        }

        Value::Object(message)
    }
}

/// FCM data values must be strings; anything else is JSON-encoded.
fn stringify(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), Value::String(form_value(value))))
        .collect()
}
