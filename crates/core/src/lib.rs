//! Shared dispatch pipeline for Herald connectors.
//!
//! Every connector reuses the same steps: payload keys are re-cased to the
//! provider's convention ([`casing`]), layered with caller overrides
//! ([`merge`], [`transform`]), sent to one or many targets ([`fanout`]), and
//! any failure is reported as a single [`ConnectorError`] shape.
//!
//! # Quick start
//!
//! ```rust
//! use herald_core::{BridgeProviderData, Casing, transform};
//! use serde_json::{Map, json};
//!
//! let mut trigger = Map::new();
//! trigger.insert("title".into(), json!("T"));
//!
//! let bridge = BridgeProviderData::new().with_known("threadId", "x");
//! let request = transform(Casing::SnakeCase, &bridge, &trigger);
//! assert_eq!(request.body["thread_id"], "x");
//! ```

pub mod casing;
pub mod channel;
pub mod clock;
pub mod connector;
pub mod error;
pub mod fanout;
#[cfg(feature = "http")]
pub mod http;
pub mod merge;
pub mod message;
pub mod registry;
pub mod response;
#[cfg(feature = "testing")]
pub mod testing;
pub mod transform;

pub use casing::{Casing, split_words, transform_keys};
pub use channel::{AuthStrategy, ChannelType};
#[cfg(feature = "testing")]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use connector::{Connector, DynConnector, check_integration};
pub use error::{ConnectorError, DEFAULT_STATUS_CODE, ErrorKind, ProviderErrorBody};
pub use fanout::{TargetOutcome, classify, fan_out, settle, single};
pub use merge::{deep_merge, deep_merge_entries};
pub use message::{
    ChatOptions, EmailOptions, MessageOptions, PushKind, PushOptions, PushOverrides, SmsOptions,
};
pub use registry::ConnectorRegistry;
pub use response::{CheckIntegrationCode, CheckIntegrationResponse, SendResponse, timestamp};
pub use transform::{
    BridgeProviderData, PASSTHROUGH_KEY, Passthrough, TransformedRequest, form_value, transform,
};
