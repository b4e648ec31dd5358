//! Firebase Cloud Messaging push connector for Herald.
//!
//! Authenticates with a service-account key exchanged for an OAuth access
//! token ([`herald_auth::ServiceAccountTokenSource`]) and sends through the
//! FCM HTTP v1 API. A push to several device tokens becomes one request per
//! token with partial-failure reporting; a `topic` supplied in the bridge
//! data switches to a single broadcast request.

pub mod config;
pub mod connector;
pub mod message;
pub mod types;

pub use config::FcmConfig;
pub use connector::FcmConnector;
