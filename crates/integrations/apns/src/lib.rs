//! Apple Push Notification service connector for Herald.
//!
//! Each device token gets its own `POST /3/device/{token}` carrying an ES256
//! provider token ([`herald_auth::ProviderTokenSigner`]). APNs only speaks
//! HTTP/2; reqwest negotiates it over TLS via ALPN. Partial delivery is
//! reported per token.

pub mod config;
pub mod connector;
pub mod types;

pub use config::ApnsConfig;
pub use connector::ApnsConnector;
