//! AWS SNS SMS connector for Herald.
//!
//! Publishes directly to a phone number through the SNS Query API. Request
//! keys are PascalCase, the body is form-encoded, and every request is signed
//! with AWS Signature Version 4 via [`herald_auth::SigV4Signer`].

pub mod config;
pub mod connector;
pub mod types;

pub use config::SnsConfig;
pub use connector::SnsConnector;
