//! Twilio SMS connector for Herald.
//!
//! Implements [`Connector`](herald_core::Connector) on top of the
//! [Twilio Messages API](https://www.twilio.com/docs/sms/api/message-resource):
//! PascalCase form fields, HTTP Basic auth.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use herald_twilio::{TwilioConfig, TwilioConnector};
//!
//! let config = TwilioConfig::new("ACXXXXXXXX", "auth_token").with_from("+15551234567");
//! let connector = TwilioConnector::new(config);
//! ```

pub mod config;
pub mod connector;
pub mod types;

pub use config::TwilioConfig;
pub use connector::TwilioConnector;
pub use types::{TwilioErrorResponse, TwilioMessageResponse};
