//! Slack chat connector for Herald.
//!
//! Posts snake_case JSON to a Slack
//! [incoming webhook](https://api.slack.com/messaging/webhooks). The webhook
//! URL comes from the send options or, failing that, from [`SlackConfig`].

pub mod config;
pub mod connector;

pub use config::SlackConfig;
pub use connector::SlackConnector;
