use herald_core::ProviderErrorBody;
use serde::Deserialize;

/// Successful response from the Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioMessageResponse {
    /// Message SID.
    pub sid: Option<String>,

    /// Delivery status, e.g. `"queued"`.
    pub status: Option<String>,
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioErrorResponse {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub more_info: Option<String>,
}

impl ProviderErrorBody for TwilioErrorResponse {
    fn provider_code(&self) -> Option<String> {
        self.code.map(|code| code.to_string())
    }

    fn provider_message(&self) -> Option<String> {
        self.message.clone()
    }
}
