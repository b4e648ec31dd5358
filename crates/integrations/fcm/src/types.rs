use herald_core::ProviderErrorBody;
use serde::Deserialize;

/// Successful `messages:send` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmSendResponse {
    /// Message resource name, `projects/{project}/messages/{id}`.
    pub name: String,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorResponse {
    pub error: FcmErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorDetail {
    pub code: Option<i64>,
    pub message: Option<String>,
    /// Canonical status, e.g. `NOT_FOUND`.
    pub status: Option<String>,
}

impl ProviderErrorBody for FcmErrorResponse {
    fn provider_code(&self) -> Option<String> {
        self.error.code.map(|code| code.to_string())
    }

    fn provider_message(&self) -> Option<String> {
        self.error.message.clone()
    }
}
