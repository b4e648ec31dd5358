use herald_core::ConnectorError;
use thiserror::Error;

/// Errors raised while deriving a short-lived credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// Signing a token failed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The HMAC key could not be initialised.
    #[error("invalid HMAC key: {0}")]
    Hmac(#[from] hmac::digest::InvalidLength),

    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered with an error.
    #[error("token exchange rejected ({status}): {message}")]
    Exchange { status: u16, message: String },

    /// The token endpoint answered with something that is not a token.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

impl From<AuthError> for ConnectorError {
    fn from(err: AuthError) -> Self {
        let mut converted = Self::credential(err.to_string());
        match &err {
            AuthError::Exchange { status, message } => {
                converted.status_code = *status;
                converted.provider_message = Some(message.clone());
            }
            AuthError::Transport(e) => {
                if let Some(status) = e.status() {
                    converted.status_code = status.as_u16();
                }
            }
            _ => {}
        }
        converted.with_source(err)
    }
}
