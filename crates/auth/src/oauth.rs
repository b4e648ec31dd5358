use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cache::{CachedCredential, CredentialCache};
use crate::error::AuthError;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scope requested for Firebase Cloud Messaging.
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Lifetime of the signed assertion sent to the token endpoint.
const ASSERTION_TTL_SECS: i64 = 3600;

/// A cached access token is refreshed once it is this close to expiry.
pub const REFRESH_MARGIN_SECS: i64 = 300;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_owned()
}

/// The fields of a Google service-account JSON key that the exchange uses.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            client_email: client_email.into(),
            private_key: private_key.into(),
            token_uri: default_token_uri(),
        }
    }

    /// Override the token endpoint (useful for testing).
    #[must_use]
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri = uri.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges a signed RS256 assertion for an OAuth access token and caches
/// the result until [`REFRESH_MARGIN_SECS`] before it expires.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    client: reqwest::Client,
    cache: CredentialCache<String>,
}

impl std::fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    /// Create a token source for [`FIREBASE_MESSAGING_SCOPE`].
    pub fn new(key: ServiceAccountKey) -> Result<Self, AuthError> {
        Self::with_client(key, reqwest::Client::new())
    }

    /// Create a token source that uses a pre-configured HTTP client.
    pub fn with_client(key: ServiceAccountKey, client: reqwest::Client) -> Result<Self, AuthError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(AuthError::InvalidKey)?;
        Ok(Self {
            key,
            encoding_key,
            scope: FIREBASE_MESSAGING_SCOPE.to_owned(),
            client,
            cache: CredentialCache::new(),
        })
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// A valid access token at `now`, exchanging a new assertion when the
    /// cached token is missing or within the refresh margin.
    pub async fn access_token(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let entry = self
            .cache
            .get_or_refresh(now, TimeDelta::seconds(REFRESH_MARGIN_SECS), || {
                self.exchange(now)
            })
            .await?;
        Ok(entry.value.clone())
    }

    /// Build the signed assertion issued at `now`.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Perform one assertion exchange against the token endpoint.
    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    pub async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedCredential<String>, AuthError> {
        let assertion = self.assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "token exchange rejected");
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        debug!(expires_in = token.expires_in, "obtained access token");

        let expires_at = TimeDelta::try_seconds(token.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::MalformedResponse(format!(
                    "expires_in out of range: {}",
                    token.expires_in
                ))
            })?;

        Ok(CachedCredential::new(token.access_token, expires_at))
    }

    /// Forget the cached access token.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use herald_core::testing::{MockResponse, MockServer};
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;
    use crate::testing::{RSA_PRIVATE_KEY_PEM, RSA_PUBLIC_KEY_PEM};

    #[derive(Debug, Deserialize)]
    struct Claims {
        iss: String,
        scope: String,
        aud: String,
        iat: i64,
        exp: i64,
    }

    fn key(token_uri: &str) -> ServiceAccountKey {
        ServiceAccountKey::new(
            "demo-project",
            "sender@demo-project.iam.gserviceaccount.com",
            RSA_PRIVATE_KEY_PEM,
        )
        .with_token_uri(token_uri)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn assertion_claims() {
        let source = ServiceAccountTokenSource::new(key(GOOGLE_TOKEN_URI)).unwrap();
        let jwt = source.assertion(t0()).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.set_audience(&[GOOGLE_TOKEN_URI]);
        let decoding = DecodingKey::from_rsa_pem(RSA_PUBLIC_KEY_PEM.as_bytes()).unwrap();
        let claims = decode::<Claims>(&jwt, &decoding, &validation).unwrap().claims;

        assert_eq!(claims.iss, "sender@demo-project.iam.gserviceaccount.com");
        assert_eq!(claims.scope, FIREBASE_MESSAGING_SCOPE);
        assert_eq!(claims.aud, GOOGLE_TOKEN_URI);
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[tokio::test]
    async fn exchanges_and_caches_token() {
        let server = MockServer::respond_always(MockResponse::json(
            200,
            r#"{"access_token":"ya29.token","expires_in":3599,"token_type":"Bearer"}"#,
        ))
        .await;
        let token_uri = format!("{}/token", server.base_url());
        let source = ServiceAccountTokenSource::new(key(&token_uri)).unwrap();

        assert_eq!(source.access_token(t0()).await.unwrap(), "ya29.token");
        // 50 minutes later the token still has ~10 minutes left: reused.
        let later = t0() + TimeDelta::minutes(50);
        assert_eq!(source.access_token(later).await.unwrap(), "ya29.token");
        assert_eq!(server.requests().await.len(), 1);

        // 59 minutes in, inside the refresh margin: exchanged again.
        let stale = t0() + TimeDelta::minutes(59);
        source.access_token(stale).await.unwrap();

        let requests = server.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/token");
        let form: Vec<(String, String)> = serde_urlencoded::from_str(&requests[0].body).unwrap();
        assert!(form.contains(&("grant_type".to_owned(), JWT_BEARER_GRANT.to_owned())));
        assert!(form.iter().any(|(k, v)| k == "assertion" && v.split('.').count() == 3));
    }

    #[tokio::test]
    async fn rejected_exchange_surfaces_status() {
        let server = MockServer::respond_always(MockResponse::json(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#,
        ))
        .await;
        let token_uri = format!("{}/token", server.base_url());
        let source = ServiceAccountTokenSource::new(key(&token_uri)).unwrap();

        let err = source.access_token(t0()).await.unwrap_err();
        match err {
            AuthError::Exchange { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid JWT Signature.");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(source.cache.current().await.is_none());
    }

    #[tokio::test]
    async fn malformed_token_response() {
        let server = MockServer::respond_always(MockResponse::json(200, r#"{"unexpected":true}"#)).await;
        let token_uri = format!("{}/token", server.base_url());
        let source = ServiceAccountTokenSource::new(key(&token_uri)).unwrap();

        let err = source.access_token(t0()).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn out_of_range_lifetime_is_malformed() {
        let server = MockServer::respond_always(MockResponse::json(
            200,
            r#"{"access_token":"t","expires_in":9223372036854775807}"#,
        ))
        .await;
        let token_uri = format!("{}/token", server.base_url());
        let source = ServiceAccountTokenSource::new(key(&token_uri)).unwrap();

        let err = source.access_token(t0()).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
        assert!(source.cache.current().await.is_none());
    }

    #[test]
    fn service_account_json_defaults_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"project_id":"p","client_email":"e@p.iam","private_key":"k","type":"service_account"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, GOOGLE_TOKEN_URI);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("\"k\""));
    }

    #[test]
    fn invalid_private_key() {
        let err = ServiceAccountTokenSource::new(ServiceAccountKey::new("p", "e", "nope")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidKey(_)));
    }
}
