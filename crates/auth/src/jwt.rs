use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use tracing::debug;

use crate::cache::{CachedCredential, CredentialCache};
use crate::error::AuthError;

/// How long a signed provider token is reused. Apple accepts tokens for an
/// hour and rejects refreshes more often than every 20 minutes.
pub const PROVIDER_TOKEN_TTL_MINUTES: i64 = 50;

#[derive(Debug, Serialize)]
struct ProviderTokenClaims<'a> {
    iss: &'a str,
    iat: i64,
}

/// Signs and caches an ES256 provider token (`{alg, kid}` header,
/// `{iss, iat}` claims) as used for token-based APNs authentication.
pub struct ProviderTokenSigner {
    team_id: String,
    key_id: String,
    key: EncodingKey,
    cache: CredentialCache<String>,
}

impl std::fmt::Debug for ProviderTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderTokenSigner")
            .field("team_id", &self.team_id)
            .field("key_id", &self.key_id)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ProviderTokenSigner {
    /// Create a signer from a PKCS#8 P-256 private key in PEM form (the
    /// contents of an Apple `.p8` file).
    pub fn new(
        team_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key_pem: &[u8],
    ) -> Result<Self, AuthError> {
        let key = EncodingKey::from_ec_pem(private_key_pem).map_err(AuthError::InvalidKey)?;
        Ok(Self {
            team_id: team_id.into(),
            key_id: key_id.into(),
            key,
            cache: CredentialCache::new(),
        })
    }

    /// A valid token at `now`, signing a new one when the cached token is
    /// older than [`PROVIDER_TOKEN_TTL_MINUTES`].
    pub async fn token(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let entry = self
            .cache
            .get_or_refresh(now, TimeDelta::zero(), || async {
                let token = self.sign(now)?;
                debug!(key_id = %self.key_id, "signed new provider token");
                Ok::<_, AuthError>(CachedCredential::new(
                    token,
                    now + TimeDelta::minutes(PROVIDER_TOKEN_TTL_MINUTES),
                ))
            })
            .await?;
        Ok(entry.value.clone())
    }

    /// Sign a fresh token issued at `now`, bypassing the cache.
    pub fn sign(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::ES256);
        header.typ = None;
        header.kid = Some(self.key_id.clone());

        let claims = ProviderTokenClaims {
            iss: &self.team_id,
            iat: now.timestamp(),
        };
        encode(&header, &claims, &self.key).map_err(AuthError::Signing)
    }

    /// Forget the cached token, e.g. after the provider reported it expired.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }
}
