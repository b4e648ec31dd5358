//! Short-lived credential derivation for Herald connectors.
//!
//! Three strategies share one [`CredentialCache`]:
//!
//! - [`ProviderTokenSigner`]: an ES256 provider token signed locally and
//!   reused for 50 minutes (APNs).
//! - [`ServiceAccountTokenSource`]: an RS256 assertion exchanged for an OAuth
//!   access token, refreshed 5 minutes before it expires (FCM).
//! - [`SigV4Signer`]: AWS Signature Version 4 request signing with a per-day
//!   signing key (SNS).

pub mod cache;
pub mod error;
pub mod jwt;
pub mod oauth;
pub mod sigv4;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CachedCredential, CredentialCache};
pub use error::AuthError;
pub use jwt::{PROVIDER_TOKEN_TTL_MINUTES, ProviderTokenSigner};
pub use oauth::{
    FIREBASE_MESSAGING_SCOPE, GOOGLE_TOKEN_URI, REFRESH_MARGIN_SECS, ServiceAccountKey,
    ServiceAccountTokenSource,
};
pub use sigv4::{AwsCredentials, SigV4Signer, SignableRequest, SignedHeaders, canonical_query};
