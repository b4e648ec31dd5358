use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::cache::CachedCredential;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Characters AWS leaves unescaped: `A-Z a-z 0-9 - _ . ~`.
const AWS_URI_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Long-lived AWS credentials.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a [(String, String)],
    pub content_type: &'a str,
    pub payload: &'a [u8],
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

impl SignedHeaders {
    /// Attach the signature headers to `builder`.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("authorization", &self.authorization)
            .header("x-amz-date", &self.amz_date);
        match &self.security_token {
            Some(token) => builder.header("x-amz-security-token", token),
            None => builder,
        }
    }
}

/// AWS Signature Version 4 request signer for one region and service.
///
/// The derived signing key depends only on the date, so it is cached until
/// the UTC day rolls over.
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
    signing_key: Mutex<Option<CachedCredential<(String, Vec<u8>)>>>,
}

impl std::fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("credentials", &self.credentials)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl SigV4Signer {
    pub fn new(
        credentials: AwsCredentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
            signing_key: Mutex::new(None),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign `request` as of `now`.
    pub fn sign(
        &self,
        request: &SignableRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<SignedHeaders, AuthError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);

        let token = self.credentials.session_token.as_deref();
        let (canonical, signed_headers) = canonical_request(request, &amz_date, token);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical.as_bytes()))
        );

        let key = self.signing_key_for(&date, now)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(SignedHeaders {
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id
            ),
            amz_date,
            security_token: token.map(str::to_owned),
        })
    }

    fn signing_key_for(&self, date: &str, now: DateTime<Utc>) -> Result<Vec<u8>, AuthError> {
        let mut slot = self
            .signing_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = slot.as_ref()
            && cached.value.0 == date
            && cached.expires_at > now
        {
            return Ok(cached.value.1.clone());
        }

        let key = derive_signing_key(
            &self.credentials.secret_access_key,
            date,
            &self.region,
            &self.service,
        )?;
        *slot = Some(CachedCredential::new(
            (date.to_owned(), key.clone()),
            next_utc_midnight(now),
        ));
        Ok(key)
    }
}

/// Derive the SigV4 signing key for one (date, region, service) scope.
pub fn derive_signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, AuthError> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Build the canonical request and the signed-header list.
fn canonical_request(
    request: &SignableRequest<'_>,
    amz_date: &str,
    security_token: Option<&str>,
) -> (String, String) {
    let mut headers = vec![
        ("content-type", request.content_type.trim()),
        ("host", request.host.trim()),
        ("x-amz-date", amz_date),
    ];
    if let Some(token) = security_token {
        headers.push(("x-amz-security-token", token.trim()));
    }

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical = format!(
        "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{}",
        request.method.to_uppercase(),
        canonical_uri(request.path),
        canonical_query(request.query),
        hex::encode(Sha256::digest(request.payload)),
    );
    (canonical, signed_headers)
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// The query string as it is signed: pairs encoded with [`uri_encode`] and
/// sorted. A signed request must send exactly this string.
pub fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode with the AWS unreserved set.
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, AWS_URI_ENCODE).to_string()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .map_or(now, |day| day.and_time(NaiveTime::MIN).and_utc())
}
