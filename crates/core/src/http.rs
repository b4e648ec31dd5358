//! Helpers shared by the HTTP-based connectors.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::transform::TransformedRequest;

/// Request timeout used by [`default_client`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client with the connector defaults, falling back to a plain
/// client if the builder fails.
pub fn default_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Attach the passthrough headers and query of `request` to `builder`.
///
/// Passthrough headers are applied last so they override anything the
/// connector set. An invalid header name or value surfaces as a transport
/// error when the request is sent.
pub fn apply_passthrough(builder: RequestBuilder, request: &TransformedRequest) -> RequestBuilder {
    let builder = if request.query.is_empty() {
        builder
    } else {
        builder.query(&request.query)
    };
    apply_passthrough_headers(builder, request)
}

/// Attach only the passthrough headers of `request`, for connectors that
/// encode the query into the URL themselves.
pub fn apply_passthrough_headers(
    builder: RequestBuilder,
    request: &TransformedRequest,
) -> RequestBuilder {
    request
        .headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name, value))
}
