use std::sync::LazyLock;

use herald_core::ProviderErrorBody;
use regex::Regex;

// SNS answers in XML, but only a handful of leaf values are ever needed, so
// they are pulled out with a pattern rather than a full parse.
static MESSAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<MessageId>([^<]+)</MessageId>").expect("MessageId regex is valid")
});

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Code>([^<]+)</Code>").expect("Code regex is valid"));

static MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Message>([^<]+)</Message>").expect("Message regex is valid"));

/// Text of the first element `pattern` matches in `xml`.
fn extract(pattern: &Regex, xml: &str) -> Option<String> {
    pattern
        .captures(xml)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Message id from a `PublishResponse`, or an empty string when absent.
pub fn message_id(xml: &str) -> String {
    extract(&MESSAGE_ID_RE, xml).unwrap_or_default()
}

/// The `<Error>` element of an SNS `ErrorResponse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnsErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl SnsErrorResponse {
    pub fn from_xml(xml: &str) -> Self {
        Self {
            code: extract(&CODE_RE, xml),
            message: extract(&MESSAGE_RE, xml),
        }
    }
}

impl ProviderErrorBody for SnsErrorResponse {
    fn provider_code(&self) -> Option<String> {
        self.code.clone()
    }

    fn provider_message(&self) -> Option<String> {
        self.message.clone()
    }
}
