//! Parsed form of an incoming verification link.

use url::Url;

/// The parts of a deep link that matter for verification.
///
/// A link such as `telesign://verify?123456` carries the code as the whole
/// raw query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkRequest {
    pub scheme: String,
    pub host: String,
    /// Raw query, `None` when absent or empty
    pub code: Option<String>,
}

impl DeepLinkRequest {
    /// Parse a URL string. Returns `None` when it is not a URL or has no host.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw.trim()).ok()?;
        let host = url.host_str().filter(|host| !host.is_empty())?.to_string();

        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            code: url
                .query()
                .filter(|query| !query.is_empty())
                .map(str::to_string),
        })
    }

    /// Case-insensitive match on host. The scheme is only compared when a
    /// non-empty `scheme` filter is configured.
    pub fn targets(&self, scheme: &str, host: &str) -> bool {
        let scheme_matches = scheme.is_empty() || self.scheme.eq_ignore_ascii_case(scheme);
        scheme_matches && self.host.eq_ignore_ascii_case(host)
    }
}
