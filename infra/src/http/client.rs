//! Shared reqwest client construction

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::InfrastructureError;

const USER_AGENT: &str = concat!("AppVerify/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by the token provider and transport
pub fn build_client(timeout: Duration) -> Result<Client, InfrastructureError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Parse a base URL so relative paths join beneath it.
///
/// `https://host/v1/appverify` and `https://host/v1/appverify/` both resolve
/// `sms` to `https://host/v1/appverify/sms`.
pub fn endpoint_base(raw: &str) -> Result<Url, InfrastructureError> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(InfrastructureError::Config(format!(
            "{raw} cannot be used as a base URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Describe a reqwest failure for display
pub(crate) fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("could not connect: {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_base_appends_trailing_slash() {
        let base = endpoint_base("https://av-api-sample.telesign.com/v1/appverify").unwrap();
        assert_eq!(
            base.join("sms").unwrap().as_str(),
            "https://av-api-sample.telesign.com/v1/appverify/sms"
        );

        let base = endpoint_base("https://av-api-sample.telesign.com/v1/appverify/").unwrap();
        assert_eq!(
            base.join("code").unwrap().as_str(),
            "https://av-api-sample.telesign.com/v1/appverify/code"
        );
    }

    #[test]
    fn test_endpoint_base_rejects_invalid_urls() {
        assert!(matches!(endpoint_base("nope"), Err(InfrastructureError::Url(_))));
        assert!(matches!(
            endpoint_base("mailto:someone@example.com"),
            Err(InfrastructureError::Config(_))
        ));
    }
}
