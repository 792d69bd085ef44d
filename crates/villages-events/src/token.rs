//! Credential extraction from the served auth-forms script.
//!
//! The events API wants an `Authorization: Basic ...` header whose value is
//! baked into a JavaScript bundle as `dp_AUTH_TOKEN = "Basic <base64>"`.
//! We fetch the bundle and pull the assignment out with a regex.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{error_chain, VillagesError, VillagesResult};

/// Authorization scheme that must precede the token body.
pub const AUTH_SCHEME: &str = "Basic";

/// An extracted `"Basic <base64>"` authorization value.
///
/// Never logged: `Debug` redacts the token body.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Full header value, scheme included.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({AUTH_SCHEME} <redacted>)")
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"dp_AUTH_TOKEN\s*=\s*["']Basic\s+([a-zA-Z0-9+/=]+)["']"#)
            .expect("valid regex")
    })
}

/// Fetch the script at `url` and extract the credential from it.
pub async fn fetch_credential(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> VillagesResult<Credential> {
    tracing::debug!("fetching auth script from {url}");

    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| script_fetch_error(url, timeout, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(VillagesError::TokenFetch(format!(
            "Failed to fetch JavaScript file from {url}: HTTP status {}",
            status.as_u16()
        )));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| script_fetch_error(url, timeout, e))?;

    extract_credential(&body)
}

/// Search `body` for the `dp_AUTH_TOKEN` assignment.
///
/// Single and double quotes are both accepted. The token body is limited to
/// the base64 alphabet, and the scheme must be exactly `Basic`.
pub fn extract_credential(body: &str) -> VillagesResult<Credential> {
    let token = token_pattern()
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            VillagesError::TokenFetch(
                "Failed to extract dp_AUTH_TOKEN from JavaScript file: pattern not found in response"
                    .to_string(),
            )
        })?;

    Ok(Credential(format!("{AUTH_SCHEME} {token}")))
}

fn script_fetch_error(url: &str, timeout: Duration, e: reqwest::Error) -> VillagesError {
    if e.is_timeout() {
        VillagesError::TokenFetch(format!(
            "Timeout after {}s while fetching JavaScript file from {url}",
            timeout.as_secs_f32()
        ))
    } else {
        VillagesError::TokenFetch(format!(
            "Failed to fetch JavaScript file from {url}: {}",
            error_chain(&e)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_double_quoted() {
        let cred = extract_credential(r#"var x=1;dp_AUTH_TOKEN = "Basic dGVzdA==";"#).unwrap();
        assert_eq!(cred.as_str(), "Basic dGVzdA==");
    }

    #[test]
    fn test_extract_single_quoted() {
        let cred = extract_credential("dp_AUTH_TOKEN = 'Basic dGVzdA=='").unwrap();
        assert_eq!(cred.as_str(), "Basic dGVzdA==");
    }

    #[test]
    fn test_extract_without_spaces() {
        let cred = extract_credential(r#"dp_AUTH_TOKEN="Basic YWJj+/9="}"#).unwrap();
        assert_eq!(cred.as_str(), "Basic YWJj+/9=");
    }

    #[test]
    fn test_extract_from_minified_bundle() {
        let body = format!(
            "{}{}{}",
            "!function(e){var t={};".repeat(50),
            r#"const dp_AUTH_TOKEN="Basic dGVzdHRvaw==",n=2;"#,
            "return t}();".repeat(50)
        );
        let cred = extract_credential(&body).unwrap();
        assert_eq!(cred.as_str(), "Basic dGVzdHRvaw==");
    }

    #[test]
    fn test_pattern_not_found() {
        let err = extract_credential("console.log('nothing here');").unwrap_err();
        assert!(matches!(err, VillagesError::TokenFetch(_)));
        assert!(err.to_string().contains("pattern not found"));
    }

    #[test]
    fn test_other_scheme_does_not_match() {
        let err = extract_credential(r#"dp_AUTH_TOKEN = "Bearer dGVzdA==""#).unwrap_err();
        assert!(matches!(err, VillagesError::TokenFetch(_)));
    }

    #[test]
    fn test_non_base64_token_does_not_match() {
        let err = extract_credential(r#"dp_AUTH_TOKEN = "Basic not-base64!""#).unwrap_err();
        assert!(matches!(err, VillagesError::TokenFetch(_)));
    }

    #[test]
    fn test_empty_body() {
        assert!(extract_credential("").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = extract_credential(r#"dp_AUTH_TOKEN = "Basic c2VjcmV0""#).unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("c2VjcmV0"));
        assert!(dbg.contains("redacted"));
    }
}
