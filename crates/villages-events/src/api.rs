//! Authenticated call to the events API.

use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, ORIGIN, REFERER, USER_AGENT,
};
use serde_json::{Map, Value};

use crate::config::Endpoints;
use crate::error::{error_chain, VillagesError, VillagesResult};
use crate::session::Session;
use crate::token::Credential;

const API_ACCEPT: &str = "application/json, text/plain, */*";

/// Maximum number of body characters quoted in a status error.
const BODY_SNIPPET_CHARS: usize = 200;

/// Fetch the events document through an established session.
///
/// Cookies from the warm-up come along via the session's jar. Returns the
/// top-level JSON object untouched; validating `events` is the extractor's job.
pub async fn fetch_events(
    session: &Session,
    api_url: &str,
    credential: &Credential,
    endpoints: &Endpoints,
    timeout: Duration,
) -> VillagesResult<Map<String, Value>> {
    let headers = api_headers(credential, endpoints)?;

    tracing::debug!("requesting events from {api_url}");

    let resp = session
        .get(api_url)
        .headers(headers)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(timeout, e))?;

    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(|e| transport_error(timeout, e))?;

    if status != 200 {
        let snippet: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        return Err(VillagesError::Api(format!(
            "API request failed with status code {status}: {snippet}"
        )));
    }

    let data: Value = serde_json::from_str(&body)
        .map_err(|e| VillagesError::Api(format!("Failed to parse JSON response: {e}")))?;

    match data {
        Value::Object(map) => Ok(map),
        other => Err(VillagesError::Api(format!(
            "Invalid API response structure: expected object, got {}",
            shape_name(&other)
        ))),
    }
}

fn api_headers(credential: &Credential, endpoints: &Endpoints) -> VillagesResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut auth = header_value(credential.as_str())?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));
    headers.insert(USER_AGENT, header_value(&endpoints.user_agent)?);
    headers.insert(ORIGIN, header_value(&endpoints.origin)?);
    headers.insert(REFERER, header_value(&endpoints.api_referer)?);
    Ok(headers)
}

fn header_value(value: &str) -> VillagesResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| VillagesError::Api(format!("Invalid request header value: {e}")))
}

fn transport_error(timeout: Duration, e: reqwest::Error) -> VillagesError {
    if e.is_timeout() {
        VillagesError::Api(format!(
            "API request timed out after {}s: {e}",
            timeout.as_secs_f32()
        ))
    } else {
        VillagesError::Api(format!("API request failed: {}", error_chain(&e)))
    }
}

/// Name of a JSON value's shape, for error messages.
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
