//! Browser-like HTTP session establishment.
//!
//! The events API only answers requests that carry the cookies handed out by
//! the public calendar page. A [`Session`] owns a cookie jar and a default
//! header set; [`SessionManager`] warms it up and guarantees release.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT,
};

use crate::config::Endpoints;
use crate::error::{error_chain, VillagesError, VillagesResult};

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// A cookie-carrying HTTP client plus the headers sent on every request.
pub struct Session {
    client: reqwest::Client,
    jar: Arc<Jar>,
    headers: HeaderMap,
}

impl Session {
    fn new(user_agent: &str) -> VillagesResult<Self> {
        let jar = Arc::new(Jar::default());
        // Content-Encoding and keep-alive are negotiated by the client itself.
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| VillagesError::Session(format!("Failed to build HTTP client: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        Ok(Self {
            client,
            jar,
            headers,
        })
    }

    /// Start a GET carrying the session's default headers.
    ///
    /// Headers set later on the returned builder replace the defaults.
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).headers(self.headers.clone())
    }

    /// Default headers applied to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Cookie` header the jar would attach to a request for `url`.
    pub fn cookies_for(&self, url: &str) -> Option<String> {
        let url = reqwest::Url::parse(url).ok()?;
        self.jar
            .cookies(&url)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }
}

/// Owns the run's [`Session`] from construction until release.
///
/// Once released, every operation fails with [`VillagesError::Session`];
/// nothing reconnects behind the caller's back. Dropping the manager
/// releases it.
pub struct SessionManager {
    session: Option<Session>,
    origin: String,
}

impl SessionManager {
    /// Create an un-warmed session with the browser header set.
    pub fn new(endpoints: &Endpoints) -> VillagesResult<Self> {
        Ok(Self {
            session: Some(Session::new(&endpoints.user_agent)?),
            origin: endpoints.origin.clone(),
        })
    }

    /// Visit `url` to collect cookies, then prime `Origin` and `Referer`.
    ///
    /// `Referer` is set to exactly `url`.
    pub async fn establish(&mut self, url: &str, timeout: Duration) -> VillagesResult<()> {
        let session = self.session.as_mut().ok_or_else(released)?;

        tracing::debug!("establishing session via {url}");

        let resp = session.get(url).timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                VillagesError::Session(format!(
                    "Timeout after {}s while establishing session: {e}",
                    timeout.as_secs_f32()
                ))
            } else {
                VillagesError::Session(format!(
                    "Failed to establish session: {}",
                    error_chain(&e)
                ))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VillagesError::Session(format!(
                "Failed to establish session: HTTP status {} from {url}",
                status.as_u16()
            )));
        }

        session.headers.insert(ORIGIN, header_value(&self.origin)?);
        session.headers.insert(REFERER, header_value(url)?);

        tracing::debug!(
            "session established (cookies present: {})",
            session.cookies_for(url).is_some()
        );
        Ok(())
    }

    /// The live session.
    pub fn current_session(&self) -> VillagesResult<&Session> {
        self.session.as_ref().ok_or_else(released)
    }

    /// Drop the client and its connection pool. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("session released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.session.is_none()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.release();
    }
}

fn released() -> VillagesError {
    VillagesError::Session("Session has been released".to_string())
}

fn header_value(value: &str) -> VillagesResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| VillagesError::Session(format!("Invalid header value {value:?}: {e}")))
}
