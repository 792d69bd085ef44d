//! One fetch cycle: credential → session → events → extraction.

use serde_json::Value;

use crate::api::fetch_events;
use crate::config::Config;
use crate::error::{VillagesError, VillagesResult};
use crate::events::{EventProcessor, ProcessedEvent};
use crate::session::SessionManager;
use crate::token::{fetch_credential, Credential};

/// Run the whole pipeline once. No stage is retried.
///
/// The session is released before returning, whether the run succeeded or
/// not.
pub async fn run(config: &Config) -> VillagesResult<Vec<ProcessedEvent>> {
    let endpoints = &config.endpoints;

    let script_client = reqwest::Client::builder()
        .user_agent(endpoints.user_agent.as_str())
        .build()
        .map_err(|e| VillagesError::TokenFetch(format!("Failed to build HTTP client: {e}")))?;

    tracing::debug!("Fetching authentication token...");
    let credential = fetch_credential(&script_client, &endpoints.script_url, config.timeout).await?;

    let mut manager = SessionManager::new(endpoints)?;
    let result = fetch_with_session(&mut manager, config, &credential).await;
    manager.release();

    let response = result?;

    tracing::debug!("Processing events...");
    EventProcessor::new(config.venues.clone()).extract(&Value::Object(response))
}

async fn fetch_with_session(
    manager: &mut SessionManager,
    config: &Config,
    credential: &Credential,
) -> VillagesResult<serde_json::Map<String, Value>> {
    let endpoints = &config.endpoints;

    tracing::debug!("Establishing session...");
    manager
        .establish(&endpoints.warmup_url, config.timeout)
        .await?;

    tracing::debug!("Fetching events from API...");
    let session = manager.current_session()?;
    fetch_events(
        session,
        &endpoints.api_url,
        credential,
        endpoints,
        config.timeout,
    )
    .await
}
