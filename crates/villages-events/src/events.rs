//! Tolerant extraction of `(venue, title)` pairs from the API payload.
//!
//! The payload has no fixed schema, so it stays a `serde_json::Value` and
//! each field is checked where it is read. A malformed entry is logged and
//! skipped; only a missing or non-array `events` fails the batch.

use serde_json::Value;

use crate::config::VenueMapping;
use crate::error::{VillagesError, VillagesResult};

/// One output row: abbreviated venue and event title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    pub venue: String,
    pub title: String,
}

impl ProcessedEvent {
    pub fn new(venue: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            title: title.into(),
        }
    }
}

/// Applies venue abbreviations while walking the events array.
#[derive(Debug, Clone)]
pub struct EventProcessor {
    venues: VenueMapping,
}

impl EventProcessor {
    pub fn new(venues: VenueMapping) -> Self {
        Self { venues }
    }

    /// Shorten `venue` using the first mapping keyword it contains.
    ///
    /// Keywords are tried in mapping order, so an earlier keyword wins even
    /// when a later one also matches. Unmatched and empty names come back as-is.
    pub fn abbreviate(&self, venue: &str) -> String {
        if venue.is_empty() {
            return String::new();
        }

        self.venues
            .iter()
            .find(|(keyword, _)| venue.contains(keyword))
            .map(|(_, abbreviation)| abbreviation.to_string())
            .unwrap_or_else(|| venue.to_string())
    }

    /// Extract processed events from a raw API response, preserving order.
    pub fn extract(&self, response: &Value) -> VillagesResult<Vec<ProcessedEvent>> {
        let events = response.get("events").ok_or_else(|| {
            VillagesError::Processing("Missing 'events' key in API response".to_string())
        })?;

        let events = events.as_array().ok_or_else(|| {
            VillagesError::Processing("'events' field is not a list".to_string())
        })?;

        let mut processed = Vec::with_capacity(events.len());
        for (idx, event) in events.iter().enumerate() {
            match read_entry(event) {
                Ok((venue, title)) => {
                    processed.push(ProcessedEvent::new(self.abbreviate(venue), title));
                }
                Err(reason) => {
                    tracing::warn!("Event at index {idx} {reason}, skipping");
                }
            }
        }

        tracing::debug!(
            "extracted {} of {} events",
            processed.len(),
            events.len()
        );
        Ok(processed)
    }
}

/// Read `location.title` and `title` from one entry, or say why not.
fn read_entry(event: &Value) -> Result<(&str, &str), &'static str> {
    let event = event.as_object().ok_or("is not an object")?;

    let location = event.get("location").ok_or("missing 'location' field")?;
    let location = location
        .as_object()
        .ok_or("has invalid 'location' field")?;

    let venue = location
        .get("title")
        .ok_or("missing 'location.title' field")?
        .as_str()
        .ok_or("has non-text 'location.title' field")?;

    let title = event
        .get("title")
        .ok_or("missing 'title' field")?
        .as_str()
        .ok_or("has non-text 'title' field")?;

    Ok((venue, title))
}
