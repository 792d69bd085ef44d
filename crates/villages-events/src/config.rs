//! Runtime configuration: endpoints, fixed headers, timeout and venue mapping.
//!
//! Built once at startup and passed by reference into every stage.

use std::time::Duration;

pub const DEFAULT_SCRIPT_URL: &str =
    "https://cdn.thevillages.com/web_components/myvillages-auth-forms/main.js";
pub const DEFAULT_WARMUP_URL: &str = "https://www.thevillages.com/calendar/#/?dateRange=today&categories=entertainment&locationCategories=town-squares";
pub const DEFAULT_API_URL: &str = "https://api.v2.thevillages.com/events/?cancelled=false&startRow=0&endRow=24&dateRange=today&categories=entertainment&locationCategories=town-squares&subcategoriesQueryType=and";
pub const DEFAULT_ORIGIN: &str = "https://www.thevillages.com";
/// Referer for the API call: the calendar root, not the warm-up URL.
pub const DEFAULT_API_REFERER: &str = "https://www.thevillages.com/calendar/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Remote endpoints and the headers that identify us to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Script carrying the embedded credential.
    pub script_url: String,
    /// Page visited to collect session cookies.
    pub warmup_url: String,
    /// Events API.
    pub api_url: String,
    /// Value for `Origin` on the warm-up-primed session and the API call.
    pub origin: String,
    /// Value for `Referer` on the API call.
    pub api_referer: String,
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            warmup_url: DEFAULT_WARMUP_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            api_referer: DEFAULT_API_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Endpoints {
    /// Point all three resources at one base URL (used against local mock servers).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            script_url: format!("{base}/main.js"),
            warmup_url: format!("{base}/calendar/"),
            api_url: format!("{base}/events/"),
            origin: base.to_string(),
            api_referer: format!("{base}/calendar/"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Ordered keyword → abbreviation table.
///
/// Order matters: the first keyword contained in a venue name wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueMapping {
    entries: Vec<(String, String)>,
}

impl VenueMapping {
    pub fn new<K, A>(entries: impl IntoIterator<Item = (K, A)>) -> Self
    where
        K: Into<String>,
        A: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, a)| (k.into(), a.into()))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a.as_str()))
    }
}

impl Default for VenueMapping {
    fn default() -> Self {
        Self::new([
            ("Brownwood", "Brownwood"),
            ("Sawgrass", "Sawgrass"),
            ("Spanish Springs", "Spanish Springs"),
            ("Lake Sumter", "Lake Sumter"),
        ])
    }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoints: Endpoints,
    /// Applied to each network call individually.
    pub timeout: Duration,
    pub venues: VenueMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            venues: VenueMapping::default(),
        }
    }
}
