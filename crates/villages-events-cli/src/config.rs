//! Config file loading and resolution against CLI flags.
//!
//! Precedence is CLI flag, then config file, then built-in default. A broken
//! config file is reported and ignored rather than aborting the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use villages_events::{Config, OutputField, OutputFormat, RenderOptions, VenueMapping};

use crate::cli::Cli;

pub const CONFIG_ENV: &str = "VILLAGES_EVENTS_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "villages-events.toml";

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FileConfig {
    pub format: Option<String>,
    pub preamble: Option<String>,
    /// Kept untyped so a bad value can fall back on its own.
    pub output_fields: Option<toml::Value>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
    #[serde(default)]
    pub venues: Vec<VenueEntry>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct EndpointOverrides {
    pub script_url: Option<String>,
    pub warmup_url: Option<String>,
    pub api_url: Option<String>,
    pub origin: Option<String>,
    pub api_referer: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VenueEntry {
    pub keyword: String,
    pub abbreviation: String,
}

/// Everything one run needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config: Config,
    pub render: RenderOptions,
}

/// Resolve the config file path.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(env_path);
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("villages-events")
        .join("config.toml")
}

/// Load `path`. A missing file yields defaults; an unreadable or invalid
/// one is logged and also yields defaults.
pub fn load_file(path: &Path) -> FileConfig {
    if !path.exists() {
        return FileConfig::default();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Could not read {}: {e}", path.display());
            return FileConfig::default();
        }
    };

    match toml::from_str(&text) {
        Ok(file) => {
            tracing::debug!("loaded config from {}", path.display());
            file
        }
        Err(e) => {
            tracing::warn!("Invalid TOML in {}: {e}", path.display());
            FileConfig::default()
        }
    }
}

/// Merge CLI flags over the file config over defaults.
pub fn resolve(cli: &Cli, file: FileConfig) -> Settings {
    let format: OutputFormat = match (cli.format, file.format.as_deref()) {
        (Some(arg), _) => arg.into(),
        (None, Some(name)) => name.parse().unwrap_or_else(|e| {
            tracing::warn!("{e} in config, using default: {}", OutputFormat::default());
            OutputFormat::default()
        }),
        (None, None) => OutputFormat::default(),
    };

    let preamble = cli
        .preamble
        .clone()
        .or(file.preamble)
        .unwrap_or_default();

    let fields = file
        .output_fields
        .as_ref()
        .map(parse_output_fields)
        .unwrap_or_else(|| OutputField::DEFAULT.to_vec());

    let timeout_secs = cli
        .timeout
        .or(file.timeout_secs.filter(|secs| *secs > 0))
        .unwrap_or(villages_events::config::DEFAULT_TIMEOUT_SECS);

    let mut config = Config {
        timeout: Duration::from_secs(timeout_secs),
        ..Config::default()
    };

    let overrides = file.endpoints;
    let endpoints = &mut config.endpoints;
    for (slot, value) in [
        (&mut endpoints.script_url, overrides.script_url),
        (&mut endpoints.warmup_url, overrides.warmup_url),
        (&mut endpoints.api_url, overrides.api_url),
        (&mut endpoints.origin, overrides.origin),
        (&mut endpoints.api_referer, overrides.api_referer),
        (&mut endpoints.user_agent, overrides.user_agent),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }

    if !file.venues.is_empty() {
        config.venues = VenueMapping::new(
            file.venues
                .into_iter()
                .map(|v| (v.keyword, v.abbreviation)),
        );
    }

    Settings {
        config,
        render: RenderOptions {
            format,
            fields,
            preamble,
        },
    }
}

/// Validate `output_fields`: a non-empty list of known field names.
fn parse_output_fields(value: &toml::Value) -> Vec<OutputField> {
    let fallback = || OutputField::DEFAULT.to_vec();
    let default_names: Vec<&str> = OutputField::DEFAULT.iter().map(|f| f.name()).collect();

    let Some(items) = value.as_array() else {
        tracing::warn!("output_fields in config must be a list, using default: {default_names:?}");
        return fallback();
    };

    let mut fields = Vec::with_capacity(items.len());
    for item in items {
        let Some(name) = item.as_str() else {
            tracing::warn!("All output_fields must be strings, using default: {default_names:?}");
            return fallback();
        };
        match name.parse::<OutputField>() {
            Ok(field) => fields.push(field),
            Err(e) => {
                tracing::warn!("{e} in output_fields, using default: {default_names:?}");
                return fallback();
            }
        }
    }

    if fields.is_empty() {
        tracing::warn!("output_fields is empty, using default: {default_names:?}");
        return fallback();
    }
    fields
}
