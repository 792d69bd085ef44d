//! Rendering processed events into the supported output encodings.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::events::ProcessedEvent;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `venue,title#` records concatenated; compact enough for mesh radios.
    #[default]
    Legacy,
    Json,
    Csv,
    Plain,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 4] = ["legacy", "json", "csv", "plain"];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Legacy => "legacy",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Plain => "plain",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(OutputFormat::Legacy),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "plain" => Ok(OutputFormat::Plain),
            other => Err(format!(
                "unknown output format '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// A column of a processed event, named after its path in the API payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    Venue,
    Title,
}

impl OutputField {
    pub const DEFAULT: [OutputField; 2] = [OutputField::Venue, OutputField::Title];

    pub fn name(self) -> &'static str {
        match self {
            OutputField::Venue => "location.title",
            OutputField::Title => "title",
        }
    }

    fn value(self, event: &ProcessedEvent) -> &str {
        match self {
            OutputField::Venue => &event.venue,
            OutputField::Title => &event.title,
        }
    }
}

impl FromStr for OutputField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location.title" => Ok(OutputField::Venue),
            "title" => Ok(OutputField::Title),
            other => Err(format!("unknown output field '{other}'")),
        }
    }
}

/// How to render a batch of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub fields: Vec<OutputField>,
    /// Text emitted before the data; ignored when empty.
    pub preamble: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            fields: OutputField::DEFAULT.to_vec(),
            preamble: String::new(),
        }
    }
}

/// Render `events` as a complete output document.
///
/// Non-empty output always ends with a newline.
pub fn render(events: &[ProcessedEvent], options: &RenderOptions) -> String {
    let body = match options.format {
        OutputFormat::Legacy => render_legacy(events, &options.fields),
        OutputFormat::Json => render_json(events, &options.fields),
        OutputFormat::Csv => render_csv(events, &options.fields),
        OutputFormat::Plain => render_plain(events, &options.fields),
    };

    let mut out = String::with_capacity(options.preamble.len() + body.len() + 2);
    if !options.preamble.is_empty() {
        out.push_str(&options.preamble);
        if !options.preamble.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&body);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn render_legacy(events: &[ProcessedEvent], fields: &[OutputField]) -> String {
    events
        .iter()
        .map(|e| format!("{}#", values(e, fields).join(",")))
        .collect()
}

fn render_json(events: &[ProcessedEvent], fields: &[OutputField]) -> String {
    let rows: Vec<Value> = events
        .iter()
        .map(|e| {
            let row: Map<String, Value> = fields
                .iter()
                .map(|f| (f.name().to_string(), Value::String(f.value(e).to_string())))
                .collect();
            Value::Object(row)
        })
        .collect();
    format!("{:#}", Value::Array(rows))
}

fn render_csv(events: &[ProcessedEvent], fields: &[OutputField]) -> String {
    let mut out = String::new();
    let header: Vec<String> = fields.iter().map(|f| csv_escape(f.name())).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for e in events {
        let row: Vec<String> = values(e, fields).into_iter().map(csv_escape).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn render_plain(events: &[ProcessedEvent], fields: &[OutputField]) -> String {
    events
        .iter()
        .map(|e| format!("{}\n", values(e, fields).join(" - ")))
        .collect()
}

fn values<'a>(event: &'a ProcessedEvent, fields: &[OutputField]) -> Vec<&'a str> {
    fields.iter().map(|f| f.value(event)).collect()
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
