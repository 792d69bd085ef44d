//! Run one fetch cycle and map its outcome to an exit status.

use std::io::Write;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use villages_events::{pipeline, render, VillagesError};

use crate::config::Settings;

pub const EXIT_SUCCESS: u8 = 0;
/// Application failure or unexpected error.
pub const EXIT_FAILURE: u8 = 1;
/// Invalid invocation.
pub const EXIT_USAGE: u8 = 2;

/// How a failed run is reported.
#[derive(Debug, PartialEq, Eq)]
pub enum Failure<'a> {
    /// One of the pipeline's own failure kinds.
    Application(&'a VillagesError),
    Unexpected,
}

impl<'a> Failure<'a> {
    pub fn classify(err: &'a anyhow::Error) -> Self {
        match err.downcast_ref::<VillagesError>() {
            Some(app) => Failure::Application(app),
            None => Failure::Unexpected,
        }
    }
}

/// Build the stderr logger: `LEVEL message` lines with no time or target.
///
/// Colour codes are only emitted when `ansi` is set.
pub fn log_subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .without_time()
        .with_target(false)
        .finish()
}

/// Fetch, extract and render events into `out`.
pub async fn execute<W: Write>(settings: &Settings, out: &mut W) -> Result<()> {
    let events = pipeline::run(&settings.config).await?;

    tracing::debug!("Formatting output as {}...", settings.render.format);
    let rendered = render(&events, &settings.render);

    out.write_all(rendered.as_bytes())
        .context("failed to write output")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

/// Log `err` the way its kind calls for and return the exit status.
pub fn report(err: &anyhow::Error) -> u8 {
    match Failure::classify(err) {
        Failure::Application(app) => tracing::error!("{app}"),
        Failure::Unexpected => tracing::error!("Unexpected error: {err:#}"),
    }
    EXIT_FAILURE
}
