//! villages-events: fetch today's town-square entertainment from The Villages
//! calendar API and reduce it to `(venue, title)` pairs.
//!
//! The API needs two things a plain client lacks: a `Basic` credential that
//! is embedded in a served script, and the cookies a browser would collect
//! from the calendar page. [`pipeline::run`] performs the whole sequence.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod pipeline;
pub mod session;
pub mod token;

pub use api::fetch_events;
pub use config::{Config, Endpoints, VenueMapping};
pub use error::{VillagesError, VillagesResult};
pub use events::{EventProcessor, ProcessedEvent};
pub use format::{render, OutputField, OutputFormat, RenderOptions};
pub use session::{Session, SessionManager};
pub use token::{extract_credential, fetch_credential, Credential};
