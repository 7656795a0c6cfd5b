#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

use std::time::Duration;

/// How often the upstream station is polled
pub const FETCH_INTERVAL: Duration = Duration::from_secs(60);
/// Bound on a single upstream request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Row cap on history responses; one day of readings at the default interval
pub const HISTORY_LIMIT: i64 = 1440;
/// Width of the history window
pub const HISTORY_WINDOW_HOURS: i64 = 24;

pub mod config;
pub use config::Config;

pub mod context;
pub use context::AppContext;

pub mod fetcher;
pub use fetcher::{FetchOutcome, Fetcher};

pub mod scheduler;
pub use scheduler::{Scheduler, StopScheduler};

pub mod rest_api;

pub mod db;

pub mod schema;
