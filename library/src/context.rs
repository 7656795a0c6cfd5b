use actix::prelude::*;
use actix_web::web;
use log::{info, warn};

use crate::{
    config::Config,
    db::{Store, StoreError},
    fetcher::{FetchOutcome, Fetcher},
    scheduler::{Scheduler, StopScheduler},
};

/// Shared state for the HTTP handlers and the periodic fetch.
pub struct AppContext {
    pub config: Config,
    pub store: Store,
    pub fetcher: Fetcher,
}

impl AppContext {
    pub fn new(config: Config) -> Result<AppContext, StoreError> {
        let store = Store::open(&config.database_url)?;
        let fetcher = Fetcher::new(&config, store.clone());
        Ok(AppContext {
            config,
            store,
            fetcher,
        })
    }

    /// Create the table if needed, then fetch once so early requests have
    /// a chance of finding data.
    pub async fn startup(&self) -> Result<FetchOutcome, StoreError> {
        self.store.initialize()?;
        Ok(self.fetcher.fetch_and_store().await)
    }

    /// Start the periodic fetch at the configured interval.
    pub fn start_scheduler(app: web::Data<AppContext>) -> Addr<Scheduler> {
        let interval = app.config.fetch_interval;
        Scheduler::new(app, interval).start()
    }

    pub async fn shutdown(&self, scheduler: Addr<Scheduler>) {
        if let Err(err) = scheduler.send(StopScheduler).await {
            warn!("scheduler already gone: {}", err);
        }
        let state = self.store.pool_state();
        info!(
            "closing store ({} connections, {} idle)",
            state.connections, state.idle_connections
        );
    }
}
