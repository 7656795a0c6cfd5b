//! `Scheduler` is an actor that runs a fetch cycle on a fixed interval.
//! Each tick spawns its own cycle, so a slow upstream can produce
//! overlapping cycles; the store's insert-or-ignore keeps that safe.
use actix::prelude::*;
use actix_web::web;
use log::info;
use std::time::Duration;

use crate::context::AppContext;

/// Stop the periodic fetch
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct StopScheduler;

pub struct Scheduler {
    app: web::Data<AppContext>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(app: web::Data<AppContext>, interval: Duration) -> Scheduler {
        Scheduler { app, interval }
    }
}

impl Actor for Scheduler {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("fetching upstream every {}s", self.interval.as_secs_f64());
        ctx.run_interval(self.interval, |act, _| {
            let fetcher = act.app.fetcher.clone();
            Arbiter::spawn(async move {
                fetcher.fetch_and_store().await;
            });
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        info!("scheduler stopped");
    }
}

impl Handler<StopScheduler> for Scheduler {
    type Result = ();

    fn handle(&mut self, _: StopScheduler, ctx: &mut Self::Context) {
        ctx.stop();
    }
}
