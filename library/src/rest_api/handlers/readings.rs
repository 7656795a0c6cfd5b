use actix_web::{error, web, Error, HttpResponse};
use chrono::{Duration, SecondsFormat, Utc};
use log::info;
use serde_json::json;

use crate::{context::AppContext, HISTORY_LIMIT, HISTORY_WINDOW_HOURS};

pub const FETCHING_MESSAGE: &str = "Fetching data, please refresh...";

/// Latest reading in the upstream `lastData` shape. An empty store triggers
/// one inline fetch and answers 202 without re-reading the store.
pub async fn current(app: web::Data<AppContext>) -> Result<HttpResponse, Error> {
    let store = app.store.clone();
    let latest = web::block(move || store.latest())
        .await
        .map_err(error::ErrorInternalServerError)?;

    match latest {
        Some(reading) => Ok(HttpResponse::Ok().json(reading.to_upstream_shape())),
        None => {
            info!("no readings stored yet, fetching inline");
            app.fetcher.fetch_and_store().await;
            Ok(HttpResponse::Accepted().json(json!({ "message": FETCHING_MESSAGE })))
        }
    }
}

/// Readings from the last day by timestamp, newest first, capped at
/// `HISTORY_LIMIT` rows.
pub async fn history(app: web::Data<AppContext>) -> Result<HttpResponse, Error> {
    let cutoff = (Utc::now() - Duration::hours(HISTORY_WINDOW_HOURS))
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let store = app.store.clone();
    let readings = web::block(move || store.since(&cutoff, HISTORY_LIMIT))
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(readings))
}
