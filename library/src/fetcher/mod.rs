//! One fetch-normalize-store cycle against the upstream devices endpoint.
//! Every failure is contained in the cycle: it is logged and reported as
//! `FetchOutcome::Skipped`, and the next scheduled cycle tries again.
use actix_rt::time::timeout;
use actix_web::{error::BlockingError, web};
use awc::Client;
use failure::Fail;
use log::{error, info, warn};
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::Config,
    db::{Store, StoreError},
};

pub mod normalize;

pub use normalize::{normalize_timestamp, reading_from};

/// Upper bound on the upstream response body
const MAX_PAYLOAD: usize = 1 << 20;

#[derive(Debug, Fail)]
pub enum FetchError {
    #[fail(display = "missing credential {}", _0)]
    MissingCredential(&'static str),
    #[fail(display = "upstream request failed: {}", _0)]
    Request(String),
    #[fail(display = "upstream responded with status {}", _0)]
    Status(u16),
    #[fail(display = "malformed upstream payload: {}", _0)]
    Payload(String),
    #[fail(display = "upstream observation has no timestamp")]
    MissingTimestamp,
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
    #[fail(display = "blocking thread pool is gone")]
    Canceled,
}

impl From<BlockingError<StoreError>> for FetchError {
    fn from(err: BlockingError<StoreError>) -> Self {
        match err {
            BlockingError::Error(err) => FetchError::Store(err),
            BlockingError::Canceled => FetchError::Canceled,
        }
    }
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A new reading was written under this timestamp
    Stored(String),
    /// The reading was already stored; nothing changed
    Duplicate(String),
    /// Upstream returned no devices
    NoDevices,
    /// The first device carried no observation
    NoData,
    /// The cycle failed and was logged
    Skipped,
}

#[derive(Clone)]
pub struct Fetcher {
    api_url: String,
    api_key: Option<String>,
    app_key: Option<String>,
    timeout: Duration,
    store: Store,
}

impl Fetcher {
    pub fn new(config: &Config, store: Store) -> Fetcher {
        Fetcher {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            app_key: config.app_key.clone(),
            timeout: config.fetch_timeout,
            store,
        }
    }

    /// Run one cycle. Never fails; errors are logged and reported as `Skipped`.
    pub async fn fetch_and_store(&self) -> FetchOutcome {
        match self.try_fetch_and_store().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("fetch cycle skipped: {}", err);
                FetchOutcome::Skipped
            }
        }
    }

    async fn try_fetch_and_store(&self) -> Result<FetchOutcome, FetchError> {
        let (api_key, app_key) = self.credentials()?;
        let devices = self.fetch_devices(api_key, app_key).await?;

        let device = match devices.first() {
            Some(device) => device,
            None => {
                warn!("no devices received from upstream");
                return Ok(FetchOutcome::NoDevices);
            }
        };
        let last_data = match device.get("lastData").and_then(Value::as_object) {
            Some(last_data) if !last_data.is_empty() => last_data,
            _ => return Ok(FetchOutcome::NoData),
        };

        let reading = reading_from(last_data).ok_or(FetchError::MissingTimestamp)?;
        let timestamp = reading.timestamp.clone();
        let store = self.store.clone();
        let written = web::block(move || store.insert(&reading)).await?;

        if written {
            info!("Saved reading for {}", timestamp);
            Ok(FetchOutcome::Stored(timestamp))
        } else {
            Ok(FetchOutcome::Duplicate(timestamp))
        }
    }

    fn credentials(&self) -> Result<(&str, &str), FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingCredential("AMBIENT_API_KEY"))?;
        let app_key = self
            .app_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingCredential("AMBIENT_APP_KEY"))?;
        Ok((api_key, app_key))
    }

    /// GET the devices list. The timeout covers the body as well as the
    /// headers; awc's own client timeout stops at the headers.
    async fn fetch_devices(&self, api_key: &str, app_key: &str) -> Result<Vec<Value>, FetchError> {
        let client = Client::builder().timeout(self.timeout).finish();
        let url = format!(
            "{}?applicationKey={}&apiKey={}",
            self.api_url, app_key, api_key
        );

        let request = async move {
            let mut response = client
                .get(url)
                .send()
                .await
                .map_err(|err| FetchError::Request(err.to_string()))?;
            if !response.status().is_success() {
                return Err(FetchError::Status(response.status().as_u16()));
            }

            response
                .json::<Vec<Value>>()
                .limit(MAX_PAYLOAD)
                .await
                .map_err(|err| FetchError::Payload(err.to_string()))
        };

        timeout(self.timeout, request).await.map_err(|_| {
            FetchError::Request(format!(
                "no complete response within {}s",
                self.timeout.as_secs_f64()
            ))
        })?
    }
}
